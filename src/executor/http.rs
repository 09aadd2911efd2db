//! # `reqwest`-backed executor.
//!
//! One [`reqwest::Client`] is built at startup and shared by every dispatch.
//! No client-level timeout is set; the dispatcher owns the per-attempt bound.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, REFERER, USER_AGENT};
use tokio_util::sync::CancellationToken;

use crate::error::{DispatchError, RuntimeError};
use crate::executor::executor::{BoxExecFuture, Executor, RawResponse, Request};

/// HTTP executor over a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpExecutor {
    client: reqwest::Client,
}

impl HttpExecutor {
    /// Builds the underlying client.
    ///
    /// Failure here is a startup error, not a dispatch outcome.
    pub fn new() -> Result<Self, RuntimeError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| RuntimeError::ClientBuild {
                error: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Executor for HttpExecutor {
    fn get(&self, request: Arc<Request>, _ctx: CancellationToken) -> BoxExecFuture {
        let client = self.client.clone();
        Box::pin(async move {
            let resp = client
                .get(&request.endpoint)
                .header(USER_AGENT, &request.user_agent)
                .header(REFERER, &request.referer)
                .send()
                .await
                .map_err(transport)?;

            let status = resp.status().as_u16();
            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = resp.bytes().await.map_err(transport)?.to_vec();

            Ok(RawResponse {
                status,
                content_type,
                body,
            })
        })
    }
}

fn transport(err: reqwest::Error) -> DispatchError {
    DispatchError::Transport {
        error: err.to_string(),
    }
}
