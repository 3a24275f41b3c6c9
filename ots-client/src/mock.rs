//! Mock collaborators for testing and development.
//!
//! Scripted implementations of the [`HttpTransport`] and
//! [`BlockSource`] traits. Routes match on method plus URL prefix, in
//! registration order, and every request is recorded for inspection.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::{ClientError, Result};
use crate::explorer::{BlockInfo, BlockSource};
use crate::http::{HttpRequest, HttpResponse, HttpTransport, Method};

enum MockAnswer {
    Reply { status: u16, body: Vec<u8> },
    Fail(String),
}

struct MockRoute {
    method: Method,
    url_prefix: String,
    answer: MockAnswer,
}

/// Scripted HTTP transport.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<MockRoute>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer matching requests with a status and body.
    pub fn reply(
        &self,
        method: Method,
        url_prefix: impl Into<String>,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) {
        self.routes.lock().push(MockRoute {
            method,
            url_prefix: url_prefix.into(),
            answer: MockAnswer::Reply {
                status,
                body: body.into(),
            },
        });
    }

    /// Fail matching requests with a transport error.
    pub fn fail(&self, method: Method, url_prefix: impl Into<String>, message: impl Into<String>) {
        self.routes.lock().push(MockRoute {
            method,
            url_prefix: url_prefix.into(),
            answer: MockAnswer::Fail(message.into()),
        });
    }

    /// All requests seen so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.log.lock().push(request.clone());
        let routes = self.routes.lock();
        for route in routes.iter() {
            if route.method == request.method && request.url.starts_with(&route.url_prefix) {
                return match &route.answer {
                    MockAnswer::Reply { status, body } => Ok(HttpResponse {
                        status: *status,
                        body: body.clone(),
                    }),
                    MockAnswer::Fail(message) => Err(ClientError::Transport(message.clone())),
                };
            }
        }
        Err(ClientError::Transport(format!(
            "no mock route for {} {}",
            request.method, request.url
        )))
    }
}

/// Canned block source.
#[derive(Default)]
pub struct MockBlockSource {
    blocks: Mutex<HashMap<u64, BlockInfo>>,
}

impl MockBlockSource {
    /// Create an empty block source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block.
    pub fn insert(&self, info: BlockInfo) {
        self.blocks.lock().insert(info.height, info);
    }
}

#[async_trait]
impl BlockSource for MockBlockSource {
    async fn block_at_height(&self, height: u64) -> Result<BlockInfo> {
        self.blocks
            .lock()
            .get(&height)
            .cloned()
            .ok_or_else(|| ClientError::ExplorerFailed {
                errors: vec![format!("no block at height {height}")],
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_routes_match_in_registration_order() {
        let transport = MockTransport::new();
        transport.reply(Method::Get, "https://a.example/x", 200, b"narrow".to_vec());
        transport.reply(Method::Get, "https://a.example", 200, b"wide".to_vec());

        let narrow = transport
            .execute(HttpRequest::get("https://a.example/x/y"))
            .await
            .unwrap();
        assert_eq!(narrow.body, b"narrow");

        let wide = transport
            .execute(HttpRequest::get("https://a.example/z"))
            .await
            .unwrap();
        assert_eq!(wide.body, b"wide");
    }

    #[tokio::test]
    async fn test_unrouted_request_fails() {
        let transport = MockTransport::new();
        let err = transport
            .execute(HttpRequest::get("https://nowhere.example"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(transport.requests().len(), 1);
    }
}
