//! Calendar-server client.
//!
//! Calendars expose two endpoints: `POST /digest` accepting a raw
//! digest and returning a serialized timestamp (containing at minimum a
//! pending attestation), and `GET /timestamp/{hex}` returning 404 while
//! the commitment is pending or the completed timestamp once Bitcoin
//! has confirmed.

use std::sync::Arc;

use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::{ClientError, Result};
use crate::http::{HttpRequest, HttpResponse, HttpTransport};

/// Media type spoken by OpenTimestamps calendars.
pub const OTS_MEDIA_TYPE: &str = "application/vnd.opentimestamps.v1";

/// Client for the calendar endpoints.
pub struct CalendarClient {
    transport: Arc<dyn HttpTransport>,
    config: ClientConfig,
}

impl CalendarClient {
    /// Create a calendar client.
    pub fn new(transport: Arc<dyn HttpTransport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Submit a digest, returning the serialized timestamp body.
    pub async fn submit(&self, server: &str, digest: &[u8]) -> Result<Vec<u8>> {
        let url = format!("{}/digest", server.trim_end_matches('/'));
        debug!(server, "submitting digest to calendar");
        let request = HttpRequest::post(url)
            .header("Content-Type", "application/octet-stream")
            .header("Accept", OTS_MEDIA_TYPE)
            .body(digest.to_vec())
            .timeout(self.config.request_timeout);
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(ClientError::CalendarStatus {
                server: server.to_string(),
                status: response.status,
            });
        }
        if response.body.is_empty() {
            return Err(ClientError::EmptyCalendarResponse {
                server: server.to_string(),
            });
        }
        self.checked_body(response)
    }

    /// Fetch the completed timestamp for a commitment, if ready.
    ///
    /// Returns `Ok(None)` while the calendar still reports the
    /// commitment as pending (404 or empty body).
    pub async fn lookup(&self, uri: &str, commitment: &[u8]) -> Result<Option<Vec<u8>>> {
        let url = format!(
            "{}/timestamp/{}",
            uri.trim_end_matches('/'),
            hex::encode(commitment)
        );
        debug!(uri, "querying calendar for completed timestamp");
        let request = HttpRequest::get(url)
            .header("Accept", OTS_MEDIA_TYPE)
            .timeout(self.config.request_timeout);
        let response = self.transport.execute(request).await?;
        if response.status == 404 || response.body.is_empty() {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(ClientError::CalendarStatus {
                server: uri.to_string(),
                status: response.status,
            });
        }
        self.checked_body(response).map(Some)
    }

    fn checked_body(&self, response: HttpResponse) -> Result<Vec<u8>> {
        let max = self.config.max_calendar_response_bytes;
        if response.body.len() > max {
            return Err(ClientError::ResponseTooLarge {
                len: response.body.len(),
                max,
            });
        }
        Ok(response.body)
    }
}
