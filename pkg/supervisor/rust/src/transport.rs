// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use log::debug;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP {code} from {url}")]
    Status { url: String, code: u16 },
    #[error("request to {url} failed: {reason}")]
    Connection { url: String, reason: String },
    #[error("reading response body: {0}")]
    Io(#[from] std::io::Error),
}

/// Delivers one encoded request and returns the raw response body.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: &str,
    ) -> Result<String, TransportError>;
}

/// Blocking HTTP transport. The timeout bounds the whole call.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Transport for HttpTransport {
    fn post(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: &str,
    ) -> Result<String, TransportError> {
        let mut request = self.agent.post(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }

        match request.send_string(body) {
            Ok(resp) => {
                debug!("POST {url} -> {}", resp.status());
                Ok(resp.into_string()?)
            }
            Err(ureq::Error::Status(code, _)) => Err(TransportError::Status {
                url: url.to_string(),
                code,
            }),
            Err(e) => Err(TransportError::Connection {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
