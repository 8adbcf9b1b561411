// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

pub const RPC_PATH: &str = "/RPC2";
pub const DEFAULT_DNS: &str = "127.0.0.1:9001";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// `Authorization` header value for HTTP basic auth.
    pub fn authorization(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

/// A Supervisor XML-RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    credentials: Option<Credentials>,
}

impl Endpoint {
    /// `dns` is `host:port`, optionally with a scheme. An empty `username`
    /// means no credentials.
    pub fn new(dns: &str, username: &str, password: &str) -> Self {
        let credentials = (!username.is_empty()).then(|| Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });
        Self {
            url: rpc_url(dns),
            credentials,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn set_url(&mut self, url: String) {
        self.url = url;
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

/// Build the `/RPC2` URL for `dns`. The suffix is appended exactly once.
pub fn rpc_url(dns: &str) -> String {
    let base = dns.trim().trim_end_matches('/');
    let base = base.strip_suffix(RPC_PATH).unwrap_or(base);
    if base.contains("://") {
        format!("{base}{RPC_PATH}")
    } else {
        format!("http://{base}{RPC_PATH}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_url_with_scheme() {
        assert_eq!(rpc_url("http://host:9001"), "http://host:9001/RPC2");
        assert_eq!(rpc_url("https://host:9001/"), "https://host:9001/RPC2");
    }

    #[test]
    fn test_rpc_url_without_scheme() {
        assert_eq!(rpc_url("192.168.10.10:9001"), "http://192.168.10.10:9001/RPC2");
    }

    #[test]
    fn test_rpc_url_suffix_once() {
        assert_eq!(rpc_url("http://host:9001/RPC2"), "http://host:9001/RPC2");
        assert_eq!(rpc_url(&rpc_url("host:9001")), "http://host:9001/RPC2");
    }

    #[test]
    fn test_credentials_authorization() {
        let ep = Endpoint::new("host:9001", "user", "pass");
        let creds = ep.credentials().unwrap();
        // base64("user:pass")
        assert_eq!(creds.authorization(), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_empty_username_has_no_credentials() {
        let ep = Endpoint::new("host:9001", "", "ignored");
        assert!(ep.credentials().is_none());
    }

    #[test]
    fn test_default_dns() {
        assert_eq!(Endpoint::new(DEFAULT_DNS, "", "").url(), "http://127.0.0.1:9001/RPC2");
    }
}
