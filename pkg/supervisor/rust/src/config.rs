// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::endpoint::DEFAULT_DNS;
use crate::transport::DEFAULT_TIMEOUT;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "/etc/supervisor-rpc/config.yaml";

fn default_dns() -> String {
    DEFAULT_DNS.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Connection settings plus the processes a manager watches.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ManagerConfig {
    #[serde(default = "default_dns")]
    pub dns: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub processes: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            dns: default_dns(),
            username: String::new(),
            password: String::new(),
            processes: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ManagerConfig {
    /// Per-call timeout; never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

pub fn config_path() -> PathBuf {
    std::env::var("SUPERVISOR_RPC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub fn load_config(path: &Path) -> Result<ManagerConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: ManagerConfig =
        serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    ensure!(
        config.timeout_secs > 0,
        "{}: timeout_secs must be at least 1",
        path.display()
    );
    Ok(config)
}
