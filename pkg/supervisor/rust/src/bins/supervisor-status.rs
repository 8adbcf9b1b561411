// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use supervisor_rpc::config::{config_path, load_config};
use supervisor_rpc::{ManagerConfig, ProcessManager, Reaction, StatusWatcher, Watcher};

/// Query the state of Supervisor-managed processes over XML-RPC.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// YAML config file. Defaults to $SUPERVISOR_RPC_CONFIG when set.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Supervisor address as host:port.
    #[arg(long)]
    dns: Option<String>,

    #[arg(long, short = 'u')]
    username: Option<String>,

    #[arg(long, short = 'p')]
    password: Option<String>,

    /// Re-check every SECS seconds instead of exiting after one query.
    #[arg(long, value_name = "SECS")]
    watch: Option<u64>,

    /// With --watch, ask Supervisor to start fatal processes.
    #[arg(long, requires = "watch")]
    restart: bool,

    #[arg(long, short = 'v')]
    verbose: bool,

    /// Process names (`name` or `group:name`). Appended to the configured list.
    processes: Vec<String>,
}

fn resolve_config(cli: &Cli) -> Result<ManagerConfig> {
    let path = cli.config.clone().or_else(|| {
        let path = config_path();
        path.exists().then_some(path)
    });
    let mut config = match path {
        Some(path) => load_config(&path)?,
        None => ManagerConfig::default(),
    };

    if let Some(ref dns) = cli.dns {
        config.dns = dns.clone();
    }
    if let Some(ref username) = cli.username {
        config.username = username.clone();
    }
    if let Some(ref password) = cli.password {
        config.password = password.clone();
    }
    config.processes.extend(cli.processes.iter().cloned());
    Ok(config)
}

fn print_report(watcher: &StatusWatcher) {
    for h in watcher.last_report() {
        match (&h.state, &h.fault) {
            (None, Some(fault)) => println!("{} FAULT {fault}", h.name),
            (state, _) => println!(
                "{} {} {}",
                h.name,
                state.as_deref().unwrap_or("UNKNOWN"),
                h.pid.unwrap_or(0)
            ),
        }
    }
}

/// Runs one pass and reports whether any process is fatal.
fn query_once(manager: ProcessManager) -> Result<bool> {
    let mut watcher = StatusWatcher::new(manager, Reaction::LogOnly);
    watcher.observe().context("querying process status")?;
    print_report(&watcher);
    Ok(watcher.any_fatal())
}

fn watch_loop(manager: ProcessManager, interval: Duration, reaction: Reaction) -> ! {
    let mut watcher = StatusWatcher::new(manager, reaction);
    loop {
        match watcher.observe() {
            Ok(()) => print_report(&watcher),
            Err(e) => error!("watch pass failed: {e}"),
        }
        std::thread::sleep(interval);
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level)?;

    let config = resolve_config(&cli)?;
    if config.processes.is_empty() {
        anyhow::bail!("no processes given on the command line or in the config");
    }

    let manager = ProcessManager::new(&config);
    info!(
        "querying {} process(es) on {}",
        manager.processes().len(),
        manager.client().url()
    );

    if let Some(secs) = cli.watch {
        let reaction = if cli.restart {
            Reaction::Restart { wait: true }
        } else {
            Reaction::LogOnly
        };
        watch_loop(manager, Duration::from_secs(secs.max(1)), reaction);
    }

    if query_once(manager)? {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "dns: 10.0.0.1:9001\nusername: www\nprocesses: [web]\n").unwrap();

        let cli = Cli::parse_from([
            "supervisor-status",
            "--config",
            path.to_str().unwrap(),
            "--dns",
            "10.0.0.2:9001",
            "worker",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.dns, "10.0.0.2:9001");
        assert_eq!(config.username, "www");
        assert_eq!(config.processes, vec!["web", "worker"]);
    }

    #[test]
    fn test_restart_requires_watch() {
        assert!(Cli::try_parse_from(["supervisor-status", "--restart", "web"]).is_err());
        assert!(
            Cli::try_parse_from(["supervisor-status", "--watch", "5", "--restart", "web"]).is_ok()
        );
    }
}
