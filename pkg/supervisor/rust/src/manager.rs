// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::client::Client;
use crate::config::ManagerConfig;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::transport::{HttpTransport, Transport};

/// The only state name treated as healthy.
pub const RUNNING: &str = "RUNNING";

/// Every state other than `RUNNING` is fatal, including transitional ones
/// such as `STARTING` and names Supervisor does not define.
pub fn is_fatal(state: &str) -> bool {
    state != RUNNING
}

/// One observation pass over a set of processes.
///
/// Implementers choose which calls to make and how to react to fatal
/// processes. Repeating `observe` is left to the caller.
pub trait Watcher {
    fn observe(&mut self) -> Result<(), Error>;
}

/// A client plus the ordered list of process names to watch.
pub struct ProcessManager<T: Transport = HttpTransport> {
    client: Client<T>,
    processes: Vec<String>,
}

impl ProcessManager<HttpTransport> {
    pub fn new(config: &ManagerConfig) -> Self {
        let endpoint = Endpoint::new(&config.dns, &config.username, &config.password);
        let client = Client::with_transport(endpoint, HttpTransport::new(config.timeout()));
        let mut manager = Self::with_client(client);
        manager.set_processes(config.processes.clone());
        manager
    }
}

impl<T: Transport> ProcessManager<T> {
    pub fn with_client(client: Client<T>) -> Self {
        Self {
            client,
            processes: Vec::new(),
        }
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    pub fn set_client(&mut self, client: Client<T>) {
        self.client = client;
    }

    pub fn processes(&self) -> &[String] {
        &self.processes
    }

    /// Append `name`. Duplicates are kept.
    pub fn add_process(&mut self, name: &str) -> &mut Self {
        self.processes.push(name.to_string());
        self
    }

    pub fn set_processes(&mut self, names: Vec<String>) {
        self.processes = names;
    }

    pub fn is_fatal(&self, state: &str) -> bool {
        is_fatal(state)
    }
}
