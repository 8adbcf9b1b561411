// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::error::{Error, Fault};
use crate::manager::{ProcessManager, Watcher};
use crate::transport::{HttpTransport, Transport};
use log::{debug, info, warn};

/// What a [`StatusWatcher`] does with a fatal process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    LogOnly,
    Restart { wait: bool },
}

/// Outcome for one process in the latest pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHealth {
    pub name: String,
    /// Reported state name, or `None` when the lookup faulted.
    pub state: Option<String>,
    pub pid: Option<i32>,
    pub fatal: bool,
    pub fault: Option<Fault>,
    pub restarted: bool,
}

/// Checks each managed process with `getProcessInfo` once per `observe`.
///
/// A fault for one process (e.g. `BAD_NAME`) is recorded as fatal and the
/// pass continues. Transport and protocol errors abort the pass.
pub struct StatusWatcher<T: Transport = HttpTransport> {
    manager: ProcessManager<T>,
    reaction: Reaction,
    last_report: Vec<ProcessHealth>,
}

impl<T: Transport> StatusWatcher<T> {
    pub fn new(manager: ProcessManager<T>, reaction: Reaction) -> Self {
        Self {
            manager,
            reaction,
            last_report: Vec::new(),
        }
    }

    pub fn manager(&self) -> &ProcessManager<T> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ProcessManager<T> {
        &mut self.manager
    }

    pub fn last_report(&self) -> &[ProcessHealth] {
        &self.last_report
    }

    /// True when the latest pass found at least one fatal process.
    pub fn any_fatal(&self) -> bool {
        self.last_report.iter().any(|h| h.fatal)
    }

    fn check(&self, name: &str) -> Result<ProcessHealth, Error> {
        let client = self.manager.client();
        let info = match client.get_process_info(name) {
            Ok(info) => info,
            Err(Error::Fault(fault)) => {
                warn!("[{name}] status lookup faulted: {fault}");
                return Ok(ProcessHealth {
                    name: name.to_string(),
                    state: None,
                    pid: None,
                    fatal: true,
                    fault: Some(fault),
                    restarted: false,
                });
            }
            Err(e) => return Err(e),
        };

        let fatal = self.manager.is_fatal(&info.statename);
        let mut health = ProcessHealth {
            name: name.to_string(),
            state: Some(info.statename.clone()),
            pid: Some(info.pid),
            fatal,
            fault: None,
            restarted: false,
        };

        if !fatal {
            debug!("[{name}] {} (pid={})", info.statename, info.pid);
            return Ok(health);
        }

        warn!("[{name}] is {}", info.statename);
        if let Reaction::Restart { wait } = self.reaction {
            match client.start_process(name, wait) {
                Ok(started) => {
                    info!("[{name}] restart requested (started={started})");
                    health.restarted = started;
                }
                Err(Error::Fault(fault)) => {
                    warn!("[{name}] restart faulted: {fault}");
                    health.fault = Some(fault);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(health)
    }
}

impl<T: Transport> Watcher for StatusWatcher<T> {
    fn observe(&mut self) -> Result<(), Error> {
        let mut report = Vec::with_capacity(self.manager.processes().len());
        for name in self.manager.processes() {
            report.push(self.check(name)?);
        }
        let fatal = report.iter().filter(|h| h.fatal).count();
        debug!("observed {} process(es), {fatal} fatal", report.len());
        self.last_report = report;
        Ok(())
    }
}
