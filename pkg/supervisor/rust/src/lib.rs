// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Typed client for the Supervisor process-control daemon's XML-RPC API.
//!
//! [`Client`] turns one typed method per Supervisor capability into a
//! single synchronous XML-RPC round trip. [`ProcessManager`] groups a list
//! of process names with a client and classifies their reported state;
//! concrete polling passes implement [`Watcher`].

pub mod client;
pub mod codec;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod manager;
pub mod transport;
pub mod types;
pub mod value;
pub mod watch;

pub use client::{Call, Client};
pub use config::ManagerConfig;
pub use endpoint::{Credentials, Endpoint};
pub use error::{Error, Fault};
pub use manager::{ProcessManager, RUNNING, Watcher, is_fatal};
pub use transport::{HttpTransport, Transport, TransportError};
pub use types::{ConfigChanges, LogTail, ProcessInfo, ProcessState, ProcessStatus, SupervisorState};
pub use value::Value;
pub use watch::{ProcessHealth, Reaction, StatusWatcher};
