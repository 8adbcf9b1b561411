// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Typed results for Supervisor capabilities, decoded from [`Value`].

use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name of the shape a value failed to match. Becomes
/// [`Error::UnexpectedShape`](crate::Error::UnexpectedShape) in the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeError(pub &'static str);

/// Process states as reported by Supervisor, with their numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    Stopped,
    Starting,
    Running,
    Backoff,
    Stopping,
    Exited,
    Fatal,
    Unknown,
}

impl ProcessState {
    pub fn code(self) -> i32 {
        match self {
            ProcessState::Stopped => 0,
            ProcessState::Starting => 10,
            ProcessState::Running => 20,
            ProcessState::Backoff => 30,
            ProcessState::Stopping => 40,
            ProcessState::Exited => 100,
            ProcessState::Fatal => 200,
            ProcessState::Unknown => 1000,
        }
    }

    /// Codes Supervisor does not define map to `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ProcessState::Stopped,
            10 => ProcessState::Starting,
            20 => ProcessState::Running,
            30 => ProcessState::Backoff,
            40 => ProcessState::Stopping,
            100 => ProcessState::Exited,
            200 => ProcessState::Fatal,
            _ => ProcessState::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessState::Stopped => "STOPPED",
            ProcessState::Starting => "STARTING",
            ProcessState::Running => "RUNNING",
            ProcessState::Backoff => "BACKOFF",
            ProcessState::Stopping => "STOPPING",
            ProcessState::Exited => "EXITED",
            ProcessState::Fatal => "FATAL",
            ProcessState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessState {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let state = match s {
            "STOPPED" => ProcessState::Stopped,
            "STARTING" => ProcessState::Starting,
            "RUNNING" => ProcessState::Running,
            "BACKOFF" => ProcessState::Backoff,
            "STOPPING" => ProcessState::Stopping,
            "EXITED" => ProcessState::Exited,
            "FATAL" => ProcessState::Fatal,
            "UNKNOWN" => ProcessState::Unknown,
            _ => return Err(ShapeError("process state name")),
        };
        Ok(state)
    }
}

/// Result of `getState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorState {
    pub code: i32,
    pub name: String,
}

/// One entry of `getProcessInfo` / `getAllProcessInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub name: String,
    pub group: String,
    pub description: String,
    pub start: i32,
    pub stop: i32,
    pub now: i32,
    pub state: i32,
    pub statename: String,
    pub spawnerr: String,
    pub exitstatus: i32,
    pub logfile: String,
    pub stdout_logfile: String,
    pub stderr_logfile: String,
    pub pid: i32,
}

impl ProcessInfo {
    pub fn process_state(&self) -> ProcessState {
        ProcessState::from_code(self.state)
    }

    /// `group:name`, the form Supervisor accepts as a process name.
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.group, self.name)
    }
}

/// Per-process outcome of group/all lifecycle calls and `clearAllProcessLogs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStatus {
    pub name: String,
    pub group: String,
    pub status: i32,
    pub description: String,
}

/// Result of the `tailProcess*Log` calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTail {
    pub bytes: String,
    pub offset: i32,
    pub overflow: bool,
}

/// Result of `reloadConfig`: group names added, changed and removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigChanges {
    pub added: Vec<String>,
    pub changed: Vec<String>,
    pub removed: Vec<String>,
}

struct Fields<'a>(&'a BTreeMap<String, Value>, &'static str);

impl<'a> Fields<'a> {
    fn of(value: &'a Value, shape: &'static str) -> Result<Self, ShapeError> {
        value.as_struct().map(|m| Fields(m, shape)).ok_or(ShapeError(shape))
    }

    fn int(&self, key: &str) -> Result<i32, ShapeError> {
        self.0.get(key).and_then(Value::as_i32).ok_or(ShapeError(self.1))
    }

    fn string(&self, key: &str) -> Result<String, ShapeError> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ShapeError(self.1))
    }

    /// Members that older Supervisor releases omit.
    fn string_or_default(&self, key: &str) -> String {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

impl TryFrom<Value> for SupervisorState {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let f = Fields::of(&value, "struct {statecode, statename}")?;
        Ok(SupervisorState {
            code: f.int("statecode")?,
            name: f.string("statename")?,
        })
    }
}

impl TryFrom<Value> for ProcessInfo {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let f = Fields::of(&value, "process info struct")?;
        Ok(ProcessInfo {
            name: f.string("name")?,
            group: f.string("group")?,
            description: f.string_or_default("description"),
            start: f.int("start")?,
            stop: f.int("stop")?,
            now: f.int("now")?,
            state: f.int("state")?,
            statename: f.string("statename")?,
            spawnerr: f.string_or_default("spawnerr"),
            exitstatus: f.int("exitstatus")?,
            logfile: f.string_or_default("logfile"),
            stdout_logfile: f.string_or_default("stdout_logfile"),
            stderr_logfile: f.string_or_default("stderr_logfile"),
            pid: f.int("pid")?,
        })
    }
}

impl TryFrom<Value> for ProcessStatus {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let f = Fields::of(&value, "struct {name, group, status, description}")?;
        Ok(ProcessStatus {
            name: f.string("name")?,
            group: f.string("group")?,
            status: f.int("status")?,
            description: f.string_or_default("description"),
        })
    }
}

impl TryFrom<Value> for LogTail {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        const SHAPE: ShapeError = ShapeError("array [string, int, boolean]");
        match value {
            Value::Array(items) => match items.as_slice() {
                [Value::String(bytes), Value::Int(offset), Value::Bool(overflow)] => Ok(LogTail {
                    bytes: bytes.clone(),
                    offset: *offset,
                    overflow: *overflow,
                }),
                _ => Err(SHAPE),
            },
            _ => Err(SHAPE),
        }
    }
}

impl TryFrom<Value> for ConfigChanges {
    type Error = ShapeError;

    /// Supervisor wraps the three lists in an extra single-element array.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        const SHAPE: ShapeError = ShapeError("array [[added, changed, removed]]");
        let outer = value.as_array().ok_or(SHAPE)?;
        let inner = match outer {
            [Value::Array(inner)] => inner.as_slice(),
            _ => return Err(SHAPE),
        };
        match inner {
            [added, changed, removed] => Ok(ConfigChanges {
                added: strings(added).ok_or(SHAPE)?,
                changed: strings(changed).ok_or(SHAPE)?,
                removed: strings(removed).ok_or(SHAPE)?,
            }),
            _ => Err(SHAPE),
        }
    }
}

/// A flat array of strings.
pub(crate) fn strings(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// An array of values each converted with `TryFrom<Value>`.
pub(crate) fn list_of<T>(value: Value, shape: &'static str) -> Result<Vec<T>, ShapeError>
where
    T: TryFrom<Value, Error = ShapeError>,
{
    match value {
        Value::Array(items) => items.into_iter().map(T::try_from).collect(),
        _ => Err(ShapeError(shape)),
    }
}
