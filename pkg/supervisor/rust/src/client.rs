// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::codec;
use crate::endpoint::{Endpoint, rpc_url};
use crate::error::{Error, Fault};
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    ConfigChanges, LogTail, ProcessInfo, ProcessStatus, ShapeError, SupervisorState, list_of,
    strings,
};
use crate::value::Value;
use log::debug;
use std::collections::{BTreeMap, HashMap};

pub const NAMESPACE: &str = "supervisor.";

/// Prefix bare method names with `supervisor.`; dotted names pass through.
pub fn namespaced(method: &str) -> String {
    if method.contains('.') {
        method.to_string()
    } else {
        format!("{NAMESPACE}{method}")
    }
}

/// One entry of a `system.multicall` batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub params: Vec<Value>,
}

impl Call {
    pub fn new(method: &str, params: Vec<Value>) -> Self {
        Self {
            method: namespaced(method),
            params,
        }
    }

    fn into_value(self) -> Value {
        let mut m = BTreeMap::new();
        m.insert("methodName".to_string(), Value::String(self.method));
        m.insert("params".to_string(), Value::Array(self.params));
        Value::Struct(m)
    }
}

/// Client for one Supervisor endpoint. Every method is one blocking round
/// trip; nothing is cached between calls.
pub struct Client<T: Transport = HttpTransport> {
    endpoint: Endpoint,
    headers: HashMap<String, String>,
    transport: T,
}

impl Client<HttpTransport> {
    /// HTTP client for `dns` (`host:port`). An empty `username` sends no
    /// `Authorization` header.
    pub fn new(dns: &str, username: &str, password: &str) -> Self {
        Self::with_transport(
            Endpoint::new(dns, username, password),
            HttpTransport::default(),
        )
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(endpoint: Endpoint, transport: T) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/xml".to_string());
        if let Some(creds) = endpoint.credentials() {
            headers.insert("Authorization".to_string(), creds.authorization());
        }
        Self {
            endpoint,
            headers,
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn url(&self) -> &str {
        self.endpoint.url()
    }

    pub fn set_url(&mut self, dns: &str) {
        self.endpoint.set_url(rpc_url(dns));
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn set_headers(&mut self, headers: HashMap<String, String>) {
        self.headers = headers;
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Invoke `method` with `args` and return the decoded result.
    ///
    /// Fails with [`Error::Transport`] when the request cannot be delivered,
    /// [`Error::Protocol`] when the response is falsy or unparseable, and
    /// [`Error::Fault`] when the peer answers with a fault envelope.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value, Error> {
        let method = namespaced(method);
        let url = self.url();
        debug!("calling {method} on {url} ({} arg(s))", args.len());

        let body = codec::encode_request(&method, args);
        let raw = self.transport.post(url, &self.headers, &body)?;

        let decoded = codec::decode_response(raw.trim()).map_err(|e| Error::Protocol {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let value = match decoded {
            Some(v) if !v.is_empty_response() => v,
            _ => {
                return Err(Error::Protocol {
                    url: url.to_string(),
                    reason: "empty response".to_string(),
                });
            }
        };

        match value.into_fault() {
            Ok(fault) => {
                debug!("{method} faulted: {fault}");
                Err(Error::Fault(fault))
            }
            Err(value) => Ok(value),
        }
    }

    fn shape<R>(method: &str, r: Result<R, ShapeError>) -> Result<R, Error> {
        r.map_err(|ShapeError(expected)| Error::UnexpectedShape {
            method: namespaced(method),
            expected,
        })
    }

    fn call_string(&self, method: &str, args: &[Value]) -> Result<String, Error> {
        let v = self.call(method, args)?;
        let r = match v {
            Value::String(s) => Ok(s),
            _ => Err(ShapeError("string")),
        };
        Self::shape(method, r)
    }

    fn call_bool(&self, method: &str, args: &[Value]) -> Result<bool, Error> {
        let v = self.call(method, args)?;
        Self::shape(method, v.as_bool().ok_or(ShapeError("boolean")))
    }

    fn call_int(&self, method: &str, args: &[Value]) -> Result<i32, Error> {
        let v = self.call(method, args)?;
        Self::shape(method, v.as_i32().ok_or(ShapeError("int")))
    }

    fn call_typed<R>(&self, method: &str, args: &[Value]) -> Result<R, Error>
    where
        R: TryFrom<Value, Error = ShapeError>,
    {
        let v = self.call(method, args)?;
        Self::shape(method, R::try_from(v))
    }

    fn call_list<R>(&self, method: &str, args: &[Value]) -> Result<Vec<R>, Error>
    where
        R: TryFrom<Value, Error = ShapeError>,
    {
        let v = self.call(method, args)?;
        Self::shape(method, list_of(v, "array of structs"))
    }

    // -- status and control --

    pub fn get_api_version(&self) -> Result<String, Error> {
        self.call_string("getAPIVersion", &[])
    }

    pub fn get_supervisor_version(&self) -> Result<String, Error> {
        self.call_string("getSupervisorVersion", &[])
    }

    pub fn get_identification(&self) -> Result<String, Error> {
        self.call_string("getIdentification", &[])
    }

    pub fn get_state(&self) -> Result<SupervisorState, Error> {
        self.call_typed("getState", &[])
    }

    pub fn get_pid(&self) -> Result<i32, Error> {
        self.call_int("getPID", &[])
    }

    /// Read `length` bytes of the main log from `offset`.
    pub fn read_log(&self, offset: i32, length: i32) -> Result<String, Error> {
        self.call_string("readLog", &[offset.into(), length.into()])
    }

    pub fn clear_log(&self) -> Result<bool, Error> {
        self.call_bool("clearLog", &[])
    }

    pub fn shutdown(&self) -> Result<bool, Error> {
        self.call_bool("shutdown", &[])
    }

    pub fn restart(&self) -> Result<bool, Error> {
        self.call_bool("restart", &[])
    }

    pub fn reload_config(&self) -> Result<ConfigChanges, Error> {
        self.call_typed("reloadConfig", &[])
    }

    // -- process control --

    pub fn get_process_info(&self, name: &str) -> Result<ProcessInfo, Error> {
        self.call_typed("getProcessInfo", &[name.into()])
    }

    pub fn get_all_process_info(&self) -> Result<Vec<ProcessInfo>, Error> {
        self.call_list("getAllProcessInfo", &[])
    }

    pub fn start_process(&self, name: &str, wait: bool) -> Result<bool, Error> {
        self.call_bool("startProcess", &[name.into(), wait.into()])
    }

    pub fn stop_process(&self, name: &str, wait: bool) -> Result<bool, Error> {
        self.call_bool("stopProcess", &[name.into(), wait.into()])
    }

    pub fn start_process_group(&self, name: &str, wait: bool) -> Result<Vec<ProcessStatus>, Error> {
        self.call_list("startProcessGroup", &[name.into(), wait.into()])
    }

    pub fn stop_process_group(&self, name: &str, wait: bool) -> Result<Vec<ProcessStatus>, Error> {
        self.call_list("stopProcessGroup", &[name.into(), wait.into()])
    }

    pub fn start_all_processes(&self, wait: bool) -> Result<Vec<ProcessStatus>, Error> {
        self.call_list("startAllProcesses", &[wait.into()])
    }

    pub fn stop_all_processes(&self, wait: bool) -> Result<Vec<ProcessStatus>, Error> {
        self.call_list("stopAllProcesses", &[wait.into()])
    }

    /// `signal` is a name (`HUP`) or number, as Supervisor accepts either.
    pub fn signal_process(&self, name: &str, signal: &str) -> Result<bool, Error> {
        self.call_bool("signalProcess", &[name.into(), signal.into()])
    }

    pub fn signal_process_group(
        &self,
        name: &str,
        signal: &str,
    ) -> Result<Vec<ProcessStatus>, Error> {
        self.call_list("signalProcessGroup", &[name.into(), signal.into()])
    }

    pub fn signal_all_processes(&self, signal: &str) -> Result<Vec<ProcessStatus>, Error> {
        self.call_list("signalAllProcesses", &[signal.into()])
    }

    pub fn send_process_stdin(&self, name: &str, chars: &str) -> Result<bool, Error> {
        self.call_bool("sendProcessStdin", &[name.into(), chars.into()])
    }

    pub fn send_remote_comm_event(&self, kind: &str, data: &str) -> Result<bool, Error> {
        self.call_bool("sendRemoteCommEvent", &[kind.into(), data.into()])
    }

    // -- group configuration --

    pub fn add_process_group(&self, name: &str) -> Result<bool, Error> {
        self.call_bool("addProcessGroup", &[name.into()])
    }

    pub fn remove_process_group(&self, name: &str) -> Result<bool, Error> {
        self.call_bool("removeProcessGroup", &[name.into()])
    }

    // -- process logs --

    pub fn read_process_stdout_log(
        &self,
        name: &str,
        offset: i32,
        length: i32,
    ) -> Result<String, Error> {
        self.call_string(
            "readProcessStdoutLog",
            &[name.into(), offset.into(), length.into()],
        )
    }

    pub fn read_process_stderr_log(
        &self,
        name: &str,
        offset: i32,
        length: i32,
    ) -> Result<String, Error> {
        self.call_string(
            "readProcessStderrLog",
            &[name.into(), offset.into(), length.into()],
        )
    }

    pub fn tail_process_stdout_log(
        &self,
        name: &str,
        offset: i32,
        length: i32,
    ) -> Result<LogTail, Error> {
        self.call_typed(
            "tailProcessStdoutLog",
            &[name.into(), offset.into(), length.into()],
        )
    }

    pub fn tail_process_stderr_log(
        &self,
        name: &str,
        offset: i32,
        length: i32,
    ) -> Result<LogTail, Error> {
        self.call_typed(
            "tailProcessStderrLog",
            &[name.into(), offset.into(), length.into()],
        )
    }

    pub fn clear_process_logs(&self, name: &str) -> Result<bool, Error> {
        self.call_bool("clearProcessLogs", &[name.into()])
    }

    pub fn clear_all_process_logs(&self) -> Result<Vec<ProcessStatus>, Error> {
        self.call_list("clearAllProcessLogs", &[])
    }

    // -- introspection --

    pub fn list_methods(&self) -> Result<Vec<String>, Error> {
        let method = "system.listMethods";
        let v = self.call(method, &[])?;
        Self::shape(method, strings(&v).ok_or(ShapeError("array of strings")))
    }

    /// Help for `supervisor.<name>`. `name` is always prefixed.
    pub fn method_help(&self, name: &str) -> Result<String, Error> {
        self.call_string("system.methodHelp", &[format!("{NAMESPACE}{name}").into()])
    }

    /// Signature of `supervisor.<name>` as XML-RPC type names, return type
    /// first. `name` is always prefixed.
    pub fn method_signature(&self, name: &str) -> Result<Vec<String>, Error> {
        let method = "system.methodSignature";
        let v = self.call(method, &[format!("{NAMESPACE}{name}").into()])?;
        let flat = strings(&v).or_else(|| match v.as_array() {
            Some([first, ..]) => strings(first),
            _ => None,
        });
        Self::shape(method, flat.ok_or(ShapeError("array of type names")))
    }

    /// Run `calls` in one round trip. Results keep the order of `calls`;
    /// a call that faulted yields `Err` in its slot without failing the batch.
    pub fn multicall(&self, calls: Vec<Call>) -> Result<Vec<Result<Value, Fault>>, Error> {
        let method = "system.multicall";
        let batch = Value::Array(calls.into_iter().map(Call::into_value).collect());
        match self.call(method, &[batch])? {
            Value::Array(results) => Ok(results
                .into_iter()
                .map(Value::into_fault)
                .map(flip)
                .collect()),
            _ => Self::shape(method, Err(ShapeError("array of results"))),
        }
    }
}

fn flip(r: Result<Fault, Value>) -> Result<Value, Fault> {
    match r {
        Ok(fault) => Err(fault),
        Err(value) => Ok(value),
    }
}
