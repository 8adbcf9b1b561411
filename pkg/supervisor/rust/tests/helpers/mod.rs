// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// A request as seen by the fake Supervisor.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Recorded {
    pub fn method_name(&self) -> &str {
        let start = self.body.find("<methodName>").expect("no methodName") + "<methodName>".len();
        let end = self.body.find("</methodName>").expect("no /methodName");
        &self.body[start..end]
    }
}

pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Fake Supervisor endpoint serving one canned reply per connection.
pub struct FakeSupervisor {
    pub addr: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    thread: Option<JoinHandle<()>>,
}

impl FakeSupervisor {
    pub fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake supervisor");
        let addr = listener.local_addr().unwrap().to_string();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let thread = std::thread::spawn(move || {
            for reply in replies {
                let (stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                if let Some(req) = serve(stream, &reply) {
                    recorded.lock().unwrap().push(req);
                }
            }
        });

        Self {
            addr,
            requests,
            thread: Some(thread),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait until every canned reply has been served.
    pub fn join(mut self) -> Vec<Recorded> {
        if let Some(t) = self.thread.take() {
            t.join().expect("fake supervisor thread panicked");
        }
        self.requests()
    }
}

fn serve(stream: TcpStream, reply: &Reply) -> Option<Recorded> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            headers.insert(k.trim().to_ascii_lowercase(), v.trim().to_string());
        }
    }

    let len: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).ok()?;

    let reason = if reply.status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason,
        reply.body.len(),
        reply.body
    );
    let mut stream = stream;
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()?;

    Some(Recorded {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// A `getProcessInfo` reply shaped like the one supervisord 4.x sends.
pub fn process_info_xml(name: &str, statename: &str, state: i32, pid: i32) -> String {
    format!(
        r#"<?xml version='1.0'?>
<methodResponse>
<params>
<param>
<value><struct>
<member>
<name>description</name>
<value><string>pid {pid}, uptime 0:10:00</string></value>
</member>
<member>
<name>pid</name>
<value><int>{pid}</int></value>
</member>
<member>
<name>stderr_logfile</name>
<value><string></string></value>
</member>
<member>
<name>stop</name>
<value><int>0</int></value>
</member>
<member>
<name>logfile</name>
<value><string>/var/log/supervisor/{name}.log</string></value>
</member>
<member>
<name>exitstatus</name>
<value><int>0</int></value>
</member>
<member>
<name>spawnerr</name>
<value><string></string></value>
</member>
<member>
<name>now</name>
<value><int>1760000600</int></value>
</member>
<member>
<name>group</name>
<value><string>{name}</string></value>
</member>
<member>
<name>name</name>
<value><string>{name}</string></value>
</member>
<member>
<name>statename</name>
<value><string>{statename}</string></value>
</member>
<member>
<name>start</name>
<value><int>1760000000</int></value>
</member>
<member>
<name>state</name>
<value><int>{state}</int></value>
</member>
<member>
<name>stdout_logfile</name>
<value><string>/var/log/supervisor/{name}.log</string></value>
</member>
</struct></value>
</param>
</params>
</methodResponse>
"#
    )
}

pub fn fault_xml(code: i32, message: &str) -> String {
    format!(
        r#"<?xml version='1.0'?>
<methodResponse>
<fault>
<value><struct>
<member>
<name>faultCode</name>
<value><int>{code}</int></value>
</member>
<member>
<name>faultString</name>
<value><string>{message}</string></value>
</member>
</struct></value>
</fault>
</methodResponse>
"#
    )
}

pub fn bool_xml(value: bool) -> String {
    format!(
        "<?xml version='1.0'?>\n<methodResponse>\n<params>\n<param>\n<value><boolean>{}</boolean></value>\n</param>\n</params>\n</methodResponse>\n",
        u8::from(value)
    )
}

/// An address nothing listens on.
pub fn closed_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    addr
}
