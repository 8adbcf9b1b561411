// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! XML-RPC envelopes for the value set Supervisor speaks.

use crate::value::{FAULT_CODE, FAULT_STRING, Value};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("invalid XML-RPC document: {0}")]
    Invalid(String),
}

fn invalid(msg: impl Into<String>) -> CodecError {
    CodecError::Invalid(msg.into())
}

/// Encode a `methodCall` document.
pub fn encode_request(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>\n");
    out
}

/// Encode a `methodResponse` carrying `value`.
pub fn encode_response(value: &Value) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodResponse><params><param>");
    write_value(&mut out, value);
    out.push_str("</param></params></methodResponse>\n");
    out
}

/// Encode a fault `methodResponse`.
pub fn encode_fault(code: i32, message: &str) -> String {
    let mut members = BTreeMap::new();
    members.insert(FAULT_CODE.to_string(), Value::Int(code));
    members.insert(FAULT_STRING.to_string(), Value::from(message));
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodResponse><fault>");
    write_value(&mut out, &Value::Struct(members));
    out.push_str("</fault></methodResponse>\n");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(i) => {
            let _ = write!(out, "<int>{i}</int>");
        }
        Value::Bool(b) => {
            let _ = write!(out, "<boolean>{}</boolean>", u8::from(*b));
        }
        Value::String(s) => {
            let _ = write!(out, "<string>{}</string>", escape(s.as_str()));
        }
        Value::Double(d) => {
            let _ = write!(out, "<double>{d}</double>");
        }
        Value::DateTime(s) => {
            let _ = write!(out, "<dateTime.iso8601>{}</dateTime.iso8601>", escape(s.as_str()));
        }
        Value::Base64(bytes) => {
            let _ = write!(out, "<base64>{}</base64>", STANDARD.encode(bytes));
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                let _ = write!(out, "<member><name>{}</name>", escape(name.as_str()));
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

/// Decode a `methodResponse` document.
///
/// Returns the single result value, the fault struct for a fault envelope,
/// or `None` when the response carries no param.
pub fn decode_response(body: &str) -> Result<Option<Value>, CodecError> {
    let mut p = Parser::new(body);

    match p.next_tag()? {
        Tok::Open(name) if name == "methodResponse" => {}
        Tok::Empty(name) if name == "methodResponse" => return Ok(None),
        other => return Err(invalid(format!("expected <methodResponse>, found {other}"))),
    }

    let value = match p.next_tag()? {
        Tok::Open(name) if name == "params" => {
            let value = match p.next_tag()? {
                Tok::Open(name) if name == "param" => {
                    let v = p.value()?;
                    p.expect_close("param")?;
                    p.expect_close("params")?;
                    Some(v)
                }
                Tok::Close(name) if name == "params" => None,
                other => return Err(invalid(format!("expected <param>, found {other}"))),
            };
            p.expect_close("methodResponse")?;
            value
        }
        Tok::Empty(name) if name == "params" => {
            p.expect_close("methodResponse")?;
            None
        }
        Tok::Open(name) if name == "fault" => {
            let v = p.value()?;
            p.expect_close("fault")?;
            p.expect_close("methodResponse")?;
            if !v.is_fault() {
                return Err(invalid("fault envelope without faultCode/faultString"));
            }
            Some(v)
        }
        Tok::Close(name) if name == "methodResponse" => None,
        other => return Err(invalid(format!("expected <params> or <fault>, found {other}"))),
    };

    Ok(value)
}

/// Flattened event stream. Text is kept escaped until an element closes.
#[derive(Debug)]
enum Tok {
    Open(String),
    Close(String),
    Empty(String),
    Text(String),
    Eof,
}

impl std::fmt::Display for Tok {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Open(n) => write!(f, "<{n}>"),
            Tok::Close(n) => write!(f, "</{n}>"),
            Tok::Empty(n) => write!(f, "<{n}/>"),
            Tok::Text(_) => write!(f, "text"),
            Tok::Eof => write!(f, "end of document"),
        }
    }
}

struct Parser<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Parser<'a> {
    fn new(body: &'a str) -> Self {
        Self {
            reader: Reader::from_str(body),
        }
    }

    fn next(&mut self) -> Result<Tok, CodecError> {
        loop {
            let tok = match self.reader.read_event()? {
                Event::Start(e) => Tok::Open(utf8(e.name().as_ref())?),
                Event::End(e) => Tok::Close(utf8(e.name().as_ref())?),
                Event::Empty(e) => Tok::Empty(utf8(e.name().as_ref())?),
                Event::Text(e) => Tok::Text(utf8(&e)?),
                Event::CData(e) => Tok::Text(escape(utf8(&e)?.as_str()).into_owned()),
                Event::GeneralRef(e) => Tok::Text(format!("&{};", utf8(&e)?)),
                Event::Eof => Tok::Eof,
                _ => continue,
            };
            return Ok(tok);
        }
    }

    /// Next tag, skipping inter-element whitespace.
    fn next_tag(&mut self) -> Result<Tok, CodecError> {
        loop {
            match self.next()? {
                Tok::Text(t) if t.trim().is_empty() => continue,
                Tok::Text(_) => return Err(invalid("unexpected text between elements")),
                tok => return Ok(tok),
            }
        }
    }

    fn expect_close(&mut self, name: &str) -> Result<(), CodecError> {
        match self.next_tag()? {
            Tok::Close(n) if n == name => Ok(()),
            other => Err(invalid(format!("expected </{name}>, found {other}"))),
        }
    }

    /// Unescaped text content up to the closing tag of `name`.
    fn text_until_close(&mut self, name: &str) -> Result<String, CodecError> {
        let mut raw = String::new();
        loop {
            match self.next()? {
                Tok::Text(t) => raw.push_str(&t),
                Tok::Close(n) if n == name => break,
                other => return Err(invalid(format!("expected text in <{name}>, found {other}"))),
            }
        }
        unescape(&raw)
            .map(|s| s.into_owned())
            .map_err(|e| invalid(format!("bad escape in <{name}>: {e}")))
    }

    /// Parse a `<value>` element.
    fn value(&mut self) -> Result<Value, CodecError> {
        match self.next_tag()? {
            Tok::Open(n) if n == "value" => {}
            Tok::Empty(n) if n == "value" => return Ok(Value::String(String::new())),
            other => return Err(invalid(format!("expected <value>, found {other}"))),
        }

        self.value_after_open()
    }

    fn typed(&mut self, ty: &str) -> Result<Value, CodecError> {
        let v = match ty {
            "i4" | "int" | "i8" => {
                let text = self.text_until_close(ty)?;
                let n: i64 = text
                    .trim()
                    .parse()
                    .map_err(|_| invalid(format!("bad integer: {text:?}")))?;
                let n = i32::try_from(n)
                    .map_err(|_| invalid(format!("integer out of range: {n}")))?;
                Value::Int(n)
            }
            "boolean" => {
                let text = self.text_until_close(ty)?;
                match text.trim() {
                    "1" => Value::Bool(true),
                    "0" => Value::Bool(false),
                    other => return Err(invalid(format!("bad boolean: {other:?}"))),
                }
            }
            "string" => Value::String(self.text_until_close(ty)?),
            "double" => {
                let text = self.text_until_close(ty)?;
                let d: f64 = text
                    .trim()
                    .parse()
                    .map_err(|_| invalid(format!("bad double: {text:?}")))?;
                Value::Double(d)
            }
            "dateTime.iso8601" => Value::DateTime(self.text_until_close(ty)?.trim().to_string()),
            "base64" => {
                let text = self.text_until_close(ty)?;
                let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                let bytes = STANDARD
                    .decode(compact)
                    .map_err(|e| invalid(format!("bad base64: {e}")))?;
                Value::Base64(bytes)
            }
            "nil" => {
                self.expect_close("nil")?;
                Value::Nil
            }
            "array" => self.array()?,
            "struct" => self.structure()?,
            other => return Err(invalid(format!("unknown value type <{other}>"))),
        };
        Ok(v)
    }

    fn array(&mut self) -> Result<Value, CodecError> {
        let mut items = Vec::new();
        match self.next_tag()? {
            Tok::Open(n) if n == "data" => {}
            Tok::Empty(n) if n == "data" => {
                self.expect_close("array")?;
                return Ok(Value::Array(items));
            }
            other => return Err(invalid(format!("expected <data>, found {other}"))),
        }
        loop {
            match self.next_tag()? {
                Tok::Open(n) if n == "value" => {
                    items.push(self.value_after_open()?);
                }
                Tok::Empty(n) if n == "value" => items.push(Value::String(String::new())),
                Tok::Close(n) if n == "data" => break,
                other => return Err(invalid(format!("unexpected {other} in <data>"))),
            }
        }
        self.expect_close("array")?;
        Ok(Value::Array(items))
    }

    fn structure(&mut self) -> Result<Value, CodecError> {
        let mut members = BTreeMap::new();
        loop {
            match self.next_tag()? {
                Tok::Open(n) if n == "member" => {
                    match self.next_tag()? {
                        Tok::Open(n) if n == "name" => {}
                        other => return Err(invalid(format!("expected <name>, found {other}"))),
                    }
                    let name = self.text_until_close("name")?;
                    let value = self.value()?;
                    self.expect_close("member")?;
                    members.insert(name, value);
                }
                Tok::Close(n) if n == "struct" => break,
                other => return Err(invalid(format!("unexpected {other} in <struct>"))),
            }
        }
        Ok(Value::Struct(members))
    }

    /// Contents of a `<value>` whose start tag was already consumed.
    /// Untyped content is a string; whitespace before a type tag is not.
    fn value_after_open(&mut self) -> Result<Value, CodecError> {
        let mut raw = String::new();
        loop {
            match self.next()? {
                Tok::Text(t) => raw.push_str(&t),
                Tok::Close(n) if n == "value" => {
                    return unescape(&raw)
                        .map(|s| Value::String(s.into_owned()))
                        .map_err(|e| invalid(format!("bad escape in <value>: {e}")));
                }
                Tok::Open(ty) if raw.trim().is_empty() => {
                    let v = self.typed(&ty)?;
                    self.expect_close("value")?;
                    return Ok(v);
                }
                Tok::Empty(ty) if raw.trim().is_empty() => {
                    let v = empty_typed(&ty)?;
                    self.expect_close("value")?;
                    return Ok(v);
                }
                other => return Err(invalid(format!("unexpected {other} in <value>"))),
            }
        }
    }
}

fn empty_typed(ty: &str) -> Result<Value, CodecError> {
    match ty {
        "string" => Ok(Value::String(String::new())),
        "base64" => Ok(Value::Base64(Vec::new())),
        "nil" => Ok(Value::Nil),
        "array" => Ok(Value::Array(Vec::new())),
        "struct" => Ok(Value::Struct(BTreeMap::new())),
        other => Err(invalid(format!("empty <{other}/> has no value"))),
    }
}

fn utf8(bytes: &[u8]) -> Result<String, CodecError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| invalid(format!("invalid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(inner: &str) -> String {
        format!(
            "<?xml version='1.0'?>\n<methodResponse>\n<params>\n<param>\n{inner}\n</param>\n</params>\n</methodResponse>\n"
        )
    }

    #[test]
    fn test_encode_request_no_params() {
        let xml = encode_request("supervisor.getState", &[]);
        assert!(xml.contains("<methodName>supervisor.getState</methodName>"));
        assert!(xml.contains("<params></params>"));
    }

    #[test]
    fn test_encode_request_params() {
        let xml = encode_request(
            "supervisor.startProcess",
            &[Value::from("web:web_0"), Value::Bool(true)],
        );
        assert!(xml.contains(
            "<param><value><string>web:web_0</string></value></param><param><value><boolean>1</boolean></value></param>"
        ));
    }

    #[test]
    fn test_encode_escapes_strings() {
        let xml = encode_request("supervisor.sendProcessStdin", &[Value::from("a<b&c")]);
        assert!(xml.contains("<string>a&lt;b&amp;c</string>"));
    }

    #[test]
    fn test_encode_nested() {
        let mut call = BTreeMap::new();
        call.insert("methodName".to_string(), Value::from("supervisor.getPID"));
        call.insert("params".to_string(), Value::Array(vec![]));
        let xml = encode_request("system.multicall", &[Value::Array(vec![Value::Struct(call)])]);
        assert!(xml.contains("<array><data><value><struct><member><name>methodName</name>"));
        assert!(xml.contains("<member><name>params</name><value><array><data></data></array></value></member>"));
    }

    #[test]
    fn test_decode_scalars() {
        let cases = [
            ("<value><int>42</int></value>", Value::Int(42)),
            ("<value><i4>-7</i4></value>", Value::Int(-7)),
            ("<value><boolean>1</boolean></value>", Value::Bool(true)),
            ("<value><boolean>0</boolean></value>", Value::Bool(false)),
            ("<value><string>3.0</string></value>", Value::from("3.0")),
            ("<value>untyped</value>", Value::from("untyped")),
            ("<value><double>1.5</double></value>", Value::Double(1.5)),
            (
                "<value><dateTime.iso8601>20260101T00:00:00</dateTime.iso8601></value>",
                Value::DateTime("20260101T00:00:00".to_string()),
            ),
            ("<value><base64>aGk=</base64></value>", Value::Base64(b"hi".to_vec())),
            ("<value><nil/></value>", Value::Nil),
            ("<value><string/></value>", Value::from("")),
        ];
        for (inner, expected) in cases {
            let decoded = decode_response(&response(inner)).unwrap();
            assert_eq!(decoded, Some(expected), "decoding {inner}");
        }
    }

    #[test]
    fn test_decode_preserves_string_whitespace_and_entities() {
        let decoded = decode_response(&response(
            "<value><string>  line1\nline2 &amp; &lt;tag&gt; &#x41;\n</string></value>",
        ))
        .unwrap()
        .unwrap();
        assert_eq!(decoded, Value::from("  line1\nline2 & <tag> A\n"));
    }

    #[test]
    fn test_decode_struct() {
        let decoded = decode_response(&response(
            r#"<value><struct>
<member><name>name</name><value><string>cat</string></value></member>
<member><name>pid</name><value><int>1234</int></value></member>
<member><name>spawnerr</name><value><string></string></value></member>
</struct></value>"#,
        ))
        .unwrap()
        .unwrap();
        assert_eq!(decoded.get("name"), Some(&Value::from("cat")));
        assert_eq!(decoded.get("pid"), Some(&Value::Int(1234)));
        assert_eq!(decoded.get("spawnerr"), Some(&Value::from("")));
    }

    #[test]
    fn test_decode_array() {
        let decoded = decode_response(&response(
            "<value><array><data>\n<value><string>a</string></value>\n<value><int>1</int></value>\n<value><array><data/></array></value>\n</data></array></value>",
        ))
        .unwrap()
        .unwrap();
        assert_eq!(
            decoded,
            Value::Array(vec![Value::from("a"), Value::Int(1), Value::Array(vec![])])
        );
    }

    #[test]
    fn test_decode_fault() {
        let body = r#"<?xml version='1.0'?>
<methodResponse>
<fault>
<value><struct>
<member><name>faultCode</name><value><int>10</int></value></member>
<member><name>faultString</name><value><string>BAD_NAME: nope</string></value></member>
</struct></value>
</fault>
</methodResponse>"#;
        let fault = decode_response(body).unwrap().unwrap().into_fault().unwrap();
        assert_eq!(fault.code, 10);
        assert_eq!(fault.message, "BAD_NAME: nope");
    }

    #[test]
    fn test_decode_no_param() {
        assert_eq!(
            decode_response("<methodResponse><params></params></methodResponse>").unwrap(),
            None
        );
        assert_eq!(decode_response("<methodResponse/>").unwrap(), None);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_response("").is_err());
        assert!(decode_response("<html><body>502</body></html>").is_err());
        assert!(decode_response(&response("<value><int>abc</int></value>")).is_err());
        assert!(decode_response(&response("<value><int>99999999999</int></value>")).is_err());
        assert!(decode_response(&response("<value><boolean>yes</boolean></value>")).is_err());
    }

    #[test]
    fn test_encoded_fault_decodes() {
        let decoded = decode_response(&encode_fault(70, "NOT_RUNNING")).unwrap().unwrap();
        let fault = decoded.into_fault().unwrap();
        assert_eq!((fault.code, fault.message.as_str()), (70, "NOT_RUNNING"));
    }

    #[test]
    fn test_encoded_response_decodes() {
        let body = encode_response(&Value::from("<3.4.0>"));
        assert_eq!(decode_response(&body).unwrap(), Some(Value::from("<3.4.0>")));
    }

    #[test]
    fn test_decode_fault_without_members_is_invalid() {
        let body = "<methodResponse><fault><value><struct></struct></value></fault></methodResponse>";
        assert!(decode_response(body).is_err());
    }
}
