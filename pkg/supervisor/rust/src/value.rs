// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::error::Fault;
use std::collections::BTreeMap;

pub const FAULT_CODE: &str = "faultCode";
pub const FAULT_STRING: &str = "faultString";

/// An XML-RPC value as carried in requests and responses.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Bool(bool),
    String(String),
    Double(f64),
    /// `dateTime.iso8601` text, left uninterpreted.
    DateTime(String),
    Base64(Vec<u8>),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Struct(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a struct member. Returns `None` for non-struct values.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_struct().and_then(|m| m.get(key))
    }

    /// True when this is a fault envelope: a struct carrying both
    /// `faultCode` and `faultString`.
    pub fn is_fault(&self) -> bool {
        self.get(FAULT_CODE).is_some() && self.get(FAULT_STRING).is_some()
    }

    /// Extract the fault carried by a fault envelope, or give the value back.
    ///
    /// A non-integer code is reported as 0 and a non-string message is
    /// rendered as empty, so a malformed envelope still surfaces as a fault.
    pub fn into_fault(self) -> Result<Fault, Value> {
        if !self.is_fault() {
            return Err(self);
        }
        let code = self.get(FAULT_CODE).and_then(Value::as_i32).unwrap_or(0);
        let message = self
            .get(FAULT_STRING)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(Fault { code, message })
    }

    /// A response that carries no usable value: nil, or any falsy scalar
    /// or empty container (`false`, `0`, `0.0`, `""`, `"0"`, `[]`, `{}`).
    pub fn is_empty_response(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Double(d) => *d == 0.0,
            Value::String(s) => s.is_empty() || s == "0",
            Value::DateTime(_) => false,
            Value::Base64(b) => b.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Struct(members) => members.is_empty(),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Struct(v)
    }
}
