//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use swquery_spacewalk::{RpcTransport, Value, XmlRpcError, XmlRpcResult};

/// Transport that answers from a fixed script and records every call.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<(String, XmlRpcResult<Value>)>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next call to `method`.
    pub fn reply(self, method: &str, result: XmlRpcResult<Value>) -> Self {
        self.script.lock().unwrap().push_back((method.to_string(), result));
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(m, _)| m).collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.methods().iter().filter(|m| *m == method).count()
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn call(&self, method: &str, params: Vec<Value>) -> XmlRpcResult<Value> {
        self.calls.lock().unwrap().push((method.to_string(), params));
        let (expected, result) = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted call to {method}"));
        assert_eq!(expected, method, "calls arrived out of order");
        result
    }
}

pub fn record(name: &str, id: Option<i64>) -> Value {
    let mut members = BTreeMap::new();
    members.insert("name".to_string(), Value::from(name));
    if let Some(id) = id {
        members.insert("id".to_string(), Value::Int(id));
    }
    Value::Struct(members)
}

pub fn inventory() -> Value {
    Value::Array(vec![record("web01", Some(1)), record("db01", Some(2))])
}

pub fn fault(message: &str) -> XmlRpcError {
    XmlRpcError::Fault { code: -1, message: message.to_string() }
}
