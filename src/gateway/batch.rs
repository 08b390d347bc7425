use std::thread;

use serde_json::{Map, Value};

use super::client::RpcTransport;
use crate::error::{DashboardError, Result};

/// One named procedure call with its full parameter record
#[derive(Debug, Clone)]
pub struct RpcCall {
    pub endpoint: &'static str,
    pub params: Value,
}

impl RpcCall {
    /// Call with the shared filter parameters only
    pub fn new(endpoint: &'static str, shared: &Map<String, Value>) -> Self {
        Self {
            endpoint,
            params: Value::Object(shared.clone()),
        }
    }

    /// Layer a call-specific parameter over the shared ones
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self.params {
            map.insert(key.to_string(), value.into());
        }
        self
    }
}

/// Run every call concurrently and wait for all of them.
///
/// Results come back in call order. Any failure fails the whole batch
/// with a single `BatchFailed` error listing every failed endpoint.
pub fn gather<T>(transport: &T, calls: &[RpcCall]) -> Result<Vec<Value>>
where
    T: RpcTransport + ?Sized,
{
    let outcomes: Vec<Result<Value>> = thread::scope(|scope| {
        let handles: Vec<_> = calls
            .iter()
            .map(|call| scope.spawn(move || transport.call(call.endpoint, &call.params)))
            .collect();

        handles
            .into_iter()
            .zip(calls)
            .map(|(handle, call)| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(DashboardError::WorkerPanicked(call.endpoint.to_string())))
            })
            .collect()
    });

    let mut values = Vec::with_capacity(calls.len());
    let mut failed = Vec::new();
    let mut first = None;

    for (outcome, call) in outcomes.into_iter().zip(calls) {
        match outcome {
            Ok(value) => values.push(value),
            Err(err) => {
                tracing::error!(endpoint = call.endpoint, error = %err, "aggregation call failed");
                failed.push(call.endpoint.to_string());
                first.get_or_insert(err);
            }
        }
    }

    if let Some(first) = first {
        return Err(DashboardError::BatchFailed {
            failed,
            total: calls.len(),
            first: Box::new(first),
        });
    }

    tracing::info!(calls = calls.len(), "aggregation batch complete");
    Ok(values)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses per endpoint; records every parameter record it sees
    pub(crate) struct FakeTransport {
        responses: HashMap<&'static str, Value>,
        failing: Vec<&'static str>,
        pub(crate) seen: Mutex<Vec<(String, Value)>>,
    }

    impl FakeTransport {
        pub(crate) fn new() -> Self {
            Self {
                responses: HashMap::new(),
                failing: Vec::new(),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn respond(mut self, endpoint: &'static str, value: Value) -> Self {
            self.responses.insert(endpoint, value);
            self
        }

        pub(crate) fn fail(mut self, endpoint: &'static str) -> Self {
            self.failing.push(endpoint);
            self
        }

        pub(crate) fn params_for(&self, endpoint: &str) -> Option<Value> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .find(|(name, _)| name == endpoint)
                .map(|(_, params)| params.clone())
        }
    }

    impl RpcTransport for FakeTransport {
        fn call(&self, endpoint: &str, params: &Value) -> Result<Value> {
            self.seen
                .lock()
                .unwrap()
                .push((endpoint.to_string(), params.clone()));
            if self.failing.iter().any(|f| *f == endpoint) {
                return Err(DashboardError::Backend {
                    endpoint: endpoint.to_string(),
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(self.responses.get(endpoint).cloned().unwrap_or(Value::Null))
        }
    }

    fn shared() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("p_fund".to_string(), json!(["A"]));
        map.insert("p_city".to_string(), Value::Null);
        map
    }

    const SIX: [&str; 6] = ["one", "two", "three", "four", "five", "six"];

    #[test]
    fn results_follow_call_order() {
        let transport = SIX
            .iter()
            .enumerate()
            .fold(FakeTransport::new(), |t, (i, name)| t.respond(*name, json!(i)));
        let calls: Vec<RpcCall> = SIX.iter().map(|name| RpcCall::new(*name, &shared())).collect();

        let values = gather(&transport, &calls).unwrap();
        assert_eq!(values, (0..6).map(|i| json!(i)).collect::<Vec<_>>());
    }

    #[test]
    fn one_failure_fails_the_whole_batch() {
        let transport = FakeTransport::new().fail("four");
        let calls: Vec<RpcCall> = SIX.iter().map(|name| RpcCall::new(*name, &shared())).collect();

        let err = gather(&transport, &calls).unwrap_err();
        match &err {
            DashboardError::BatchFailed { failed, total, .. } => {
                assert_eq!(failed, &vec!["four".to_string()]);
                assert_eq!(*total, 6);
            }
            other => panic!("expected batch failure, got {other:?}"),
        }
        assert!(err.to_string().starts_with("1 of 6 requests failed (four)"));
        // every call was still issued
        assert_eq!(transport.seen.lock().unwrap().len(), 6);
    }

    #[test]
    fn every_failure_is_reported_once() {
        let transport = FakeTransport::new().fail("two").fail("five");
        let calls: Vec<RpcCall> = SIX.iter().map(|name| RpcCall::new(*name, &shared())).collect();

        let err = gather(&transport, &calls).unwrap_err();
        assert_eq!(err.failed_endpoints(), vec!["two", "five"]);
    }

    #[test]
    fn extras_layer_on_shared_params() {
        let transport = FakeTransport::new();
        let calls = vec![
            RpcCall::new("plain", &shared()),
            RpcCall::new("limited", &shared()).with("p_limit", 8),
        ];
        gather(&transport, &calls).unwrap();

        assert_eq!(
            transport.params_for("plain").unwrap(),
            json!({"p_fund": ["A"], "p_city": null})
        );
        assert_eq!(
            transport.params_for("limited").unwrap(),
            json!({"p_fund": ["A"], "p_city": null, "p_limit": 8})
        );
    }

    #[test]
    fn empty_batch_succeeds() {
        let values = gather(&FakeTransport::new(), &[]).unwrap();
        assert!(values.is_empty());
    }
}
