//! In-memory control plane used by the tests. Records every call it receives.
use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube_core::{Selector, SelectorExt as _};
use serde_json::json;

use super::ControlPlane;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub enum Call {
    ListNamespaces(Selector),
    GetPod { namespace: String, name: String },
}

#[derive(Default)]
pub struct FakeControlPlane {
    namespaces: Vec<(String, BTreeMap<String, String>)>,
    list_failure: Option<String>,
    pods: BTreeMap<(String, String), Pod>,
    pod_failures: BTreeMap<String, (u16, String)>,
    calls: Mutex<Vec<Call>>,
}

/// Build the error kube returns for a failed API call.
pub fn api_error(code: u16, message: &str) -> Error {
    Error::Transport(kube::Error::Api(kube_core::ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: if code == 404 { "NotFound" } else { "InternalError" }.to_string(),
        code,
    }))
}

/// The API status code carried by a transport error, if any.
pub fn status_code(err: &Error) -> Option<u16> {
    match err {
        Error::Transport(kube::Error::Api(response)) => Some(response.code),
        _ => None,
    }
}

/// The API status message carried by a transport error, if any.
pub fn status_message(err: &Error) -> Option<&str> {
    match err {
        Error::Transport(kube::Error::Api(response)) => Some(response.message.as_str()),
        _ => None,
    }
}

pub fn pod(name: &str, namespace: &str, uid: &str, labels: serde_json::Value) -> Pod {
    serde_json::from_value(json!({
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": uid,
            "labels": labels,
            "annotations": { "from-the-pod": "true" },
        },
        "spec": {
            "containers": [{ "name": name, "image": "busybox:latest" }]
        },
        "status": {
            "podIP": "10.244.1.7",
            "hostIP": "192.168.49.2",
        }
    }))
    .unwrap()
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, name: &str, labels: &[(&str, &str)]) -> Self {
        let labels = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.namespaces.push((name.to_string(), labels));
        self
    }

    /// Make the namespace listing fail with a server error.
    pub fn with_list_failure(mut self, message: &str) -> Self {
        self.list_failure = Some(message.to_string());
        self
    }

    pub fn with_pod(mut self, pod: Pod) -> Self {
        let namespace = pod.metadata.namespace.clone().unwrap_or_default();
        let name = pod.metadata.name.clone().unwrap_or_default();
        self.pods.insert((namespace, name), pod);
        self
    }

    /// Make every pod lookup in `namespace` fail with the given status.
    pub fn with_pod_failure(mut self, namespace: &str, code: u16, message: &str) -> Self {
        self.pod_failures
            .insert(namespace.to_string(), (code, message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The namespaces pod lookups were issued against, in order.
    pub fn pod_lookups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::GetPod { namespace, .. } => Some(namespace),
                Call::ListNamespaces(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn list_namespaces(&self, selector: &Selector) -> Result<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::ListNamespaces(selector.clone()));

        if let Some(message) = &self.list_failure {
            return Err(api_error(500, message));
        }
        Ok(self
            .namespaces
            .iter()
            .filter(|(_, labels)| selector.matches(labels))
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        self.calls.lock().unwrap().push(Call::GetPod {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });

        if let Some((code, message)) = self.pod_failures.get(namespace) {
            return Err(api_error(*code, message));
        }
        self.pods
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| api_error(404, &format!("pods \"{name}\" not found")))
    }
}
