//! The pod's view of itself.
use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Pod;
use serde::Serialize;

use crate::{
    config::SearchOptions,
    error::{Error, Result},
    k8s::{consts, namespaces::namespace_candidates, pods::locate_pod, ControlPlane},
};

/// Information about the running pod.
///
/// Built from the environment with [`Me::from_env`], then filled in from the API
/// server by [`Me::resolve`]. Until resolution succeeds only `api_server` and `name`
/// are meaningful and `namespace` holds the fallback namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub api_server: String,
    name: String,
    pub namespace: String,
    pub ip: String,
    pub node_ip: String,
    pub self_link: String,
    pub uid: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,

    #[serde(skip)]
    resolved: bool,
}

impl Me {
    /// A Me that only knows what it was told. `namespace` is the fallback namespace
    /// until [`Me::resolve`] confirms another one.
    pub fn seeded(
        api_server: impl Into<String>,
        name: impl Into<String>,
        fallback_namespace: impl Into<String>,
    ) -> Self {
        Self {
            api_server: api_server.into(),
            name: name.into(),
            namespace: fallback_namespace.into(),
            ip: String::new(),
            node_ip: String::new(),
            self_link: String::new(),
            uid: String::new(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            resolved: false,
        }
    }

    /// Seed a new Me from the pod environment.
    ///
    /// This only works inside a pod: the API server address comes from the
    /// service variables Kubernetes injects, and the name from `HOSTNAME`.
    pub fn from_env(options: &SearchOptions) -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok(), options)
    }

    pub fn from_lookup<F>(lookup: F, options: &SearchOptions) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(Error::MissingEnv { var: key })
        };
        let host = var(consts::ENV_SERVICE_HOST)?;
        let port = var(consts::ENV_SERVICE_PORT)?;
        let name = var(consts::ENV_HOSTNAME)?;

        // IPv6 hosts must be bracketed in a URL.
        let host = if host.contains(':') {
            format!("[{host}]")
        } else {
            host
        };
        Ok(Self::seeded(
            format!("https://{host}:{port}"),
            name,
            options.fallback_namespace.clone(),
        ))
    }

    /// The name this pod was started with. It never changes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the control plane fields reflect a located pod.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Find this pod on the API server and fill in everything the API server knows.
    ///
    /// On error nothing but the seed fields is meaningful and the Me is left exactly
    /// as it was.
    pub async fn resolve<C: ControlPlane + ?Sized>(
        &mut self,
        client: &C,
        options: &SearchOptions,
    ) -> Result<()> {
        let candidates = namespace_candidates(client, options).await;
        tracing::debug!(
            "Searching for pod {:?} in {:?}",
            self.name,
            candidates.iter().collect::<Vec<_>>()
        );

        let (pod, namespace) = locate_pod(client, &candidates, &self.name).await?;
        self.apply(&pod, namespace);

        tracing::info!(
            "Resolved pod {:?} in namespace {:?} (uid={})",
            self.name,
            self.namespace,
            self.uid
        );
        Ok(())
    }

    /// Copy the located pod into this Me.
    ///
    /// Only labels are taken from the pod; annotations keep their current value.
    pub fn apply(&mut self, pod: &Pod, namespace: String) {
        let status = pod.status.as_ref();

        self.ip = status.and_then(|s| s.pod_ip.clone()).unwrap_or_default();
        self.node_ip = status.and_then(|s| s.host_ip.clone()).unwrap_or_default();
        // API servers stopped populating selfLink in 1.20.
        self.self_link = pod
            .metadata
            .self_link
            .clone()
            .unwrap_or_else(|| format!("/api/v1/namespaces/{}/pods/{}", namespace, self.name));
        self.uid = pod.metadata.uid.clone().unwrap_or_default();
        self.labels = pod.metadata.labels.clone().unwrap_or_default();
        self.namespace = namespace;
        self.resolved = true;
    }
}
