//! This module is responsible for interfacing with Kubernetes.
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::ListParams;
use kube_core::Selector;

use crate::error::Result;

pub mod namespaces;
pub mod pods;

#[cfg(test)]
pub(crate) mod fake;

pub mod consts {
    pub const ENV_SERVICE_HOST: &str = "KUBERNETES_SERVICE_HOST";
    pub const ENV_SERVICE_PORT: &str = "KUBERNETES_SERVICE_PORT";
    pub const ENV_HOSTNAME: &str = "HOSTNAME";
    /// The namespace that is always searched last.
    pub const DEFAULT_NAMESPACE: &str = "default";
    /// Namespaces carrying this label are searched before the fallback.
    pub const DEFAULT_SELECTOR: &str = "name=deis";
    /// Containers tend to put their address on eth0.
    pub const DEFAULT_INTERFACE: &str = "eth0";
}

/// The subset of the API server that self-discovery needs.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// List the names of namespaces matching `selector`, in the order the API server returns them.
    async fn list_namespaces(&self, selector: &Selector) -> Result<Vec<String>>;

    /// Get the pod called `name` in `namespace`.
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod>;
}

#[async_trait]
impl ControlPlane for kube::Client {
    async fn list_namespaces(&self, selector: &Selector) -> Result<Vec<String>> {
        let namespaces: kube::Api<Namespace> = kube::Api::all(self.clone());
        let list_params = ListParams::default().labels_from(selector).timeout(10);
        let namespace_list = namespaces.list(&list_params).await?;

        Ok(namespace_list
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        let pods: kube::Api<Pod> = kube::Api::namespaced(self.clone(), namespace);
        Ok(pods.get(name).await?)
    }
}
