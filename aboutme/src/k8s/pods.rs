use k8s_openapi::api::core::v1::Pod;

use super::{namespaces::NamespaceCandidates, ControlPlane};
use crate::error::{Error, Result};

/// Find the pod called `name` by searching `candidates` in order.
///
/// The first namespace that returns the pod wins, even if later candidates hold a
/// pod with the same name. When every lookup fails, the error of the last attempt
/// (the fallback namespace) is returned inside [`Error::NotFound`]; earlier
/// failures are only logged.
pub async fn locate_pod<C: ControlPlane + ?Sized>(
    client: &C,
    candidates: &NamespaceCandidates,
    name: &str,
) -> Result<(Pod, String)> {
    for namespace in &candidates.selected {
        match client.get_pod(namespace, name).await {
            Ok(pod) => {
                tracing::debug!("Found pod {:?} in namespace {:?}", name, namespace);
                return Ok((pod, namespace.clone()));
            }
            Err(e) => {
                tracing::debug!("Pod {:?} not in namespace {:?}: {}", name, namespace, e);
            }
        }
    }

    // Last ditch.
    let namespace = &candidates.fallback;
    match client.get_pod(namespace, name).await {
        Ok(pod) => {
            tracing::debug!("Found pod {:?} in fallback namespace {:?}", name, namespace);
            Ok((pod, namespace.clone()))
        }
        Err(source) => Err(Error::NotFound {
            name: name.to_string(),
            namespace: namespace.clone(),
            source: Box::new(source),
        }),
    }
}
