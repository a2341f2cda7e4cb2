//! Error types for pod self-discovery.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The label selector does not follow the Kubernetes selector grammar.
    #[error("invalid label selector {selector:?}: {reason}")]
    SelectorParse { selector: String, reason: String },

    /// A call to the API server failed. This includes API statuses such as 404.
    #[error("control plane request failed: {0}")]
    Transport(#[from] kube::Error),

    /// No candidate namespace holds a pod with the declared name.
    /// `source` is the failure of the last attempt only.
    #[error("pod {name:?} not found in any candidate namespace (last tried {namespace:?})")]
    NotFound {
        name: String,
        namespace: String,
        #[source]
        source: Box<Error>,
    },

    #[error("no IPv4 address found on interface {interface:?}")]
    NoAddressFound { interface: String },

    #[error("environment variable {var} is not set")]
    MissingEnv { var: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}
