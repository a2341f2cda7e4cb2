//! Lets a process running inside a pod find out about itself.
//!
//! Typical usage is to seed a [`Me`] from the pod environment and resolve it
//! against the API server:
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! let client = kube::Client::try_default().await?;
//! let options = aboutme::SearchOptions::default();
//! let mut me = aboutme::Me::from_env(&options)?;
//! me.resolve(&client, &options).await?;
//! println!("My pod name is {} in {}", me.name(), me.namespace);
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod env;
pub mod error;
pub mod k8s;
pub mod me;
pub mod net;
pub mod selector;

pub use config::{Config, SearchOptions};
pub use error::{Error, Result};
pub use me::Me;
