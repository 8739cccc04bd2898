pub mod aggregate;
pub mod cache;
pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod connect;
pub mod diagnostics;
pub mod document;
pub mod engine;
pub mod error;
pub mod layout;
pub mod model;
pub mod mutate;
pub mod snapshot;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use document::TopologyDocument;
pub use engine::{BuildOutput, Engine, build_document};
pub use error::{Error, Result};
