#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Client configuration sourced from the environment.
//!
//! Layout: `model.rs` (typed configuration), `loader.rs` (environment lookup),
//! `validate.rs` (field parsing), `defaults.rs` (fallback values).

mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_API_URL, ENV_HOME, ENV_LOG, ENV_LOG_FORMAT, ENV_SESSION_FILE};
pub use model::ClientConfig;
pub use validate::{parse_api_url, parse_log_format};
