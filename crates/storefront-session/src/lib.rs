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

//! Session state for the storefront client.
//!
//! Layout: `storage.rs` (persisted key-value backends), `store.rs`
//! (`CredentialStore` and the `ProfileSource` seam), `error.rs` (error types).

pub mod error;
pub mod storage;
pub mod store;

pub use error::{SessionError, SessionResult};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, TOKEN_KEY};
pub use store::{CredentialStore, FetchOutcome, ProfileSource, SessionState};
