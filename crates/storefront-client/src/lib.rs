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

//! HTTP dispatcher for the storefront REST backend.
//!
//! Layout:
//! - `client.rs`: `ApiClient`, the credential hook and failure normalization
//! - `users.rs`, `products.rs`, `uploads.rs`: per-resource wrappers
//! - `error.rs`: construction errors

pub mod client;
pub mod error;
pub mod products;
pub mod uploads;
pub mod users;

pub use client::{ApiClient, ApiClientBuilder, HEADER_REQUEST_ID, normalize_failure};
pub use error::{ClientError, ClientResult};
pub use products::Products;
pub use uploads::{UploadFile, Uploads};
pub use users::Users;
