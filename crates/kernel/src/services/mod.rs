//! Catalogue services.
//!
//! Route handlers stay thin; these services own the listing protocol and the
//! review write path, and talk to storage only through `CatalogStore`.

pub mod catalog;
pub mod review;

pub use catalog::{CatalogService, ProductDetail};
pub use review::{ReviewError, ReviewService, ReviewSubmission};
