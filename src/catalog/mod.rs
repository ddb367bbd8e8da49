//! Track catalog: the data model shared by the server and the player, and the
//! HTTP client that fetches it.

pub mod client;
pub mod models;

pub use client::CatalogClient;
pub use models::{Catalog, Track};
