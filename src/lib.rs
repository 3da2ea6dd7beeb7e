//! BoardLite: a lightweight board backend core.
//!
//! Posts are BSON documents with localized titles and epoch-millis string
//! timestamps; every accepted edit snapshots the prior state into an
//! immutable trace tagged with a per-post version. Listings are filtered by
//! a compact q-expression language compiled into aggregation pipelines, and
//! single-post reads go through a TTL cache.
//!
//! The service core is generic over three collaborator traits — [`Store`],
//! [`SequenceAllocator`] and [`Cache`] — with in-memory reference
//! implementations provided for embedding and testing.

pub mod config;
pub mod errors;
pub mod logger;
pub mod model;
pub mod query;
pub mod service;
pub mod store;

pub use config::ServiceConfig;
pub use errors::Error;
pub use service::PostService;
pub use store::{Cache, MemoryCache, MemorySequences, MemoryStore, SequenceAllocator, Store};

/// Initializes logging from `log4rs.yaml`; call once at startup.
///
/// # Errors
/// Propagates configuration-file and initialization failures.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()
}
