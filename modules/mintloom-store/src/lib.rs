//! The Record Store: authoritative, concurrency-safe storage for identities,
//! wallets, and artifacts, plus the secondary indexes the pipeline depends on.

pub mod store;

pub use store::ArtifactStore;
