//! Mention ingestion and lazy-mint lifecycle.
//!
//! The recurring pipeline: poll the mention feed, deduplicate against the
//! store, provision identities and wallets on demand, parse mention text
//! into artifact fields, and lazy-mint. Finalization (purchase/transfer) is
//! a separate, explicitly-invoked transition.

pub mod fixtures;
pub mod ingestor;
pub mod lifecycle;
pub mod parser;
pub mod scheduler;
pub mod service;
pub mod traits;

pub use ingestor::{IngestStats, Ingestor};
pub use lifecycle::LifecycleController;
pub use service::Mintloom;
pub use traits::{MentionSource, XMentionFeed};
