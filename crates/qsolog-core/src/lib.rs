//! # QsoLog Core
//!
//! Storage- and transport-agnostic logic for QsoLog: the ADIF interchange
//! codec, the canonical contact model, the contact store abstraction, the
//! import reconciler, and the duplicate collapser.
//!
//! This crate contains no tokio, sqlx, network, or filesystem I/O. Side
//! effects are limited to `tracing` events, which stay silent unless the
//! embedding application installs a subscriber.
//!
//! ## Data Flow
//!
//! ```text
//! raw text ──▶ adif::tokenize ──▶ adif::Decoder ──▶ QsoRecord ──▶ Reconciler ──▶ ContactStore
//!                                                                                   │
//!                                               collapse_duplicates ◀───────────────┘
//! ```

pub mod adif;
pub mod band;
pub mod collapse;
pub mod error;
pub mod models;
pub mod progress;
pub mod reconcile;
pub mod source;
pub mod store;

pub use adif::{decode_all, encode_record, tokenize, Decoder};
pub use collapse::collapse_duplicates;
pub use error::RecordError;
pub use models::{
    CollapseOutcome, DedupKey, ImportOutcome, ImportPolicy, QsoRecord, StoredContact,
};
pub use progress::{ImportEvent, ImportProgress};
pub use reconcile::{Decision, Reconciler};
pub use source::{classify_response, RecordSource, SourceError};
pub use store::ContactStore;
