//! # molt-store
//!
//! Durable state for the molt agent: which posts were answered, which reply
//! texts were used, and when recent actions happened.
//!
//! The state lives in one JSON document. Each store operation re-reads the
//! document, applies its change and atomically replaces the file, so the
//! agent keeps no cached copy between calls.
//!
//! A document that exists but cannot be parsed is a
//! [`MoltError::StoreIntegrity`](molt_core::MoltError::StoreIntegrity) error;
//! only a missing file starts from empty state.

mod document;
mod store;

pub use document::{StateDocument, ACTION_WINDOW_SECS};
pub use store::{epoch_now, FileStateStore, MemoryStateStore, StateStore};
