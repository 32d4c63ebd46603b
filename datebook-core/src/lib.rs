//! Core types for datebook.
//!
//! - `event`: the event model, drafts and patches
//! - `recurrence`: expansion of a draft into a dated series
//! - `store`: the persisted, id-allocating event collection
//! - `conflict`: same-slot detection
//! - `service`: the entry points callers use

pub mod backend;
pub mod config;
pub mod conflict;
pub mod date_range;
pub mod error;
pub mod event;
pub mod filter;
pub mod notify;
pub mod recurrence;
pub mod service;
pub mod store;

pub use error::{DatebookError, DatebookResult};
pub use event::*;
