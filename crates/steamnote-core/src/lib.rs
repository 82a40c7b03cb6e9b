//! steamnote-core - Core library for steamnote
//!
//! This crate contains the mapping-and-reconciliation engine: it turns raw
//! game records into typed Notion property payloads according to a
//! declarative field mapping, and decides create-vs-update per game.
//! All I/O (Steam fetch, Notion read/write) lives in the driver crate.

pub mod error;
pub mod mapping;
pub mod models;
pub mod reconcile;

pub use error::{Error, Result};
pub use mapping::{apply_rule, load_mapping};
pub use models::{
    ExistingPageIndex, FieldValue, GameId, GameRecord, MappingRule, Operation, PageRef,
    PropertyKind, PropertyValue, SyncDecision, Template,
};
pub use reconcile::reconcile;
