//! Data model for the mapping-and-reconciliation engine

mod decision;
mod record;
mod rule;

pub use decision::{ExistingPageIndex, Operation, PageRef, PropertyValue, SyncDecision};
pub use record::{FieldValue, GameId, GameRecord};
pub use rule::{MappingRule, PropertyKind, Template};
