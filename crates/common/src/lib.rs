//! Identifier types shared by every crate in the workspace.

mod types;

pub use types::{AggregateId, OrderNumber, TableId};
