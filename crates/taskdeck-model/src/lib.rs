#![forbid(unsafe_code)]
//! Taskdeck domain model SSOT.
//!
//! One entity lives here: the to-do item. Everything user-supplied passes
//! through a validated newtype before it reaches storage or rendering.

mod todo;

pub use todo::{parse_title, Title, TodoId, TodoItem, ValidationError, TITLE_MAX_LEN};

pub const CRATE_NAME: &str = "taskdeck-model";
