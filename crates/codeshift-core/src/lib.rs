//! # codeshift core
//!
//! Shared, runtime-free logic for codeshift: the item and batch model,
//! validation levels and the severity gate, contiguous chunk planning,
//! the batching strategies, ownership manifest matching, and the schedule
//! clock used for cadence and shard resolution.
//!
//! This crate contains no tokio, no configuration parsing, and no CLI.
//! The only I/O it performs is loading and writing an [`Item`]'s content.

pub mod batch;
pub mod batching;
pub mod chunk;
pub mod clock;
pub mod item;
pub mod owners;
pub mod validation;

pub use batch::{add_reviewer, Batch, Metadata};
pub use clock::{valid_shard, Repeats, ScheduleClock};
pub use item::{Item, ItemError, ItemKind};
pub use owners::{Owner, OwnersManifest};
pub use validation::{check, GateDecision, ValidationLevel, ValidationResult};
