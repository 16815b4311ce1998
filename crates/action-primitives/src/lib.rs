//! Browser action capability.
//!
//! This crate is the single doorway between planning code and the browser:
//! - a closed [`ActionKind`] enumeration and its typed [`BrowserAction`] form
//! - the low-level [`BrowserActions`] primitives a backend implements
//! - the [`BrowserController`], which checks URL schemes, dispatches one
//!   action at a time and runs bounded batches with loop detection

pub mod controller;
pub mod errors;
mod primitives;
pub mod types;
pub mod utils;

pub use controller::{ActionExecutor, BrowserController, ControllerConfig, SequenceReport};
pub use errors::*;
pub use primitives::*;
pub use types::*;
