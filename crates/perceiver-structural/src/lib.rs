//! Structural perception: turns a live page into a bounded, canonical
//! [`PageStructure`] snapshot and answers per-selector precondition queries.

pub mod errors;
pub mod model;
mod prompt;
pub mod scripts;
pub mod selector;
pub mod structural;

pub use errors::PerceiverError;
pub use model::{
    BoundingBox, ElementContext, FormDescriptor, FormField, Heading, InteractiveElement,
    NavigationLink, PageStructure,
};
pub use structural::{AnalyzerConfig, StructuralAnalyzer};
