//! Core domain types, payload normalization, and report text for the
//! corrective-action deck generator.

pub mod error;
pub mod normalize;
pub mod report;
pub mod types;

pub use error::{Error, Result};
pub use normalize::{group_notes, normalize_categories, resolve_groups};
pub use types::{CategoriesInput, Category, FeedbackPayload, GroupedNote, Note, NoteGroup};
