//! Data models for Nook

mod category;
mod note;

pub use category::{Category, CategoryId};
pub use note::{Note, NoteId};
