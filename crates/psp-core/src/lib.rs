//! psp-core: typed Pal overlay and item slot codec for Palworld save trees
//!
//! This crate focuses on a small, well-factored surface:
//! - `Property` node union with typed accessors, and path navigation over it
//! - `Pal`: parse typed fields from a character record, project edits back
//! - Item container slot codec for the packed records inside byte arrays
//! - JSON interchange with the save tools' decoded tree
//!
pub mod archive;
pub mod config;
pub mod error;
pub mod item_slot;
pub mod json;
pub mod model;
pub mod pal;
pub mod property;
pub mod tree;

pub use config::PalDefaults;
pub use error::{CodecError, JsonError, PathError, PropertyError, SyncError};
pub use item_slot::ItemSlotRecord;
pub use json::{property_from_json, property_to_json};
pub use model::{Element, EntryState, GameEnum, PalGender, WorkSuitability};
pub use pal::{Diagnostic, Pal, ParsedPal, SyncState, heal_all};
pub use property::{ArrayType, ArrayValue, Property, PropertyMap, PropertyValue, get_value, set_value};
pub use tree::{get_nested, get_nested_mut, remove_nested, set_nested};
