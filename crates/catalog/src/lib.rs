mod catalog;
mod category;
mod color;
mod error;
pub mod names;
mod overrides;
mod palette;

pub use catalog::{builtin, Catalog};
pub use category::{Category, CategoryPattern, StyleModifier, DEFAULT_PATTERN_SPECIFICITY};
pub use color::{ColorParseError, Lab, Rgb};
pub use error::CatalogError;
pub use overrides::{CatalogOverride, CategoryOverride};
pub use palette::{ColorRef, Palette};
