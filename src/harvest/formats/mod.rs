//! Template format implementations.
//!
//! Each format implements [`TemplateFormat`](crate::harvest::TemplateFormat).
//!
//! - `pot` - GNU gettext Portable Object Template

pub mod pot;

pub use pot::{PotFormat, POT_HEADER};
