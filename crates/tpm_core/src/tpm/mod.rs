//! TPM file format support.
//!
//! The format is handled in two layers:
//!
//! - **Grammar**: [`parse_document`] turns text into untyped [`Block`]s and
//!   [`serialize_document`] turns blocks back into text. No domain knowledge.
//! - **Mapping**: [`decode`] turns blocks into a typed [`crate::Tpm`] and
//!   [`encode`] goes the other way. All structural validation lives here.
//!
//! ## Supported Blocks
//!
//! - `fileinfo` (exactly one): `formatversion`, `name`, `version`, `source`, `date`, `comments`
//! - `material "Name"`: `colormap`, `bumpmap`, `opacitymap`
//! - `mesh "Name"` / `skin "Name"`: repeated `m`, `v`, `t`, `n`, `f`
//! - `instance "Name"`: `mesh`, `position`, `rotation`, `scale`
//! - `bone "Name"`: `position`, `rotation`
//!
//! # Example
//!
//! ```ignore
//! use tpm_core::tpm::{decode, parse_document};
//! use tpm_core::LogWarnings;
//!
//! let blocks = parse_document(&text)?;
//! let tpm = decode(&blocks, &mut LogWarnings)?;
//! ```

mod block;
mod codec;
mod decode;
mod encode;
mod loader;
mod naming;
mod parser;
mod writer;

pub use block::*;
pub use codec::*;
pub use decode::*;
pub use encode::*;
pub use loader::*;
pub use naming::*;
pub use parser::*;
pub use writer::*;
