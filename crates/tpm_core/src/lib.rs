//! TPM Core - reading and writing TPM scene files.
//!
//! This crate provides:
//!
//! - **Entity types**: `Tpm`, `FileInfo`, `Material`, `Mesh`, `Face`, `Instance`, `Bone`
//! - **TPM support**: block grammar parsing/writing and the typed mapping on top of it
//! - **Collaborator helpers**: reference resolution and texture lookup
//!
//! # Example
//!
//! ```ignore
//! use tpm_core::tpm::load_tpm;
//!
//! let tpm = load_tpm("scene.tpm")?;
//! println!("Loaded {} meshes, {} instances",
//!     tpm.meshes().len(),
//!     tpm.instances().len());
//! ```

pub mod mesh;
pub mod resolve;
pub mod scene;
pub mod texture;
pub mod tpm;
pub mod warnings;

// Re-export commonly used types
pub use mesh::{Face, Mesh};
pub use scene::{Bone, EntityError, FileInfo, Instance, Material, Tpm};
pub use tpm::{load_tpm, load_tpm_from_string, save_tpm, write_tpm_to_string};
pub use warnings::{CollectWarnings, LogWarnings, WarningSink};
