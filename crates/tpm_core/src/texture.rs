//! Locating material texture files on disk.
//!
//! Materials only store texture names. Exporters usually write a bare file
//! name, but older files may carry a full path from the machine they were
//! written on, so lookups ignore directories unless asked not to.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur during texture lookup.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Texture '{name}' not found in {dir} (looked for {path})", dir = .search_path.display(), path = .lookup.display())]
    NotFound {
        name: String,
        search_path: PathBuf,
        lookup: PathBuf,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// The file name part of a texture name, without any directories.
///
/// Both `/` and `\` are treated as separators, since texture names are
/// written on whatever platform exported the file.
pub fn texture_file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Where to look for texture files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureLookup {
    /// Directory that texture names are resolved against
    pub search_path: PathBuf,

    /// Drop directory components from texture names before joining
    pub strip_directories: bool,
}

impl TextureLookup {
    pub fn new(search_path: impl Into<PathBuf>) -> Self {
        Self {
            search_path: search_path.into(),
            strip_directories: true,
        }
    }

    /// Look next to the document at `path`.
    pub fn for_document(path: impl AsRef<Path>) -> Self {
        let parent = path
            .as_ref()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::new(parent)
    }

    /// The path a texture name resolves to, whether or not it exists.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let name = if self.strip_directories {
            texture_file_name(name)
        } else {
            name
        };

        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.search_path.join(path)
        }
    }

    /// Resolve a texture name to an existing file.
    pub fn find(&self, name: &str) -> TextureResult<PathBuf> {
        let lookup = self.resolve(name);
        if lookup.is_file() {
            log::debug!("Resolved texture {} -> {}", name, lookup.display());
            Ok(lookup)
        } else {
            Err(TextureError::NotFound {
                name: name.to_string(),
                search_path: self.search_path.clone(),
                lookup,
            })
        }
    }
}

impl Default for TextureLookup {
    fn default() -> Self {
        Self::new(".")
    }
}
