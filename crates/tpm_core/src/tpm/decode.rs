//! Block tree to typed document conversion.
//!
//! Decoding enforces the format's own structure (one `fileinfo`, required
//! keys, face and skin vertex shapes, known block types) and fails on the
//! first violation. It does not check that names refer to anything: an
//! instance may name a missing mesh and a skin may use a bone ordinal with no
//! bone. Those are reported later by [`crate::resolve::check_references`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tpm_math::{degrees_to_radians, Vec2, Vec3};

use super::block::Block;
use super::codec::{parse_float, parse_index, parse_vec2, parse_vec3, unquote, CodecError};
use crate::mesh::{Face, Mesh};
use crate::scene::{Bone, EntityError, FileInfo, Instance, Material, Tpm};
use crate::warnings::WarningSink;

/// `(v,v,v),(t,t,t),(n,n,n),m`
static FACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\((\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)\s*,\s*\((\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)\s*,\s*\((\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)\s*,\s*(\d+)$",
    )
    .expect("valid face pattern")
});

/// `(x,y,z),bone`
static SKIN_VERTEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\(.*?\))\s*,\s*(\d+)$").expect("valid skin vertex pattern"));

const FILEINFO_KEYS: &[&str] = &["formatversion", "name", "version", "source", "date", "comments"];
const MATERIAL_KEYS: &[&str] = &["colormap", "bumpmap", "opacitymap"];
const INSTANCE_KEYS: &[&str] = &["mesh", "position", "rotation", "scale"];
const BONE_KEYS: &[&str] = &["position", "rotation"];

/// Errors that can occur while mapping blocks to entities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("TPM contains more than one fileinfo block")]
    DuplicateFileInfo,

    #[error("TPM must contain a fileinfo block")]
    MissingFileInfo,

    #[error("Block {block} is missing required key '{key}'")]
    MissingKey { block: String, key: &'static str },

    #[error("Block '{block_type}' requires a quoted identifier")]
    MissingIdentifier { block_type: String },

    #[error("Mesh face property '{value}' in {block} is not in the expected format")]
    MalformedFace { block: String, value: String },

    #[error("Skin vertex property '{value}' in {block} is not in the expected format")]
    MalformedSkinVertex { block: String, value: String },

    #[error("Unknown mesh property type '{key}' in {block} - expected one of m, v, t, n, or f")]
    UnknownMeshProperty { block: String, key: String },

    #[error("TPM contains unexpected block type '{0}'")]
    UnexpectedBlockType(String),

    #[error("Invalid value in {block}: {source}")]
    Codec {
        block: String,
        #[source]
        source: CodecError,
    },

    #[error("Invalid {block}: {source}")]
    Entity {
        block: String,
        #[source]
        source: EntityError,
    },
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Attach the block label to codec and entity errors.
trait InBlock<T> {
    fn in_block(self, block: &Block) -> DecodeResult<T>;
}

impl<T> InBlock<T> for Result<T, CodecError> {
    fn in_block(self, block: &Block) -> DecodeResult<T> {
        self.map_err(|source| DecodeError::Codec {
            block: block.label(),
            source,
        })
    }
}

impl<T> InBlock<T> for Result<T, EntityError> {
    fn in_block(self, block: &Block) -> DecodeResult<T> {
        self.map_err(|source| DecodeError::Entity {
            block: block.label(),
            source,
        })
    }
}

/// Unquoted properties of a block whose keys do not repeat meaningfully.
///
/// The last occurrence of a repeated key wins.
struct FlatProperties<'b> {
    block: &'b Block,
    values: HashMap<&'b str, &'b str>,
}

impl<'b> FlatProperties<'b> {
    fn new(block: &'b Block, known_keys: &[&str], warnings: &mut impl WarningSink) -> Self {
        let mut values = HashMap::new();
        for property in &block.properties {
            let key = property.key.as_str();
            if !known_keys.contains(&key) {
                warnings.warn(&format!("Ignoring unknown property '{}' in {}", key, block.label()));
                continue;
            }
            let (value, _) = unquote(&property.value);
            if values.insert(key, value).is_some() {
                warnings.warn(&format!(
                    "Property '{}' repeated in {}; using the last value",
                    key,
                    block.label()
                ));
            }
        }
        Self { block, values }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.to_string())
    }

    fn require(&self, key: &'static str) -> DecodeResult<&'b str> {
        self.values.get(key).copied().ok_or_else(|| DecodeError::MissingKey {
            block: self.block.label(),
            key,
        })
    }
}

/// The block identifier with its quotes removed.
fn identifier(block: &Block) -> DecodeResult<&str> {
    block
        .identifier
        .as_deref()
        .map(|id| unquote(id).0)
        .ok_or_else(|| DecodeError::MissingIdentifier {
            block_type: block.block_type.clone(),
        })
}

/// Convert parsed blocks into a typed document.
///
/// Recoverable oddities (ignored or repeated keys) are reported to
/// `warnings`; everything else is an error and no document is returned.
pub fn decode(blocks: &[Block], warnings: &mut impl WarningSink) -> DecodeResult<Tpm> {
    let mut file_info: Option<FileInfo> = None;
    let mut materials = Vec::new();
    let mut meshes = Vec::new();
    let mut instances = Vec::new();
    let mut bones = Vec::new();

    for block in blocks {
        match block.block_type.as_str() {
            "fileinfo" => {
                if file_info.is_some() {
                    return Err(DecodeError::DuplicateFileInfo);
                }
                file_info = Some(decode_file_info(block, warnings)?);
            }
            "material" => materials.push(decode_material(block, warnings)?),
            "mesh" => meshes.push(decode_mesh(block, false)?),
            "skin" => meshes.push(decode_mesh(block, true)?),
            "instance" => instances.push(decode_instance(block, warnings)?),
            "bone" => bones.push(decode_bone(block, warnings)?),
            other => return Err(DecodeError::UnexpectedBlockType(other.to_string())),
        }
        log::trace!("Decoded {}", block.label());
    }

    let file_info = file_info.ok_or(DecodeError::MissingFileInfo)?;

    log::debug!(
        "Decoded TPM: {} materials, {} meshes, {} instances, {} bones",
        materials.len(),
        meshes.len(),
        instances.len(),
        bones.len()
    );

    Ok(Tpm::new(file_info, materials, meshes, instances, bones))
}

fn decode_file_info(block: &Block, warnings: &mut impl WarningSink) -> DecodeResult<FileInfo> {
    let props = FlatProperties::new(block, FILEINFO_KEYS, warnings);
    FileInfo::new(
        props.require("formatversion")?,
        props.get("name"),
        props.get("version"),
        props.get("source"),
        props.get("date"),
        props.get("comments"),
    )
    .in_block(block)
}

fn decode_material(block: &Block, warnings: &mut impl WarningSink) -> DecodeResult<Material> {
    let name = identifier(block)?;
    let props = FlatProperties::new(block, MATERIAL_KEYS, warnings);
    // The wire spells it "colormap"
    Material::new(name, props.get("colormap"), props.get("bumpmap"), props.get("opacitymap")).in_block(block)
}

fn decode_instance(block: &Block, warnings: &mut impl WarningSink) -> DecodeResult<Instance> {
    let name = identifier(block)?;
    let props = FlatProperties::new(block, INSTANCE_KEYS, warnings);
    let mesh = props.require("mesh")?;
    let position = parse_vec3(props.require("position")?).in_block(block)?;
    let rotation = parse_vec3(props.require("rotation")?).in_block(block)?;
    let scale = parse_float(props.require("scale")?).in_block(block)?;
    Instance::new(name, mesh, position, degrees_to_radians(rotation), scale).in_block(block)
}

fn decode_bone(block: &Block, warnings: &mut impl WarningSink) -> DecodeResult<Bone> {
    let name = identifier(block)?;
    let props = FlatProperties::new(block, BONE_KEYS, warnings);
    let position = parse_vec3(props.require("position")?).in_block(block)?;
    let rotation = parse_vec3(props.require("rotation")?).in_block(block)?;
    Bone::new(name, position, degrees_to_radians(rotation)).in_block(block)
}

/// Decode a `mesh` or `skin` block.
///
/// Keys repeat and their order is significant, so properties are walked in
/// file order rather than folded into a map.
fn decode_mesh(block: &Block, is_skin: bool) -> DecodeResult<Mesh> {
    let name = identifier(block)?;

    let mut material_names: Vec<String> = Vec::new();
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut bone_indices: Vec<u32> = Vec::new();
    let mut texture_coords: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut faces: Vec<Face> = Vec::new();

    for property in &block.properties {
        let (value, _) = unquote(&property.value);
        match property.key.as_str() {
            "m" => material_names.push(value.to_string()),
            "v" if is_skin => {
                let (vertex, bone) = parse_skin_vertex(value).ok_or_else(|| DecodeError::MalformedSkinVertex {
                    block: block.label(),
                    value: value.to_string(),
                })?;
                vertices.push(parse_vec3(vertex).in_block(block)?);
                bone_indices.push(parse_index(bone).in_block(block)?);
            }
            "v" => vertices.push(parse_vec3(value).in_block(block)?),
            "t" => texture_coords.push(parse_vec2(value).in_block(block)?),
            "n" => normals.push(parse_vec3(value).in_block(block)?),
            "f" => faces.push(parse_face(value, block)?),
            other => {
                return Err(DecodeError::UnknownMeshProperty {
                    block: block.label(),
                    key: other.to_string(),
                })
            }
        }
    }

    let mesh = if is_skin {
        Mesh::new_skin(name, material_names, vertices, bone_indices, texture_coords, normals, faces)
    } else {
        Mesh::new(name, material_names, vertices, texture_coords, normals, faces)
    };
    mesh.in_block(block)
}

/// Split a skin vertex `(x,y,z),bone` into its vector and bone parts.
fn parse_skin_vertex(value: &str) -> Option<(&str, &str)> {
    let captures = SKIN_VERTEX.captures(value)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

fn parse_face(value: &str, block: &Block) -> DecodeResult<Face> {
    let captures = FACE.captures(value).ok_or_else(|| DecodeError::MalformedFace {
        block: block.label(),
        value: value.to_string(),
    })?;

    let mut indices = [0u32; 10];
    for (slot, group) in indices.iter_mut().zip(captures.iter().skip(1)) {
        let text = group.map(|m| m.as_str()).unwrap_or_default();
        *slot = parse_index(text).in_block(block)?;
    }

    Ok(Face::new(
        [indices[0], indices[1], indices[2]],
        [indices[3], indices[4], indices[5]],
        [indices[6], indices[7], indices[8]],
        indices[9],
    ))
}
