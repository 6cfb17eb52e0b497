//! Scene-level TPM entities.
//!
//! This module defines the typed document a TPM file decodes to: the file
//! info header, materials, placed instances and skeleton bones, plus the
//! [`Tpm`] container that owns them together with the meshes.
//!
//! Every entity validates its required fields when it is constructed and is
//! read-only afterwards. Rotations are stored in radians.

use serde::Serialize;
use thiserror::Error;
use tpm_math::Vec3;

use crate::mesh::Mesh;

/// Errors raised when an entity is constructed with invalid data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("{entity} cannot be constructed with an empty {field}")]
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("Face must have exactly three {kind} indices, got {count}")]
    FaceArity { kind: &'static str, count: usize },

    #[error("Skin '{skin}' must have one bone index per vertex: there are {vertices} vertices but {bone_indices} bone indices")]
    SkinBoneCount {
        skin: String,
        vertices: usize,
        bone_indices: usize,
    },

    #[error("{entity} {field} {value:?} cannot be written to a TPM file")]
    UnrepresentableText {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
}

/// Any string stored in a TPM file. The format has no escapes, so a line
/// break would end the property early.
pub(crate) fn text(entity: &'static str, field: &'static str, value: String) -> Result<String, EntityError> {
    if value.contains(['\n', '\r']) {
        Err(EntityError::UnrepresentableText { entity, field, value })
    } else {
        Ok(value)
    }
}

fn required(entity: &'static str, field: &'static str, value: String) -> Result<String, EntityError> {
    if value.is_empty() {
        Err(EntityError::EmptyField { entity, field })
    } else {
        text(entity, field, value)
    }
}

/// A block identifier. Identifiers are written between quotes, so they
/// cannot contain one.
pub(crate) fn entity_name(entity: &'static str, value: String) -> Result<String, EntityError> {
    let value = required(entity, "name", value)?;
    if value.contains('"') {
        Err(EntityError::UnrepresentableText {
            entity,
            field: "name",
            value,
        })
    } else {
        Ok(value)
    }
}

/// Empty optional strings carry no information, so they are stored as absent.
fn optional(entity: &'static str, field: &'static str, value: Option<String>) -> Result<Option<String>, EntityError> {
    value.filter(|s| !s.is_empty()).map(|s| text(entity, field, s)).transpose()
}

/// The `fileinfo` header. Exactly one per document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    format_version: String,
    name: Option<String>,
    version: Option<String>,
    source: Option<String>,
    date: Option<String>,
    comments: Option<String>,
}

impl FileInfo {
    pub fn new(
        format_version: impl Into<String>,
        name: Option<String>,
        version: Option<String>,
        source: Option<String>,
        date: Option<String>,
        comments: Option<String>,
    ) -> Result<Self, EntityError> {
        Ok(Self {
            format_version: required("FileInfo", "format version", format_version.into())?,
            name: optional("FileInfo", "name", name)?,
            version: optional("FileInfo", "version", version)?,
            source: optional("FileInfo", "source", source)?,
            date: optional("FileInfo", "date", date)?,
            comments: optional("FileInfo", "comments", comments)?,
        })
    }

    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }
}

/// A material: a name plus optional texture map names.
///
/// Texture names are kept exactly as written; resolving them to files is
/// done by [`crate::texture::TextureLookup`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Material {
    name: String,
    colour_map: Option<String>,
    bump_map: Option<String>,
    opacity_map: Option<String>,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        colour_map: Option<String>,
        bump_map: Option<String>,
        opacity_map: Option<String>,
    ) -> Result<Self, EntityError> {
        Ok(Self {
            name: entity_name("Material", name.into())?,
            colour_map: optional("Material", "colour map", colour_map)?,
            bump_map: optional("Material", "bump map", bump_map)?,
            opacity_map: optional("Material", "opacity map", opacity_map)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colour_map(&self) -> Option<&str> {
        self.colour_map.as_deref()
    }

    pub fn bump_map(&self) -> Option<&str> {
        self.bump_map.as_deref()
    }

    pub fn opacity_map(&self) -> Option<&str> {
        self.opacity_map.as_deref()
    }

    /// Check if this material uses any textures.
    pub fn has_textures(&self) -> bool {
        self.texture_maps().next().is_some()
    }

    /// The texture maps that are set, labelled by role.
    pub fn texture_maps(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("colour", self.colour_map()),
            ("bump", self.bump_map()),
            ("opacity", self.opacity_map()),
        ]
        .into_iter()
        .filter_map(|(role, map)| map.map(|m| (role, m)))
    }
}

/// A placement of a named mesh in the scene.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Instance {
    name: String,
    mesh: String,
    position: Vec3,
    rotation: Vec3,
    scale: f32,
}

impl Instance {
    /// `rotation` is an XYZ Euler rotation in radians.
    ///
    /// `mesh` may be empty; unresolved mesh names are reported by
    /// [`crate::resolve::check_references`], not here.
    pub fn new(
        name: impl Into<String>,
        mesh: impl Into<String>,
        position: Vec3,
        rotation: Vec3,
        scale: f32,
    ) -> Result<Self, EntityError> {
        Ok(Self {
            name: entity_name("Instance", name.into())?,
            mesh: text("Instance", "mesh", mesh.into())?,
            position,
            rotation,
            scale,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the mesh (or skin) this instance places.
    pub fn mesh(&self) -> &str {
        &self.mesh
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// XYZ Euler rotation in radians.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Uniform scale
    pub fn scale(&self) -> f32 {
        self.scale
    }
}

/// A skeleton bone.
///
/// Bone names follow the joint naming convention (see
/// [`crate::tpm::joint_name`]) so skins can find them by ordinal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bone {
    name: String,
    position: Vec3,
    rotation: Vec3,
}

impl Bone {
    /// `rotation` is an XYZ Euler rotation in radians.
    pub fn new(name: impl Into<String>, position: Vec3, rotation: Vec3) -> Result<Self, EntityError> {
        Ok(Self {
            name: entity_name("Bone", name.into())?,
            position,
            rotation,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// XYZ Euler rotation in radians.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }
}

/// A complete TPM document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tpm {
    file_info: FileInfo,
    materials: Vec<Material>,
    meshes: Vec<Mesh>,
    instances: Vec<Instance>,
    bones: Vec<Bone>,
}

impl Tpm {
    pub fn new(
        file_info: FileInfo,
        materials: Vec<Material>,
        meshes: Vec<Mesh>,
        instances: Vec<Instance>,
        bones: Vec<Bone>,
    ) -> Self {
        Self {
            file_info,
            materials,
            meshes,
            instances,
            bones,
        }
    }

    /// Reorder materials by name, the canonical order for writing.
    pub fn with_sorted_materials(mut self) -> Self {
        self.materials.sort_by(|a, b| a.name.cmp(&b.name));
        self
    }

    pub fn file_info(&self) -> &FileInfo {
        &self.file_info
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Meshes and skins, in document order.
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn skins(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.iter().filter(|m| m.is_skin())
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Total number of triangles across all meshes.
    pub fn total_triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_info() -> FileInfo {
        FileInfo::new("1.0.1", None, None, None, None, None).unwrap()
    }

    #[test]
    fn test_file_info_requires_format_version() {
        let err = FileInfo::new("", Some("a.tpm".into()), None, None, None, None).unwrap_err();
        assert!(matches!(err, EntityError::EmptyField { entity: "FileInfo", .. }));
    }

    #[test]
    fn test_empty_optionals_are_absent() {
        let info = FileInfo::new("1.0.1", Some(String::new()), None, Some("scene.blend".into()), None, None).unwrap();
        assert_eq!(info.name(), None);
        assert_eq!(info.source(), Some("scene.blend"));

        let material = Material::new("Rock", Some(String::new()), Some("rock_b.bmp".into()), None).unwrap();
        assert_eq!(material.colour_map(), None);
        assert_eq!(material.bump_map(), Some("rock_b.bmp"));
    }

    #[test]
    fn test_material_texture_maps() {
        let material = Material::new("Fern", Some("fern.bmp".into()), None, Some("fern_o.bmp".into())).unwrap();
        let maps: Vec<_> = material.texture_maps().collect();
        assert_eq!(maps, vec![("colour", "fern.bmp"), ("opacity", "fern_o.bmp")]);
        assert!(material.has_textures());

        let plain = Material::new("Plain", None, None, None).unwrap();
        assert!(!plain.has_textures());
    }

    #[test]
    fn test_instance_mesh_may_be_empty() {
        let instance = Instance::new("Rock01", "", Vec3::ZERO, Vec3::ZERO, 1.0).unwrap();
        assert_eq!(instance.mesh(), "");

        let err = Instance::new("", "Rock", Vec3::ZERO, Vec3::ZERO, 1.0).unwrap_err();
        assert_eq!(err, EntityError::EmptyField { entity: "Instance", field: "name" });
    }

    #[test]
    fn test_names_cannot_contain_quotes() {
        let err = Material::new("a\"b", None, None, None).unwrap_err();
        assert_eq!(
            err,
            EntityError::UnrepresentableText {
                entity: "Material",
                field: "name",
                value: "a\"b".to_string(),
            }
        );
        assert!(Bone::new("$J\"Arm\"00", Vec3::ZERO, Vec3::ZERO).is_err());

        // Property values keep inner quotes; only the outer pair is stripped
        assert!(Instance::new("I", "a\"b", Vec3::ZERO, Vec3::ZERO, 1.0).is_ok());
        assert!(Material::new("Rock", Some("my \"best\" rock.bmp".into()), None, None).is_ok());
    }

    #[test]
    fn test_text_cannot_contain_line_breaks() {
        assert!(Material::new("Ro\nck", None, None, None).is_err());
        assert!(Material::new("Rock", None, Some("rock\r.bmp".into()), None).is_err());
        assert!(Instance::new("I", "Ro\nck", Vec3::ZERO, Vec3::ZERO, 1.0).is_err());

        let err = FileInfo::new("1.0.1", None, None, None, None, Some("line one\nline two".into())).unwrap_err();
        assert!(matches!(err, EntityError::UnrepresentableText { entity: "FileInfo", field: "comments", .. }));
    }

    #[test]
    fn test_sorted_materials() {
        let materials = vec![
            Material::new("Zebra", None, None, None).unwrap(),
            Material::new("Apple", None, None, None).unwrap(),
            Material::new("Mango", None, None, None).unwrap(),
        ];
        let tpm = Tpm::new(file_info(), materials, vec![], vec![], vec![]);

        // Construction keeps the given order
        assert_eq!(tpm.materials()[0].name(), "Zebra");

        let tpm = tpm.with_sorted_materials();
        let names: Vec<_> = tpm.materials().iter().map(Material::name).collect();
        assert_eq!(names, vec!["Apple", "Mango", "Zebra"]);
    }

    #[test]
    fn test_skins_filter() {
        let mesh = Mesh::new("Rock", vec![], vec![], vec![], vec![], vec![]).unwrap();
        let skin = Mesh::new_skin("Raptor", vec![], vec![Vec3::ZERO], vec![3], vec![], vec![], vec![]).unwrap();
        let tpm = Tpm::new(file_info(), vec![], vec![mesh, skin], vec![], vec![]);

        let skins: Vec<_> = tpm.skins().map(Mesh::name).collect();
        assert_eq!(skins, vec!["Raptor"]);
    }
}
