//! Mesh geometry as stored in a TPM file.
//!
//! A TPM mesh keeps the file's indexed layout: separate vertex, texture
//! coordinate and normal pools, and triangles that index into each pool
//! independently. A skin is the same mesh with one bone ordinal per vertex,
//! so both are represented by [`Mesh`] and the presence of bone indices is
//! what makes a mesh a skin.
//!
//! All indices are 1-based, exactly as written on the wire. Use
//! [`Face::zero_based`] when indexing into the pools.

use serde::Serialize;
use tpm_math::{Vec2, Vec3};

use crate::scene::{entity_name, text, EntityError};

/// A triangle referencing the owning mesh's pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Face {
    /// 1-based indices into the mesh vertices
    pub vertex_indices: [u32; 3],

    /// 1-based indices into the mesh texture coordinates
    pub tex_coord_indices: [u32; 3],

    /// 1-based indices into the mesh normals
    pub normal_indices: [u32; 3],

    /// 1-based index into the mesh material names
    pub material_index: u32,
}

/// 0-based offsets of a [`Face`], ready for slice indexing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceOffsets {
    pub vertices: [usize; 3],
    pub tex_coords: [usize; 3],
    pub normals: [usize; 3],
    pub material: usize,
}

impl Face {
    pub fn new(
        vertex_indices: [u32; 3],
        tex_coord_indices: [u32; 3],
        normal_indices: [u32; 3],
        material_index: u32,
    ) -> Self {
        Self {
            vertex_indices,
            tex_coord_indices,
            normal_indices,
            material_index,
        }
    }

    /// Build a face from dynamically sized index lists.
    ///
    /// Each list must hold exactly three indices.
    pub fn from_slices(
        vertex_indices: &[u32],
        tex_coord_indices: &[u32],
        normal_indices: &[u32],
        material_index: u32,
    ) -> Result<Self, EntityError> {
        Ok(Self {
            vertex_indices: triple("vertex", vertex_indices)?,
            tex_coord_indices: triple("texture coordinate", tex_coord_indices)?,
            normal_indices: triple("normal", normal_indices)?,
            material_index,
        })
    }

    /// Convert to 0-based offsets. Returns `None` if any index is 0.
    pub fn zero_based(&self) -> Option<FaceOffsets> {
        fn offsets(indices: [u32; 3]) -> Option<[usize; 3]> {
            Some([
                offset(indices[0])?,
                offset(indices[1])?,
                offset(indices[2])?,
            ])
        }

        Some(FaceOffsets {
            vertices: offsets(self.vertex_indices)?,
            tex_coords: offsets(self.tex_coord_indices)?,
            normals: offsets(self.normal_indices)?,
            material: offset(self.material_index)?,
        })
    }
}

fn offset(index: u32) -> Option<usize> {
    (index as usize).checked_sub(1)
}

fn triple(kind: &'static str, indices: &[u32]) -> Result<[u32; 3], EntityError> {
    <[u32; 3]>::try_from(indices).map_err(|_| EntityError::FaceArity {
        kind,
        count: indices.len(),
    })
}

/// A TPM mesh or skin.
///
/// Built once through [`Mesh::new`] or [`Mesh::new_skin`] and read-only
/// afterwards, so the skin's one-bone-index-per-vertex rule always holds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mesh {
    name: String,
    material_names: Vec<String>,
    vertices: Vec<Vec3>,
    texture_coords: Vec<Vec2>,
    normals: Vec<Vec3>,
    faces: Vec<Face>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bone_indices: Option<Vec<u32>>,
}

impl Mesh {
    /// Create a plain (unskinned) mesh.
    pub fn new(
        name: impl Into<String>,
        material_names: Vec<String>,
        vertices: Vec<Vec3>,
        texture_coords: Vec<Vec2>,
        normals: Vec<Vec3>,
        faces: Vec<Face>,
    ) -> Result<Self, EntityError> {
        let name = entity_name("Mesh", name.into())?;
        let material_names = material_names
            .into_iter()
            .map(|m| text("Mesh", "material name", m))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name,
            material_names,
            vertices,
            texture_coords,
            normals,
            faces,
            bone_indices: None,
        })
    }

    /// Create a skin: a mesh with one bone ordinal per vertex.
    pub fn new_skin(
        name: impl Into<String>,
        material_names: Vec<String>,
        vertices: Vec<Vec3>,
        bone_indices: Vec<u32>,
        texture_coords: Vec<Vec2>,
        normals: Vec<Vec3>,
        faces: Vec<Face>,
    ) -> Result<Self, EntityError> {
        let mut mesh = Self::new(name, material_names, vertices, texture_coords, normals, faces)?;
        if bone_indices.len() != mesh.vertices.len() {
            return Err(EntityError::SkinBoneCount {
                skin: mesh.name,
                vertices: mesh.vertices.len(),
                bone_indices: bone_indices.len(),
            });
        }
        mesh.bone_indices = Some(bone_indices);
        Ok(mesh)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Material names, in the order faces index them.
    pub fn material_names(&self) -> &[String] {
        &self.material_names
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn texture_coords(&self) -> &[Vec2] {
        &self.texture_coords
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Per-vertex bone ordinals, present only for skins.
    pub fn bone_indices(&self) -> Option<&[u32]> {
        self.bone_indices.as_deref()
    }

    pub fn is_skin(&self) -> bool {
        self.bone_indices.is_some()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Axis-aligned bounds of the vertices as `(min, max)`, or `None` for an
    /// empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_mesh_creation() {
        let face = Face::new([1, 2, 3], [1, 2, 3], [1, 1, 1], 1);
        let mesh = Mesh::new("Tri", vec!["Rock".into()], triangle(), vec![], vec![], vec![face]).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.is_skin());
        assert!(mesh.bone_indices().is_none());
    }

    #[test]
    fn test_mesh_requires_name() {
        let err = Mesh::new("", vec![], vec![], vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, EntityError::EmptyField { entity: "Mesh", field: "name" }));
    }

    #[test]
    fn test_mesh_text_must_be_writable() {
        let err = Mesh::new("Tri\"angle", vec![], vec![], vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, EntityError::UnrepresentableText { entity: "Mesh", field: "name", .. }));

        let err = Mesh::new("Tri", vec!["Ro\nck".into()], vec![], vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, EntityError::UnrepresentableText { field: "material name", .. }));
    }

    #[test]
    fn test_skin_bone_parity() {
        let skin = Mesh::new_skin("Torso", vec![], triangle(), vec![0, 1, 1], vec![], vec![], vec![]).unwrap();
        assert!(skin.is_skin());
        assert_eq!(skin.bone_indices(), Some(&[0, 1, 1][..]));

        let err = Mesh::new_skin("Torso", vec![], triangle(), vec![0], vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(
            err,
            EntityError::SkinBoneCount { vertices: 3, bone_indices: 1, .. }
        ));
    }

    #[test]
    fn test_face_from_slices_checks_arity() {
        let face = Face::from_slices(&[1, 2, 3], &[4, 5, 6], &[7, 8, 9], 2).unwrap();
        assert_eq!(face.tex_coord_indices, [4, 5, 6]);

        let err = Face::from_slices(&[1, 2, 3, 4], &[1, 2, 3], &[1, 2, 3], 1).unwrap_err();
        assert!(matches!(err, EntityError::FaceArity { kind: "vertex", count: 4 }));

        let err = Face::from_slices(&[1, 2, 3], &[1, 2, 3], &[1, 2], 1).unwrap_err();
        assert!(matches!(err, EntityError::FaceArity { kind: "normal", count: 2 }));
    }

    #[test]
    fn test_face_zero_based() {
        let face = Face::new([1, 2, 3], [3, 2, 1], [1, 1, 2], 4);
        let offsets = face.zero_based().unwrap();
        assert_eq!(offsets.vertices, [0, 1, 2]);
        assert_eq!(offsets.tex_coords, [2, 1, 0]);
        assert_eq!(offsets.normals, [0, 0, 1]);
        assert_eq!(offsets.material, 3);

        // A 0 index cannot be converted
        let face = Face::new([1, 2, 0], [1, 2, 3], [1, 2, 3], 1);
        assert!(face.zero_based().is_none());
    }

    #[test]
    fn test_bounds_computation() {
        let vertices = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::new("Box", vec![], vertices, vec![], vec![], vec![]).unwrap();

        let (min, max) = mesh.bounds().unwrap();
        assert!((min - Vec3::new(-1.0, -2.0, -3.0)).length() < 0.001);
        assert!((max - Vec3::new(4.0, 5.0, 6.0)).length() < 0.001);

        let empty = Mesh::new("Empty", vec![], vec![], vec![], vec![], vec![]).unwrap();
        assert!(empty.bounds().is_none());
    }
}
