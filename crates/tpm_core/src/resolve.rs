//! Name resolution across a decoded document.
//!
//! Decoding accepts dangling names: an instance may place a mesh that does
//! not exist, a face may index past the end of a pool, a skin may use a bone
//! ordinal with no matching bone. Whoever turns the document into a scene
//! has to resolve those names anyway, so this module does it once and
//! reports every problem as a warning instead of an error.

use std::collections::HashMap;

use crate::mesh::{Face, Mesh};
use crate::scene::{Bone, Material, Tpm};
use crate::tpm::joint_name;
use crate::warnings::WarningSink;

/// Name lookups over a document.
pub struct SceneIndex<'a> {
    materials: HashMap<&'a str, &'a Material>,
    meshes: HashMap<&'a str, &'a Mesh>,
    bones: HashMap<&'a str, &'a Bone>,
}

impl<'a> SceneIndex<'a> {
    /// Index every named entity. For repeated names the first one wins.
    pub fn new(tpm: &'a Tpm) -> Self {
        fn index<'a, T>(items: &'a [T], name: fn(&T) -> &str) -> HashMap<&'a str, &'a T> {
            let mut map = HashMap::with_capacity(items.len());
            for item in items {
                map.entry(name(item)).or_insert(item);
            }
            map
        }

        Self {
            materials: index(tpm.materials(), Material::name),
            meshes: index(tpm.meshes(), Mesh::name),
            bones: index(tpm.bones(), Bone::name),
        }
    }

    pub fn material(&self, name: &str) -> Option<&'a Material> {
        self.materials.get(name).copied()
    }

    pub fn mesh(&self, name: &str) -> Option<&'a Mesh> {
        self.meshes.get(name).copied()
    }

    pub fn bone(&self, name: &str) -> Option<&'a Bone> {
        self.bones.get(name).copied()
    }

    /// The bone a skin vertex refers to, if its ordinal names one.
    pub fn joint(&self, skin: &str, ordinal: u32) -> Option<&'a Bone> {
        let name = joint_name(skin, ordinal).ok()?;
        self.bone(&name)
    }
}

/// Report every unresolved reference in `tpm`. Returns the number reported.
pub fn check_references(tpm: &Tpm, warnings: &mut impl WarningSink) -> usize {
    let index = SceneIndex::new(tpm);
    let mut count = 0;
    let mut report = |message: String| {
        warnings.warn(&message);
        count += 1;
    };

    for instance in tpm.instances() {
        if index.mesh(instance.mesh()).is_none() {
            report(format!(
                "Instance '{}' refers to mesh '{}', which is not in the document",
                instance.name(),
                instance.mesh()
            ));
        }
    }

    for mesh in tpm.meshes() {
        for name in mesh.material_names() {
            if index.material(name).is_none() {
                report(format!(
                    "Mesh '{}' uses material '{}', which is not in the document",
                    mesh.name(),
                    name
                ));
            }
        }

        for (number, face) in mesh.faces().iter().enumerate() {
            for problem in face_problems(mesh, face) {
                report(format!("Mesh '{}' face {}: {}", mesh.name(), number + 1, problem));
            }
        }

        if let Some(bone_indices) = mesh.bone_indices() {
            let mut ordinals: Vec<u32> = bone_indices.to_vec();
            ordinals.sort_unstable();
            ordinals.dedup();

            for ordinal in ordinals {
                match joint_name(mesh.name(), ordinal) {
                    Ok(name) if index.bone(&name).is_none() => report(format!(
                        "Skin '{}' uses bone {}, but there is no bone named '{}'",
                        mesh.name(),
                        ordinal,
                        name
                    )),
                    Ok(_) => {}
                    Err(e) => report(format!("Skin '{}': {}", mesh.name(), e)),
                }
            }
        }
    }

    if count > 0 {
        log::debug!("Found {} unresolved references", count);
    }

    count
}

/// Out-of-range indices of one face, described for a warning message.
fn face_problems(mesh: &Mesh, face: &Face) -> Vec<String> {
    let pools = [
        ("vertex", &face.vertex_indices[..], mesh.vertices().len()),
        ("texture coordinate", &face.tex_coord_indices[..], mesh.texture_coords().len()),
        ("normal", &face.normal_indices[..], mesh.normals().len()),
        ("material", std::slice::from_ref(&face.material_index), mesh.material_names().len()),
    ];

    let mut problems = Vec::new();
    for (kind, indices, len) in pools {
        for &index in indices {
            if index == 0 || index as usize > len {
                problems.push(format!("{} index {} is outside 1..={}", kind, index, len));
            }
        }
    }
    problems
}
