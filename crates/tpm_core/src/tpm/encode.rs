//! Typed document to block tree conversion.

use tpm_math::radians_to_degrees;

use super::block::Block;
use super::codec::{format_vec2, format_vec3, quote};
use crate::mesh::{Face, Mesh};
use crate::scene::{Bone, FileInfo, Instance, Material, Tpm};

/// Convert a document into blocks ready for [`super::serialize_document`].
///
/// Blocks are emitted as `fileinfo`, materials, meshes and skins, instances,
/// then bones, each group in the document's order. Absent optional values
/// are left out entirely. Rotations are written in degrees.
pub fn encode(tpm: &Tpm) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(
        1 + tpm.materials().len() + tpm.meshes().len() + tpm.instances().len() + tpm.bones().len(),
    );

    blocks.push(encode_file_info(tpm.file_info()));
    blocks.extend(tpm.materials().iter().map(encode_material));
    blocks.extend(tpm.meshes().iter().map(encode_mesh));
    blocks.extend(tpm.instances().iter().map(encode_instance));
    blocks.extend(tpm.bones().iter().map(encode_bone));

    blocks
}

fn encode_file_info(info: &FileInfo) -> Block {
    let mut block = Block::new("fileinfo", None).with_property("formatversion", quote(info.format_version()));
    if let Some(name) = info.name() {
        block.push("name", quote(name));
    }
    if let Some(version) = info.version() {
        block.push("version", quote(version));
    }
    if let Some(source) = info.source() {
        block.push("source", quote(source));
    }
    if let Some(date) = info.date() {
        block.push("date", quote(date));
    }
    if let Some(comments) = info.comments() {
        block.push("comments", quote(comments));
    }
    block
}

fn encode_material(material: &Material) -> Block {
    let mut block = Block::new("material", Some(quote(material.name())));
    if let Some(map) = material.colour_map() {
        block.push("colormap", quote(map));
    }
    if let Some(map) = material.bump_map() {
        block.push("bumpmap", quote(map));
    }
    if let Some(map) = material.opacity_map() {
        block.push("opacitymap", quote(map));
    }
    block
}

fn encode_mesh(mesh: &Mesh) -> Block {
    let block_type = if mesh.is_skin() { "skin" } else { "mesh" };
    let mut block = Block::new(block_type, Some(quote(mesh.name())));

    for name in mesh.material_names() {
        block.push("m", quote(name));
    }

    match mesh.bone_indices() {
        Some(bone_indices) => {
            for (vertex, bone) in mesh.vertices().iter().zip(bone_indices) {
                block.push("v", format!("{},{}", format_vec3(*vertex), bone));
            }
        }
        None => {
            for vertex in mesh.vertices() {
                block.push("v", format_vec3(*vertex));
            }
        }
    }

    for tex_coord in mesh.texture_coords() {
        block.push("t", format_vec2(*tex_coord));
    }
    for normal in mesh.normals() {
        block.push("n", format_vec3(*normal));
    }
    for face in mesh.faces() {
        block.push("f", format_face(face));
    }

    block
}

fn format_face(face: &Face) -> String {
    let [v1, v2, v3] = face.vertex_indices;
    let [t1, t2, t3] = face.tex_coord_indices;
    let [n1, n2, n3] = face.normal_indices;
    format!(
        "({},{},{}),({},{},{}),({},{},{}),{}",
        v1, v2, v3, t1, t2, t3, n1, n2, n3, face.material_index
    )
}

fn encode_instance(instance: &Instance) -> Block {
    Block::new("instance", Some(quote(instance.name())))
        .with_property("mesh", quote(instance.mesh()))
        .with_property("position", format_vec3(instance.position()))
        .with_property("rotation", format_vec3(radians_to_degrees(instance.rotation())))
        .with_property("scale", instance.scale().to_string())
}

fn encode_bone(bone: &Bone) -> Block {
    Block::new("bone", Some(quote(bone.name())))
        .with_property("position", format_vec3(bone.position()))
        .with_property("rotation", format_vec3(radians_to_degrees(bone.rotation())))
}
