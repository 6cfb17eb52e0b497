//! Reading and writing TPM files.
//!
//! The grammar and mapping layers work purely on strings and blocks; this
//! module is the only place that touches the filesystem.

use std::path::Path;

use thiserror::Error;

use super::decode::{decode, DecodeError};
use super::encode::encode;
use super::parser::{parse_document, GrammarError};
use super::writer::serialize_document;
use crate::scene::Tpm;
use crate::warnings::{LogWarnings, WarningSink};

/// Format version written by this crate.
pub const FORMAT_VERSION: &str = "1.0.1";

/// Errors that can occur while loading or saving a TPM file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Grammar(#[from] GrammarError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load a TPM file, forwarding warnings to the log.
///
/// # Example
///
/// ```ignore
/// use tpm_core::tpm::load_tpm;
///
/// let tpm = load_tpm("scene.tpm")?;
/// ```
pub fn load_tpm<P: AsRef<Path>>(path: P) -> LoadResult<Tpm> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let tpm = load_tpm_from_string(&content, &mut LogWarnings)?;

    log::info!(
        "Loaded {}: {} materials, {} meshes, {} instances, {} bones",
        path.display(),
        tpm.materials().len(),
        tpm.meshes().len(),
        tpm.instances().len(),
        tpm.bones().len()
    );

    Ok(tpm)
}

/// Parse and decode TPM text (useful for testing).
pub fn load_tpm_from_string(content: &str, warnings: &mut impl WarningSink) -> LoadResult<Tpm> {
    let blocks = parse_document(content)?;
    Ok(decode(&blocks, warnings)?)
}

/// Encode and serialize a document to TPM text.
pub fn write_tpm_to_string(tpm: &Tpm) -> String {
    serialize_document(&encode(tpm))
}

/// Write a document to a TPM file.
pub fn save_tpm<P: AsRef<Path>>(path: P, tpm: &Tpm) -> LoadResult<()> {
    let path = path.as_ref();
    std::fs::write(path, write_tpm_to_string(tpm))?;
    log::info!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Face, Mesh};
    use crate::scene::{Bone, FileInfo, Instance, Material};
    use crate::warnings::CollectWarnings;
    use tpm_math::{Vec2, Vec3};

    const SAMPLE: &str = include_str!("../../../../assets/sample.tpm");

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn sample_document() -> Tpm {
        let file_info = FileInfo::new(
            FORMAT_VERSION,
            Some("roundtrip.tpm".into()),
            Some("3".into()),
            Some("roundtrip.blend".into()),
            Some("10/18/2026 09:30:00 AM".into()),
            Some("generated, with (punctuation) = fine".into()),
        )
        .unwrap();

        let materials = vec![
            Material::new("Bark", Some("bark.bmp".into()), Some("bark_b.bmp".into()), None).unwrap(),
            Material::new("Leaf", Some("leaf.bmp".into()), None, Some("leaf_o.bmp".into())).unwrap(),
        ];

        let tree = Mesh::new(
            "Tree",
            vec!["Bark".into(), "Leaf".into()],
            vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.1, 2.5, -0.3)],
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.5)],
            vec![Vec3::Y, Vec3::new(0.0, 0.707, 0.707)],
            vec![
                Face::new([1, 2, 3], [1, 2, 2], [1, 1, 2], 1),
                Face::new([3, 2, 1], [2, 2, 1], [2, 1, 1], 2),
            ],
        )
        .unwrap();

        let raptor = Mesh::new_skin(
            "Raptor",
            vec!["Bark".into()],
            vec![Vec3::ZERO, Vec3::X, Vec3::Z],
            vec![0, 1, 1],
            vec![Vec2::ZERO],
            vec![Vec3::Y],
            vec![Face::new([1, 2, 3], [1, 1, 1], [1, 1, 1], 1)],
        )
        .unwrap();

        let instances = vec![
            Instance::new("Tree01", "Tree", Vec3::new(10.0, 0.0, -4.5), Vec3::new(0.0, 0.0, 1.2), 1.5).unwrap(),
            Instance::new("Raptor01", "Raptor", Vec3::ZERO, Vec3::new(-0.3, 0.7, 3.0), 1.0).unwrap(),
        ];

        let bones = vec![
            Bone::new("$JRaptor00", Vec3::ZERO, Vec3::ZERO).unwrap(),
            Bone::new("$JRaptor01", Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.5, -0.25, 0.0)).unwrap(),
        ];

        Tpm::new(file_info, materials, vec![tree, raptor], instances, bones)
    }

    fn assert_rotation_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{:?} != {:?}", a, b);
    }

    /// Documents are equal apart from rotation rounding through degrees.
    fn assert_same_document(a: &Tpm, b: &Tpm) {
        assert_eq!(a.file_info(), b.file_info());
        assert_eq!(a.materials(), b.materials());
        assert_eq!(a.meshes(), b.meshes());

        assert_eq!(a.instances().len(), b.instances().len());
        for (x, y) in a.instances().iter().zip(b.instances()) {
            assert_eq!(x.name(), y.name());
            assert_eq!(x.mesh(), y.mesh());
            assert_eq!(x.position(), y.position());
            assert_eq!(x.scale(), y.scale());
            assert_rotation_eq(x.rotation(), y.rotation());
        }

        assert_eq!(a.bones().len(), b.bones().len());
        for (x, y) in a.bones().iter().zip(b.bones()) {
            assert_eq!(x.name(), y.name());
            assert_eq!(x.position(), y.position());
            assert_rotation_eq(x.rotation(), y.rotation());
        }
    }

    #[test]
    fn test_round_trip() {
        let original = sample_document();
        let text = write_tpm_to_string(&original);

        let mut warnings = CollectWarnings::new();
        let decoded = load_tpm_from_string(&text, &mut warnings).unwrap();

        assert!(warnings.is_empty(), "{:?}", warnings.messages());
        assert_same_document(&original, &decoded);
    }

    #[test]
    fn test_round_trip_is_idempotent() {
        let once = load_tpm_from_string(&write_tpm_to_string(&sample_document()), &mut CollectWarnings::new()).unwrap();
        let twice = load_tpm_from_string(&write_tpm_to_string(&once), &mut CollectWarnings::new()).unwrap();
        let thrice = load_tpm_from_string(&write_tpm_to_string(&twice), &mut CollectWarnings::new()).unwrap();

        assert_same_document(&once, &twice);
        assert_same_document(&twice, &thrice);
        // Geometry carries no unit conversion, so it is stable from the first pass
        assert_eq!(once.meshes(), thrice.meshes());
    }

    #[test]
    fn test_round_trip_keeps_surrounding_whitespace() {
        let file_info = FileInfo::new(
            " 1.0.1",
            None,
            Some("   ".into()),
            None,
            Some(" 10/18 ".into()),
            Some("  padded comment".into()),
        )
        .unwrap();
        let material = Material::new(" Rock ", Some(" rock.bmp".into()), None, None).unwrap();
        let original = Tpm::new(file_info, vec![material], vec![], vec![], vec![]);

        let text = write_tpm_to_string(&original);
        assert!(text.contains("\tversion = \"   \"\n"), "{}", text);

        let decoded = load_tpm_from_string(&text, &mut CollectWarnings::new()).unwrap();
        assert_eq!(decoded.file_info(), original.file_info());
        assert_eq!(decoded.file_info().version(), Some("   "));
        assert_eq!(decoded.file_info().date(), Some(" 10/18 "));
        assert_eq!(decoded.materials(), original.materials());
    }

    #[test]
    fn test_load_sample_asset() {
        init_logging();

        let mut warnings = CollectWarnings::new();
        let tpm = load_tpm_from_string(SAMPLE, &mut warnings).unwrap();

        assert!(warnings.is_empty(), "{:?}", warnings.messages());
        assert_eq!(tpm.file_info().format_version(), "1.0.1");
        assert_eq!(tpm.materials().len(), 2);
        assert_eq!(tpm.meshes().len(), 2);
        assert_eq!(tpm.skins().count(), 1);
        assert_eq!(tpm.instances().len(), 2);
        assert_eq!(tpm.bones().len(), 2);
        assert_eq!(tpm.total_triangle_count(), 3);
    }

    #[test]
    fn test_save_and_load_file() {
        init_logging();

        let path = std::env::temp_dir().join(format!("tpm_core_loader_{}.tpm", std::process::id()));
        let original = sample_document();

        save_tpm(&path, &original).unwrap();
        let loaded = load_tpm(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_same_document(&original, &loaded);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_tpm("/definitely/not/here.tpm").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_grammar_and_decode_errors_are_distinct() {
        let mut warnings = CollectWarnings::new();

        let err = load_tpm_from_string("mesh \"A\"\n{\n", &mut warnings).unwrap_err();
        assert!(matches!(err, LoadError::Grammar(GrammarError::UnexpectedEof { .. })));

        let err = load_tpm_from_string("mesh \"A\"\n{\n}\n", &mut warnings).unwrap_err();
        assert!(matches!(err, LoadError::Decode(DecodeError::MissingFileInfo)));
    }
}
