//! Command-line tool for inspecting and rewriting TPM files.
//!
//! Usage:
//!   tpm info <file>                         - Summarise a document
//!   tpm check <file> [--strict]             - Decode and resolve references
//!   tpm fmt <file> [-o <out>]               - Rewrite in canonical form
//!   tpm dump <file>                         - Print the document as JSON
//!   tpm textures <file> [--search-path <d>] - Find material textures on disk

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tpm_core::resolve::check_references;
use tpm_core::texture::TextureLookup;
use tpm_core::{load_tpm_from_string, write_tpm_to_string, CollectWarnings, Tpm};
use tpm_math::radians_to_degrees;

#[derive(Debug, Parser)]
#[command(name = "tpm", version, about = "Inspect and rewrite TPM scene files")]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Summarise file info, materials, meshes, instances and bones
    Info {
        file: PathBuf,
    },

    /// Decode the file and report unresolved references
    Check {
        file: PathBuf,

        /// Fail if any warning is reported
        #[arg(long)]
        strict: bool,
    },

    /// Rewrite the file in canonical form
    Fmt {
        file: PathBuf,

        /// Output path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sort materials by name before writing
        #[arg(long)]
        sort_materials: bool,
    },

    /// Print the decoded document as JSON
    Dump {
        file: PathBuf,
    },

    /// Locate every material texture on disk
    Textures {
        file: PathBuf,

        /// Directory to search (defaults to the file's directory)
        #[arg(long)]
        search_path: Option<PathBuf>,

        /// Keep directory components of texture names
        #[arg(long)]
        keep_directories: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Info { file } => info(&file),
        Command::Check { file, strict } => check(&file, strict),
        Command::Fmt {
            file,
            output,
            sort_materials,
        } => fmt(&file, output.as_deref(), sort_materials),
        Command::Dump { file } => dump(&file),
        Command::Textures {
            file,
            search_path,
            keep_directories,
        } => textures(&file, search_path, keep_directories),
    }
}

/// Read and decode a document, collecting decode warnings.
fn load(path: &Path, warnings: &mut CollectWarnings) -> Result<Tpm> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    load_tpm_from_string(&content, warnings)
        .with_context(|| format!("Failed to load {}", path.display()))
}

/// Read and decode a document, forwarding warnings to the log.
fn load_logged(path: &Path) -> Result<Tpm> {
    let mut warnings = CollectWarnings::new();
    let tpm = load(path, &mut warnings)?;
    for message in warnings.messages() {
        log::warn!("{}", message);
    }
    Ok(tpm)
}

fn info(path: &Path) -> Result<()> {
    let tpm = load_logged(path)?;
    print!("{}", summary(&tpm));
    Ok(())
}

fn summary(tpm: &Tpm) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let info = tpm.file_info();

    let _ = writeln!(out, "=== File ===");
    let _ = writeln!(out, "Format version: {}", info.format_version());
    let fields = [
        ("Name", info.name()),
        ("Version", info.version()),
        ("Source", info.source()),
        ("Date", info.date()),
        ("Comments", info.comments()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "{}: {}", label, value);
        }
    }

    let _ = writeln!(out, "\n--- Materials ({}) ---", tpm.materials().len());
    for material in tpm.materials() {
        let _ = writeln!(out, "  {}", material.name());
        for (kind, name) in material.texture_maps() {
            let _ = writeln!(out, "       {} map: {}", kind, name);
        }
    }

    let _ = writeln!(out, "\n--- Meshes ({}) ---", tpm.meshes().len());
    for mesh in tpm.meshes() {
        let _ = writeln!(
            out,
            "  {}{} - {} vertices, {} triangles, {} materials",
            mesh.name(),
            if mesh.is_skin() { " (skin)" } else { "" },
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.material_names().len()
        );
        if let Some((min, max)) = mesh.bounds() {
            let _ = writeln!(
                out,
                "       Bounds: ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2})",
                min.x, min.y, min.z, max.x, max.y, max.z
            );
        }
    }

    let _ = writeln!(out, "\n--- Instances ({}) ---", tpm.instances().len());
    for instance in tpm.instances() {
        let p = instance.position();
        let r = radians_to_degrees(instance.rotation());
        let _ = writeln!(
            out,
            "  {} -> {} at ({:.2}, {:.2}, {:.2}), rotation ({:.1}, {:.1}, {:.1}), scale {}",
            instance.name(),
            instance.mesh(),
            p.x,
            p.y,
            p.z,
            r.x,
            r.y,
            r.z,
            instance.scale()
        );
    }

    let _ = writeln!(out, "\n--- Bones ({}) ---", tpm.bones().len());
    for bone in tpm.bones() {
        let p = bone.position();
        let _ = writeln!(out, "  {} at ({:.2}, {:.2}, {:.2})", bone.name(), p.x, p.y, p.z);
    }

    let _ = writeln!(out, "\nTotal triangles: {}", tpm.total_triangle_count());
    out
}

fn check(path: &Path, strict: bool) -> Result<()> {
    let mut warnings = CollectWarnings::new();
    let tpm = load(path, &mut warnings)?;
    check_references(&tpm, &mut warnings);

    for message in warnings.messages() {
        println!("warning: {}", message);
    }

    if warnings.is_empty() {
        println!("{}: ok", path.display());
    } else {
        println!("{}: {} warnings", path.display(), warnings.len());
        if strict {
            bail!("{} warnings in {}", warnings.len(), path.display());
        }
    }

    Ok(())
}

fn fmt(path: &Path, output: Option<&Path>, sort_materials: bool) -> Result<()> {
    let mut tpm = load_logged(path)?;
    if sort_materials {
        tpm = tpm.with_sorted_materials();
    }

    let text = write_tpm_to_string(&tpm);
    match output {
        Some(out) => {
            std::fs::write(out, text).with_context(|| format!("Failed to write {}", out.display()))?;
            log::info!("Wrote {}", out.display());
        }
        None => print!("{}", text),
    }

    Ok(())
}

fn dump(path: &Path) -> Result<()> {
    let tpm = load_logged(path)?;
    let json = serde_json::to_string_pretty(&tpm).context("Failed to serialize document")?;
    println!("{}", json);
    Ok(())
}

fn textures(path: &Path, search_path: Option<PathBuf>, keep_directories: bool) -> Result<()> {
    let tpm = load_logged(path)?;

    let mut lookup = match search_path {
        Some(dir) => TextureLookup::new(dir),
        None => TextureLookup::for_document(path),
    };
    lookup.strip_directories = !keep_directories;

    let missing = report_textures(&tpm, &lookup, |line| println!("{}", line));
    if missing > 0 {
        bail!("{} textures not found under {}", missing, lookup.search_path.display());
    }

    Ok(())
}

/// Look up every texture map, passing one report line per map to `out`.
/// Returns the number of textures that could not be found.
fn report_textures(tpm: &Tpm, lookup: &TextureLookup, mut out: impl FnMut(String)) -> usize {
    let mut missing = 0;
    for material in tpm.materials() {
        for (kind, name) in material.texture_maps() {
            match lookup.find(name) {
                Ok(found) => out(format!("  {} {} map: {}", material.name(), kind, found.display())),
                Err(e) => {
                    missing += 1;
                    out(format!("  {} {} map: {}", material.name(), kind, e));
                }
            }
        }
    }
    missing
}
