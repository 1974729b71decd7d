//! meld CLI - bead meshes from MELD toolpaths
//!
//! Converts toolpath JSON tables into coloured bead meshes for plotting,
//! VTK viewers, or STL export.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info, warn};
use meld_bead::{thickness_profile, LodController, LodLevel};
use meld_toolpath::{Toolpath, ToolpathCache};
use rayon::prelude::*;

mod config;
mod export;

use config::MeldConfig;
use export::Format;

#[derive(Parser)]
#[command(name = "meld")]
#[command(about = "Volumetric bead meshes for MELD toolpaths", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bead meshes for one or more toolpath files
    Mesh {
        /// Toolpath JSON files (`{"columns": {name: [values]}}`)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory receiving one output file per input
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Column used as the per-vertex colour scalar
        #[arg(short, long, default_value = "ToolTemp")]
        color: String,
        /// Level of detail (low, medium, high); unknown values mean medium
        #[arg(short, long, default_value = "medium")]
        lod: String,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Drop samples where the feedstock is not moving
        #[arg(long)]
        extruding_only: bool,
    },
    /// Display information about a toolpath file
    Info {
        /// Toolpath JSON file
        input: PathBuf,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Options shared by every input of one `mesh` run.
struct MeshJob<'a> {
    lod: &'a LodController,
    cache: &'a Mutex<ToolpathCache>,
    out_dir: &'a Path,
    color: &'a str,
    level: LodLevel,
    format: Format,
    extruding_only: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mesh {
            inputs,
            out_dir,
            color,
            lod,
            format,
            config,
            extruding_only,
        } => {
            let config = MeldConfig::load(config.as_deref())?;
            let controller = config.lod_controller()?;
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;
            let cache = Mutex::new(ToolpathCache::default());
            let job = MeshJob {
                lod: &controller,
                cache: &cache,
                out_dir: &out_dir,
                color: &color,
                level: LodLevel::parse_or_default(&lod),
                format,
                extruding_only,
            };
            run_mesh(&job, &inputs)?;
        }
        Commands::Info { input, config } => {
            let config = MeldConfig::load(config.as_deref())?;
            show_info(&input, &config)?;
        }
    }

    Ok(())
}

fn run_mesh(job: &MeshJob<'_>, inputs: &[PathBuf]) -> Result<()> {
    let outputs = plan_outputs(inputs, job.out_dir, job.format)?;
    let results: Vec<Result<Option<PathBuf>>> = inputs
        .par_iter()
        .zip(&outputs)
        .map(|(input, output)| mesh_file(job, input, output))
        .collect();

    let mut written = 0;
    let mut failed = 0;
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(Some(_)) => written += 1,
            Ok(None) => {}
            Err(e) => {
                error!("{}: {e:#}", input.display());
                failed += 1;
            }
        }
    }
    let stats = job
        .cache
        .lock()
        .map_err(|_| anyhow!("toolpath cache lock poisoned"))?
        .stats();
    info!(
        "wrote {written} of {} meshes ({} cache hits, {} misses)",
        inputs.len(),
        stats.hits,
        stats.misses
    );

    if failed > 0 {
        anyhow::bail!("{failed} input(s) failed");
    }
    Ok(())
}

fn file_stem(input: &Path) -> &str {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("toolpath")
}

/// One output path per input, `<stem>.<ext>` in `out_dir`.
///
/// Inputs sharing a stem get their position appended (`<stem>-<index>`).
/// Fails if two inputs would still write the same file.
fn plan_outputs(inputs: &[PathBuf], out_dir: &Path, format: Format) -> Result<Vec<PathBuf>> {
    let mut stem_counts: HashMap<&str, usize> = HashMap::new();
    for input in inputs {
        *stem_counts.entry(file_stem(input)).or_insert(0) += 1;
    }

    let mut seen = HashSet::new();
    let mut outputs = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let stem = file_stem(input);
        let name = if stem_counts[stem] > 1 {
            format!("{stem}-{index}.{}", format.extension())
        } else {
            format!("{stem}.{}", format.extension())
        };
        let output = out_dir.join(name);
        if !seen.insert(output.clone()) {
            anyhow::bail!(
                "{} would overwrite the output of another input ({})",
                input.display(),
                output.display()
            );
        }
        outputs.push(output);
    }
    Ok(outputs)
}

/// Mesh one input into `output`. `Ok(None)` means the input produced no mesh.
fn mesh_file(job: &MeshJob<'_>, input: &Path, output: &Path) -> Result<Option<PathBuf>> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let table = job
        .cache
        .lock()
        .map_err(|_| anyhow!("toolpath cache lock poisoned"))?
        .get_or_parse_json(&json)?;

    let toolpath = if job.extruding_only {
        let feed = &job.lod.assembler().columns().feed_velocity;
        Cow::Owned(table.extruding_only(feed))
    } else {
        Cow::Borrowed(&*table)
    };

    let Some((mesh, stats)) = job
        .lod
        .generate_lod_with_stats(&toolpath, job.color, job.level)
    else {
        warn!(
            "{}: no mesh ({} samples, colour column {:?}), skipping",
            input.display(),
            toolpath.len(),
            job.color
        );
        return Ok(None);
    };

    let bytes = export::encode(&mesh, job.format, file_stem(input), job.color)?;
    fs::write(output, bytes).with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        "{} -> {} ({} vertices, {} faces, {} segments skipped)",
        input.display(),
        output.display(),
        stats.vertices,
        stats.faces,
        stats.skipped
    );
    Ok(Some(output.to_path_buf()))
}

fn show_info(input: &Path, config: &MeldConfig) -> Result<()> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let toolpath = Toolpath::from_json(&json)
        .with_context(|| format!("failed to parse {}", input.display()))?;

    println!("toolpath: {}", input.display());
    println!("  Fingerprint: {}", toolpath.fingerprint());
    println!("  Rows: {}", toolpath.len());
    println!("  Columns:");
    for name in toolpath.column_names() {
        let values = toolpath.column(name).unwrap_or_default();
        match finite_range(values) {
            Some((lo, hi)) => println!("    {name}: [{lo}, {hi}]"),
            None => println!("    {name}: (no finite values)"),
        }
    }

    let columns = &config.columns;
    let missing = columns.missing(&toolpath);
    if !missing.is_empty() {
        println!("\nMissing bead-model columns: {}", missing.join(", "));
        return Ok(());
    }

    let assembler = config.assembler()?;
    let feed = toolpath.column(&columns.feed_velocity).unwrap_or_default();
    let path = toolpath.column(&columns.path_velocity).unwrap_or_default();
    let thickness = thickness_profile(feed, path, assembler.params());
    if let Some((lo, hi)) = finite_range(&thickness) {
        println!("\nBead thickness: [{lo:.3}, {hi:.3}] mm");
    }

    // Mesh counters do not depend on the colour column.
    match assembler.generate_with_stats(&toolpath, &columns.feed_velocity) {
        Some((_, stats)) => {
            println!("\nMesh stats:");
            println!("  Segments: {} ({} skipped)", stats.segments, stats.skipped);
            println!("  Vertices: {}", stats.vertices);
            println!("  Faces: {}", stats.faces);
        }
        None => println!("\nNo mesh: every segment is degenerate or too few samples"),
    }

    Ok(())
}

/// Smallest and largest finite value.
fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
