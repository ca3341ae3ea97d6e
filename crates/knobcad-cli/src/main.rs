//! Command-line interface for the knob generator.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use knobcad::Knob;

#[derive(Parser)]
#[command(name = "knobcad", version, about = "Parametric 3D-printable knob generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate an ASCII STL from a knob config document
    Generate {
        /// Path to the JSON config
        config: PathBuf,
        /// Output STL path
        #[arg(short, long, default_value = "knob.stl")]
        output: PathBuf,
    },
    /// Print a summary of the knob a config document generates
    Info {
        /// Path to the JSON config
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate { config, output } => generate(&config, &output),
        Command::Info { config } => info(&config),
    }
}

fn load(config_path: &Path) -> Result<Knob> {
    let json = fs::read_to_string(config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    Knob::from_json(&json).with_context(|| format!("generating from {}", config_path.display()))
}

fn generate(config_path: &Path, output: &Path) -> Result<()> {
    let knob = load(config_path)?;
    let stl = knob.export_stl()?;
    fs::write(output, &stl).with_context(|| format!("writing {}", output.display()))?;

    let triangles = stl.matches("facet normal").count();
    println!(
        "wrote {} ({} solids, {} triangles)",
        output.display(),
        knob.model().scene_solids().len(),
        triangles
    );
    Ok(())
}

fn info(config_path: &Path) -> Result<()> {
    let knob = load(config_path)?;
    let model = knob.model();
    let config = model.config();

    println!("body:      height {} mm", config.body.height);
    println!(
        "profile:   arc length {:.3} mm{}",
        model.body_profile().arc_length(),
        if model.body_profile().is_cylinder() {
            " (cylindrical)"
        } else {
            ""
        }
    );
    println!("pointers:  {}", config.pointers.len());
    println!(
        "cavity:    {}",
        if model.cavity_id().is_some() {
            "yes"
        } else {
            "none"
        }
    );
    println!("subtracted solids: {}", model.subtraction_count());
    println!("scene solids:      {}", model.scene_solids().len());

    let meshes = knob.scene_meshes()?;
    let triangles: usize = meshes.iter().map(|m| m.num_triangles()).sum();
    let volume: f64 = meshes.iter().map(|m| m.volume()).sum();
    println!("triangles:         {triangles}");
    println!("total volume:      {volume:.2} mm^3");
    Ok(())
}
