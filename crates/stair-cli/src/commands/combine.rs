//! stair combine command - concatenate placed meshes into one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use stair_gen::{Mesh, Transform, combine_meshes};

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct CombineCmdResult {
    inputs: Vec<String>,
    output: String,
    success: bool,
    vertices: usize,
    triangles: usize,
}

pub fn run(inputs: &[PathBuf], output_path: &Path, cli: &Cli) -> Result<()> {
    let meshes: Vec<Mesh> = inputs
        .iter()
        .map(|path| Mesh::load(path).with_context(|| format!("Failed to load mesh from {path:?}")))
        .collect::<Result<_>>()?;

    let placed: Vec<(&Mesh, Transform)> = meshes
        .iter()
        .map(|mesh| (mesh, Transform::identity()))
        .collect();

    let combined = combine_meshes(&placed)?;

    combined
        .save(output_path)
        .with_context(|| format!("Failed to save combined mesh to {output_path:?}"))?;

    let result = CombineCmdResult {
        inputs: inputs.iter().map(|p| p.display().to_string()).collect(),
        output: output_path.display().to_string(),
        success: true,
        vertices: combined.vertex_count(),
        triangles: combined.face_count(),
    };

    match cli.format {
        OutputFormat::Json => output::print(&result, cli.format, cli.quiet),
        OutputFormat::Text => {
            output::success(
                &format!("Combined mesh saved to {}", output_path.display()),
                cli.format,
                cli.quiet,
            );
            if !cli.quiet {
                println!(
                    "  {}: {} meshes → {} vertices, {} triangles",
                    "Combined".cyan(),
                    result.inputs.len(),
                    result.vertices,
                    result.triangles
                );
            }
        }
    }

    Ok(())
}
