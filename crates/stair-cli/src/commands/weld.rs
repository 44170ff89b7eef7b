//! stair weld command - weld an ordered run of placed meshes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use stair_gen::{Mesh, Transform, WeldParams, weld_adjacent};

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct WeldCmdResult {
    inputs: Vec<String>,
    output: String,
    success: bool,
    vertices_welded: usize,
    pairs_skipped: usize,
    vertices: usize,
    triangles: usize,
}

pub fn run(
    inputs: &[PathBuf],
    output_path: &Path,
    weld_distance: f64,
    face_angle: f64,
    cli: &Cli,
) -> Result<()> {
    let meshes: Vec<Mesh> = inputs
        .iter()
        .map(|path| Mesh::load(path).with_context(|| format!("Failed to load mesh from {path:?}")))
        .collect::<Result<_>>()?;

    // Input files carry world-space coordinates already.
    let placed: Vec<(&Mesh, Transform)> = meshes
        .iter()
        .map(|mesh| (mesh, Transform::identity()))
        .collect();

    output::info(
        &format!("Welding {} meshes...", placed.len()),
        cli.format,
        cli.quiet,
    );

    let params = WeldParams {
        weld_distance,
        face_angle_degrees: face_angle,
    };
    let result = weld_adjacent(&placed, &params)?;

    result
        .mesh
        .save(output_path)
        .with_context(|| format!("Failed to save welded mesh to {output_path:?}"))?;

    let cmd_result = WeldCmdResult {
        inputs: inputs.iter().map(|p| p.display().to_string()).collect(),
        output: output_path.display().to_string(),
        success: true,
        vertices_welded: result.vertices_welded,
        pairs_skipped: result.pairs_skipped,
        vertices: result.mesh.vertex_count(),
        triangles: result.mesh.face_count(),
    };

    match cli.format {
        OutputFormat::Json => output::print(&cmd_result, cli.format, cli.quiet),
        OutputFormat::Text => {
            output::success(
                &format!("Welded mesh saved to {}", output_path.display()),
                cli.format,
                cli.quiet,
            );
            if !cli.quiet {
                println!(
                    "  {}: {} vertices welded, {} pairs skipped",
                    "Weld".cyan(),
                    cmd_result.vertices_welded,
                    cmd_result.pairs_skipped
                );
            }
        }
    }

    Ok(())
}
