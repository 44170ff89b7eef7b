//! stair stairs command - generate a staircase and save the combined mesh.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use nalgebra::Vector3;
use serde::Serialize;
use stair_gen::{Mesh, combine_selected};

use crate::{Cli, OutputFormat, PlacementModeArg, output};

#[derive(Serialize)]
struct StairsResult {
    input: String,
    output: String,
    success: bool,
    steps: usize,
    vertices: usize,
    triangles: usize,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    input: &Path,
    output_path: &Path,
    count: usize,
    offset: Vector3<f64>,
    mode: PlacementModeArg,
    sweep_degrees: f64,
    position_multiplier: f64,
    step_spacing: f64,
    height_step: f64,
    cli: &Cli,
) -> Result<()> {
    let step_mesh =
        Mesh::load(input).with_context(|| format!("Failed to load step mesh from {input:?}"))?;

    output::info(
        &format!("Generating {count} steps..."),
        cli.format,
        cli.quiet,
    );

    let (mut scene, stairs) = super::build_staircase(
        step_mesh,
        count,
        offset,
        mode,
        sweep_degrees,
        position_multiplier,
        step_spacing,
        height_step,
    )?;

    // Bake the placed duplicates into one mesh for export.
    let combined = combine_selected(&mut scene, stairs.instances(), None)?;
    let mesh = scene
        .get(combined)
        .and_then(|o| o.mesh.clone())
        .context("combined object missing its mesh")?;

    mesh.save(output_path)
        .with_context(|| format!("Failed to save staircase to {output_path:?}"))?;

    let result = StairsResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        success: true,
        steps: count,
        vertices: mesh.vertex_count(),
        triangles: mesh.face_count(),
    };

    match cli.format {
        OutputFormat::Json => output::print(&result, cli.format, cli.quiet),
        OutputFormat::Text => {
            output::success(
                &format!("Staircase saved to {}", output_path.display()),
                cli.format,
                cli.quiet,
            );
            if !cli.quiet {
                println!(
                    "  {}: {} steps, {} vertices, {} triangles",
                    "Generated".cyan(),
                    result.steps,
                    result.vertices,
                    result.triangles
                );
            }
        }
    }

    Ok(())
}
