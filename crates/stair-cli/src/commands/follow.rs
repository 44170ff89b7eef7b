//! stair follow-path command - deform a mesh onto a waypoint path.

use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use nalgebra::Point3;
use serde::Serialize;
use stair_gen::Mesh;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct FollowResult {
    input: String,
    path: String,
    output: String,
    success: bool,
    waypoints: usize,
    vertices: usize,
}

/// Parse a waypoint file: one "x y z" triple per line, `#` comments and
/// blank lines ignored.
fn load_waypoints(path: &Path) -> Result<Vec<Point3<f64>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read waypoint file {path:?}"))?;

    let mut waypoints = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let coords: Vec<f64> = line
            .split_whitespace()
            .map(|field| field.parse())
            .collect::<Result<_, _>>()
            .with_context(|| format!("{}:{}: malformed waypoint", path.display(), number + 1))?;
        if coords.len() != 3 {
            bail!(
                "{}:{}: expected 3 coordinates, got {}",
                path.display(),
                number + 1,
                coords.len()
            );
        }
        waypoints.push(Point3::new(coords[0], coords[1], coords[2]));
    }
    Ok(waypoints)
}

pub fn run(input: &Path, path_file: &Path, output_path: &Path, cli: &Cli) -> Result<()> {
    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load mesh from {input:?}"))?;
    let waypoints = load_waypoints(path_file)?;

    output::info(
        &format!("Deforming onto {} waypoints...", waypoints.len()),
        cli.format,
        cli.quiet,
    );

    let deformed = mesh.follow_path(&waypoints)?;

    deformed
        .save(output_path)
        .with_context(|| format!("Failed to save deformed mesh to {output_path:?}"))?;

    let result = FollowResult {
        input: input.display().to_string(),
        path: path_file.display().to_string(),
        output: output_path.display().to_string(),
        success: true,
        waypoints: waypoints.len(),
        vertices: deformed.vertex_count(),
    };

    match cli.format {
        OutputFormat::Json => output::print(&result, cli.format, cli.quiet),
        OutputFormat::Text => {
            output::success(
                &format!("Deformed mesh saved to {}", output_path.display()),
                cli.format,
                cli.quiet,
            );
            if !cli.quiet {
                println!(
                    "  {}: {} waypoints, {} vertices",
                    "Path".cyan(),
                    result.waypoints,
                    result.vertices
                );
            }
        }
    }

    Ok(())
}
