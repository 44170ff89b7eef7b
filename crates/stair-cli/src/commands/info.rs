//! stair info command - mesh statistics and face classification.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use stair_gen::{Mesh, Transform, face_report};

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct InfoResult {
    input: String,
    vertices: usize,
    triangles: usize,
    has_normals: bool,
    has_uvs: bool,
    bounds_min: [f64; 3],
    bounds_max: [f64; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    facing: Option<FacingCounts>,
}

#[derive(Serialize)]
struct FacingCounts {
    front: usize,
    back: usize,
    left: usize,
    right: usize,
    up: usize,
    down: usize,
}

pub fn run(input: &Path, faces: bool, cli: &Cli) -> Result<()> {
    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load mesh from {input:?}"))?;

    let (min, max) = mesh.bounds().unwrap_or_default();
    let report = faces.then(|| face_report(&mesh, &Transform::identity()));

    let result = InfoResult {
        input: input.display().to_string(),
        vertices: mesh.vertex_count(),
        triangles: mesh.face_count(),
        has_normals: mesh.has_normals(),
        has_uvs: mesh.has_uvs(),
        bounds_min: [min.x, min.y, min.z],
        bounds_max: [max.x, max.y, max.z],
        facing: report.as_ref().map(|r| FacingCounts {
            front: r.front,
            back: r.back,
            left: r.left,
            right: r.right,
            up: r.up,
            down: r.down,
        }),
    };

    match cli.format {
        OutputFormat::Json => output::print(&result, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}: {}", "Mesh".cyan().bold(), input.display());
                println!(
                    "  {}: {} vertices, {} triangles",
                    "Geometry".cyan(),
                    result.vertices,
                    result.triangles
                );
                println!(
                    "  {}: normals {}, uvs {}",
                    "Channels".cyan(),
                    if result.has_normals { "yes" } else { "no" },
                    if result.has_uvs { "yes" } else { "no" }
                );
                println!(
                    "  {}: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
                    "Bounds".cyan(),
                    min.x,
                    min.y,
                    min.z,
                    max.x,
                    max.y,
                    max.z
                );
                if let Some(report) = &report {
                    println!(
                        "  {}: front {}, back {}, left {}, right {}, up {}, down {}",
                        "Facing".cyan(),
                        report.front,
                        report.back,
                        report.left,
                        report.right,
                        report.up,
                        report.down
                    );
                }
            }
        }
    }

    Ok(())
}
