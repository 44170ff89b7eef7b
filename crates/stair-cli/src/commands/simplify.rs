//! stair simplify command - decimate a mesh by a vertex retention ratio.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use stair_gen::Mesh;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct SimplifyCmdResult {
    input: String,
    output: String,
    success: bool,
    original_vertices: usize,
    final_vertices: usize,
    original_triangles: usize,
    final_triangles: usize,
    used_fallback: bool,
}

pub fn run(input: &Path, output_path: &Path, ratio: f64, cli: &Cli) -> Result<()> {
    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load mesh from {input:?}"))?;

    output::info(
        &format!("Simplifying mesh ({} vertices)...", mesh.vertex_count()),
        cli.format,
        cli.quiet,
    );

    let result = mesh.simplify(ratio);

    result
        .mesh
        .save(output_path)
        .with_context(|| format!("Failed to save simplified mesh to {output_path:?}"))?;

    let cmd_result = SimplifyCmdResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        success: true,
        original_vertices: result.original_vertices,
        final_vertices: result.final_vertices,
        original_triangles: result.original_triangles,
        final_triangles: result.final_triangles,
        used_fallback: result.used_fallback,
    };

    match cli.format {
        OutputFormat::Json => output::print(&cmd_result, cli.format, cli.quiet),
        OutputFormat::Text => {
            output::success(
                &format!("Simplified mesh saved to {}", output_path.display()),
                cli.format,
                cli.quiet,
            );
            if !cli.quiet {
                println!(
                    "  {}: {} → {} vertices, {} → {} triangles",
                    "Reduced".cyan(),
                    cmd_result.original_vertices,
                    cmd_result.final_vertices,
                    cmd_result.original_triangles,
                    cmd_result.final_triangles
                );
                if cmd_result.used_fallback {
                    println!("  {}: distance-merge fallback used", "Note".yellow());
                }
            }
        }
    }

    Ok(())
}
