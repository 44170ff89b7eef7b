//! stair railing command - full straight/weld/follow pipeline.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use nalgebra::Vector3;
use serde::Serialize;
use stair_gen::{
    Mesh, PathParams, RailingConfig, RailingGenerator, Transform, WeldParams, combine_meshes,
};

use crate::{Cli, OutputFormat, PlacementModeArg, output};

pub struct Args<'a> {
    pub step: &'a Path,
    pub segment: &'a Path,
    pub output: &'a Path,
    pub count: usize,
    pub offset: Vector3<f64>,
    pub mode: PlacementModeArg,
    pub x_offset: f64,
    pub segments: usize,
    pub single_side: bool,
    pub overlap: f64,
    pub samples_per_step: usize,
    pub smoothing: f64,
    pub simplify_ratio: Option<f64>,
}

#[derive(Serialize)]
struct RailingCmdResult {
    step: String,
    segment: String,
    output: String,
    success: bool,
    sides: usize,
    path_waypoints: usize,
    vertices_welded: usize,
    vertices: usize,
    triangles: usize,
}

pub fn run(args: Args<'_>, cli: &Cli) -> Result<()> {
    let step_mesh = Mesh::load(args.step)
        .with_context(|| format!("Failed to load step mesh from {:?}", args.step))?;
    let segment_mesh = Mesh::load(args.segment)
        .with_context(|| format!("Failed to load railing segment from {:?}", args.segment))?;

    let (mut scene, stairs) = super::build_staircase(
        step_mesh,
        args.count,
        args.offset,
        args.mode,
        90.0,
        0.1,
        15.0,
        25.0,
    )?;

    let prefab = scene.spawn(
        stair_gen::SceneObject::new("rail_segment", Transform::identity())
            .with_mesh(segment_mesh),
    );

    output::info(
        &format!(
            "Generating railings ({} segments per side)...",
            args.segments
        ),
        cli.format,
        cli.quiet,
    );

    let mut railings = RailingGenerator::new(
        prefab,
        RailingConfig {
            x_offset: args.x_offset,
            segment_count: args.segments,
            both_sides: !args.single_side,
            overlap: args.overlap,
            path: PathParams {
                samples_per_step: args.samples_per_step,
                smoothing: args.smoothing,
            },
            weld: WeldParams::default(),
            simplify_ratio: args.simplify_ratio,
        },
    );
    let result = railings.generate(&mut scene, &stairs)?;

    // Both sides are already in world space; merge them for export.
    let meshes: Vec<(&Mesh, Transform)> = result
        .railings
        .iter()
        .filter_map(|&h| scene.get(h))
        .filter_map(|o| o.mesh.as_ref().map(|m| (m, o.transform)))
        .collect();
    let merged = combine_meshes(&meshes)?;

    merged
        .save(args.output)
        .with_context(|| format!("Failed to save railing to {:?}", args.output))?;

    let cmd_result = RailingCmdResult {
        step: args.step.display().to_string(),
        segment: args.segment.display().to_string(),
        output: args.output.display().to_string(),
        success: true,
        sides: result.railings.len(),
        path_waypoints: result.path_waypoints,
        vertices_welded: result.vertices_welded,
        vertices: merged.vertex_count(),
        triangles: merged.face_count(),
    };

    match cli.format {
        OutputFormat::Json => output::print(&cmd_result, cli.format, cli.quiet),
        OutputFormat::Text => {
            output::success(
                &format!("Railing saved to {}", args.output.display()),
                cli.format,
                cli.quiet,
            );
            if !cli.quiet {
                println!(
                    "  {}: {} sides, {} waypoints, {} vertices welded",
                    "Pipeline".cyan(),
                    cmd_result.sides,
                    cmd_result.path_waypoints,
                    cmd_result.vertices_welded
                );
                println!(
                    "  {}: {} vertices, {} triangles",
                    "Mesh".cyan(),
                    cmd_result.vertices,
                    cmd_result.triangles
                );
            }
        }
    }

    Ok(())
}
