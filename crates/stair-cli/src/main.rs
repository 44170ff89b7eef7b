//! stair: Command-line interface for procedural staircase and railing
//! generation.
//!
//! The tool reads step and railing-segment meshes as OBJ files, runs the
//! placement/weld/deform pipeline, and writes the resulting meshes back
//! out, suitable for scripting and batch use.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=stair_gen=info` - Basic operation logging
//! - `RUST_LOG=stair_gen=debug` - Detailed progress logging
//! - `RUST_LOG=stair_gen::timing=debug` - Performance timing
//!
//! # Example
//!
//! ```bash
//! # Generate an 11-step spiral staircase from a step mesh
//! stair stairs step.obj -o staircase.obj --count 11 --mode spiral
//!
//! # Full railing pipeline alongside it
//! stair railing step.obj rail.obj -o railing.obj --count 11
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use nalgebra::Vector3;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{combine, follow, info, railing, simplify, stairs, weld};

/// stair - procedural staircase and railing generation.
///
/// Duplicate a step mesh into straight, swept, or spiral staircases and
/// generate welded, path-following railings beside them.
#[derive(Parser)]
#[command(name = "stair")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Placement policy for the staircase run.
#[derive(Clone, Copy, ValueEnum)]
pub enum PlacementModeArg {
    /// Straight chain along the offset vector
    Linear,
    /// Progressive Y rotation with lateral banking
    Sweep,
    /// Circular spiral with per-step elevation
    Spiral,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a staircase from a step mesh and save the combined result
    Stairs {
        /// Step mesh file (OBJ)
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of step duplicates
        #[arg(long, default_value = "11")]
        count: usize,

        /// Offset between consecutive steps as "x,y,z"
        #[arg(long, default_value = "0,1,1", value_parser = parse_vector3)]
        offset: Vector3<f64>,

        /// Placement policy
        #[arg(long, value_enum, default_value = "linear")]
        mode: PlacementModeArg,

        /// Final Y rotation of a sweep, in degrees
        #[arg(long, default_value = "90")]
        sweep_degrees: f64,

        /// Lateral banking strength of a sweep
        #[arg(long, default_value = "0.1")]
        position_multiplier: f64,

        /// Step spacing along the spiral circumference
        #[arg(long, default_value = "15")]
        step_spacing: f64,

        /// Elevation gained per spiral step
        #[arg(long, default_value = "25")]
        height_step: f64,
    },

    /// Generate welded, path-following railings for a staircase
    Railing {
        /// Step mesh file (OBJ)
        step: PathBuf,

        /// Railing segment mesh file (OBJ)
        segment: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of step duplicates
        #[arg(long, default_value = "11")]
        count: usize,

        /// Offset between consecutive steps as "x,y,z"
        #[arg(long, default_value = "0,1,1", value_parser = parse_vector3)]
        offset: Vector3<f64>,

        /// Placement policy for the staircase the railing follows
        #[arg(long, value_enum, default_value = "linear")]
        mode: PlacementModeArg,

        /// Lateral distance from the staircase centerline
        #[arg(long, default_value = "2")]
        x_offset: f64,

        /// Number of straight segments per side
        #[arg(long, default_value = "10")]
        segments: usize,

        /// Generate the right side only
        #[arg(long)]
        single_side: bool,

        /// Longitudinal overlap between consecutive segments
        #[arg(long, default_value = "0.05")]
        overlap: f64,

        /// Interpolated path samples between consecutive steps
        #[arg(long, default_value = "3")]
        samples_per_step: usize,

        /// Path smoothing factor in [0, 1]
        #[arg(long, default_value = "0.1")]
        smoothing: f64,

        /// Decimate the finished railings by this vertex ratio
        #[arg(long)]
        simplify_ratio: Option<f64>,
    },

    /// Weld an ordered run of placed meshes into one seamless mesh
    Weld {
        /// Input mesh files, placed in world space
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Maximum vertex distance to weld
        #[arg(long, default_value = "0.01")]
        weld_distance: f64,

        /// Face classification angle threshold in degrees
        #[arg(long, default_value = "45")]
        face_angle: f64,
    },

    /// Deform a mesh to follow a waypoint path
    FollowPath {
        /// Input mesh file
        input: PathBuf,

        /// Waypoint file: one "x y z" triple per line
        #[arg(long)]
        path: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Simplify a mesh by a vertex retention ratio
    Simplify {
        /// Input mesh file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Vertex retention ratio in (0, 1]
        #[arg(long, default_value = "0.5")]
        ratio: f64,
    },

    /// Combine placed meshes into a single mesh
    Combine {
        /// Input mesh files
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Display mesh statistics and face classification info
    Info {
        /// Input mesh file
        input: PathBuf,

        /// Show the six-direction facing histogram
        #[arg(long)]
        faces: bool,
    },
}

/// Parse an "x,y,z" triple into a vector.
fn parse_vector3(value: &str) -> Result<Vector3<f64>, String> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected \"x,y,z\", got {value:?}"));
    }
    let mut coords = [0.0; 3];
    for (slot, part) in coords.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|e| format!("invalid component {part:?}: {e}"))?;
    }
    Ok(Vector3::new(coords[0], coords[1], coords[2]))
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags when set.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "stair_gen=info",
            2 => "stair_gen=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Stairs {
            input,
            output,
            count,
            offset,
            mode,
            sweep_degrees,
            position_multiplier,
            step_spacing,
            height_step,
        } => stairs::run(
            input,
            output,
            *count,
            *offset,
            *mode,
            *sweep_degrees,
            *position_multiplier,
            *step_spacing,
            *height_step,
            &cli,
        ),
        Commands::Railing {
            step,
            segment,
            output,
            count,
            offset,
            mode,
            x_offset,
            segments,
            single_side,
            overlap,
            samples_per_step,
            smoothing,
            simplify_ratio,
        } => railing::run(
            railing::Args {
                step,
                segment,
                output,
                count: *count,
                offset: *offset,
                mode: *mode,
                x_offset: *x_offset,
                segments: *segments,
                single_side: *single_side,
                overlap: *overlap,
                samples_per_step: *samples_per_step,
                smoothing: *smoothing,
                simplify_ratio: *simplify_ratio,
            },
            &cli,
        ),
        Commands::Weld {
            inputs,
            output,
            weld_distance,
            face_angle,
        } => weld::run(inputs, output, *weld_distance, *face_angle, &cli),
        Commands::FollowPath {
            input,
            path,
            output,
        } => follow::run(input, path, output, &cli),
        Commands::Simplify {
            input,
            output,
            ratio,
        } => simplify::run(input, output, *ratio, &cli),
        Commands::Combine { inputs, output } => combine::run(inputs, output, &cli),
        Commands::Info { input, faces } => info::run(input, *faces, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(stair_err) = e.downcast_ref::<stair_gen::StairError>() {
                eprintln!("{}: {}", "Error".red().bold(), stair_err);
                eprintln!("  {}: {}", "Code".cyan(), stair_err.code());
                if let Some(help) = miette::Diagnostic::help(stair_err) {
                    eprintln!("  {}: {}", "Suggestion".green(), help);
                }
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vector3() {
        let v = parse_vector3("0,1,1.5").unwrap();
        assert_eq!(v, Vector3::new(0.0, 1.0, 1.5));
        assert!(parse_vector3("1,2").is_err());
        assert!(parse_vector3("a,b,c").is_err());
    }
}
