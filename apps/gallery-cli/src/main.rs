use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gallery_assets::{LoadStats, load_obj, load_obj_with_stats};
use gallery_input::{CameraController, InputSnapshot, Movement};
use gallery_render::recording::{RecordingContext, RecordingDevice};
use gallery_render::{SceneConfig, SceneRenderer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gallery-cli", about = "CLI tool for gallery models")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Load a model and report what the loader built
    Inspect {
        model: PathBuf,
        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run scene frames against an in-memory device and report each one
    Frames {
        /// Mesh held in front of the camera
        #[arg(long)]
        main: Option<PathBuf>,
        /// Mesh drawn for the animated props
        #[arg(long)]
        prop: PathBuf,
        /// Number of frames
        #[arg(short = 'n', long, default_value = "3")]
        frames: u32,
        /// Simulated frame interval in milliseconds
        #[arg(long, default_value = "16")]
        interval_ms: u64,
        /// Hold the forward key on every frame
        #[arg(long)]
        forward: bool,
    },
}

fn inspect(model: &Path, json: bool) -> Result<String> {
    let (mesh, stats) = load_obj_with_stats(model)
        .with_context(|| format!("failed to load {}", model.display()))?;
    if json {
        return Ok(serde_json::to_string_pretty(&stats)?);
    }
    Ok(describe(model, &stats, mesh.triangle_count()))
}

fn describe(model: &Path, stats: &LoadStats, triangles: usize) -> String {
    let mut out = format!("model: {}\n", model.display());
    out.push_str(&format!(
        "attributes: {} positions, {} normals, {} uvs\n",
        stats.positions, stats.normals, stats.uvs
    ));
    out.push_str(&format!(
        "faces: {} triangles, {} quads\n",
        stats.triangles, stats.quads
    ));
    out.push_str(&format!("skipped lines: {}\n", stats.skipped_lines));
    out.push_str(&format!(
        "vertices: {} ({} reused)\n",
        stats.vertices, stats.reused_vertices
    ));
    out.push_str(&format!(
        "indices: {} ({triangles} triangles)\n",
        stats.indices
    ));
    out
}

fn frames(
    main: Option<&Path>,
    prop: &Path,
    count: u32,
    interval: Duration,
    forward: bool,
) -> Result<String> {
    let main = main
        .map(|p| load_obj(p).with_context(|| format!("failed to load {}", p.display())))
        .transpose()?;
    let prop = load_obj(prop).with_context(|| format!("failed to load {}", prop.display()))?;

    let mut device = RecordingDevice::new();
    let mut scene = SceneRenderer::new(
        &mut device,
        main.as_ref(),
        &prop,
        SceneConfig::default(),
        1280,
        720,
    )?;
    let mut camera = CameraController::default();
    let mut input = InputSnapshot {
        focused: true,
        ..InputSnapshot::default()
    };
    input.moves.set(Movement::Forward, forward);

    let mut out = format!(
        "uploaded {} buffers, {} bytes\n",
        device.uploads().len(),
        device.total_bytes()
    );

    let start = Instant::now();
    let mut ctx = RecordingContext::new();
    for i in 0..count {
        camera.update(&input, interval);
        ctx.clear();
        let report = scene.render_frame(&mut ctx, camera.view(), start + interval * i)?;
        let pos = camera.position();
        out.push_str(&format!(
            "frame {i}: t={:.3} draws={} skipped={} uploads={} camera=({:.2}, {:.2}, {:.2})\n",
            report.time, report.draws, report.skipped, report.param_uploads, pos.x, pos.y, pos.z
        ));
    }
    tracing::debug!(frames = count, draws = ctx.draws().len(), "dry run finished");
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("gallery-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", gallery_assets::crate_info());
            println!("render: {}", gallery_render::crate_info());
        }
        Commands::Inspect { model, json } => {
            print!("{}", inspect(&model, json)?);
            if json {
                println!();
            }
        }
        Commands::Frames {
            main,
            prop,
            frames: count,
            interval_ms,
            forward,
        } => {
            let interval = Duration::from_millis(interval_ms);
            print!("{}", frames(main.as_deref(), &prop, count, interval, forward)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    fn write_model(dir: &Path) -> PathBuf {
        let path = dir.join("quad.obj");
        std::fs::write(&path, QUAD).unwrap();
        path
    }

    #[test]
    fn inspect_reports_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(dir.path());
        let text = inspect(&path, false).unwrap();
        assert!(text.contains("faces: 0 triangles, 1 quads"));
        assert!(text.contains("vertices: 4"));
        assert!(text.contains("indices: 6 (2 triangles)"));
    }

    #[test]
    fn inspect_json_is_parseable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(dir.path());
        let json = inspect(&path, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["quads"], 1);
        assert_eq!(value["indices"], 6);
    }

    #[test]
    fn inspect_missing_file_fails() {
        assert!(inspect(Path::new("/nonexistent/model.obj"), false).is_err());
    }

    #[test]
    fn frames_draw_whole_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(dir.path());
        let out = frames(Some(&path), &path, 2, Duration::from_millis(16), false).unwrap();
        assert!(out.starts_with("uploaded 10 buffers"));
        assert_eq!(out.matches("draws=7 skipped=0").count(), 2);
    }

    #[test]
    fn frames_without_main_mesh_draw_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(dir.path());
        let out = frames(None, &path, 1, Duration::from_millis(16), false).unwrap();
        assert!(out.starts_with("uploaded 0 buffers"));
        assert!(out.contains("draws=0"));
    }

    #[test]
    fn forward_flag_moves_camera() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(dir.path());
        let out = frames(Some(&path), &path, 1, Duration::from_millis(16), true).unwrap();
        // Default eye at z = -8 looking toward +z, one 0.05 step, height pinned.
        assert!(out.contains(", 1.00, -7.95)"), "{out}");
    }

    #[test]
    fn idle_frames_still_pin_camera_height() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(dir.path());
        let out = frames(Some(&path), &path, 1, Duration::from_millis(16), false).unwrap();
        assert!(out.contains(", 1.00, -8.00)"), "{out}");
    }
}
