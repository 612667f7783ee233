use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use driftgrid_common::{PlaneId, Viewport};
use driftgrid_input::{Action, DeltaMode, InputNormalizer, Platform, WheelNormalizer};
use driftgrid_kernel::Scene;
use driftgrid_layout::{GridSpec, LayoutManifest};
use driftgrid_render::{DebugTextRenderer, RenderView, Renderer};
use driftgrid_tools::SceneInspector;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "driftgrid-cli", about = "CLI tool for driftgrid layouts")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a layout manifest
    Validate {
        manifest: PathBuf,
    },
    /// Generate a manifest from a directory of images
    Layout {
        /// Directory of images
        #[arg(long)]
        images: PathBuf,
        #[arg(long, default_value = "5")]
        columns: u32,
        #[arg(long, default_value = "320")]
        cell_width: f64,
        #[arg(long, default_value = "420")]
        cell_height: f64,
        #[arg(long, default_value = "40")]
        gap: f64,
        #[arg(long, default_value = "40")]
        padding: f64,
        /// Output file (.yaml or .json); prints YAML when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the scene summary and every plane
    Inspect {
        manifest: PathBuf,
        #[command(flatten)]
        viewport: ViewportArgs,
    },
    /// Run the scene headless with scripted input and print the result
    Simulate {
        manifest: PathBuf,
        /// Frames to run after input is applied
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Drag gesture as x0,y0,x1,y1 in logical pixels
        #[arg(long, value_delimiter = ',', num_args = 4)]
        drag: Option<Vec<f64>>,
        /// Wheel delta as dx,dy
        #[arg(long, value_delimiter = ',', num_args = 2, allow_negative_numbers = true)]
        wheel: Option<Vec<f64>>,
        /// Report the wheel delta in lines instead of pixels
        #[arg(long)]
        line_mode: bool,
        /// Scale wheel deltas as on Windows
        #[arg(long)]
        windows_wheel: bool,
        /// Apply the line-scaled multiplier to line deltas
        #[arg(long)]
        line_scaled_wheel: bool,
        #[command(flatten)]
        viewport: ViewportArgs,
    },
}

#[derive(clap::Args)]
struct ViewportArgs {
    /// Viewport width in logical pixels
    #[arg(long, default_value = "1280")]
    width: f64,
    /// Viewport height in logical pixels
    #[arg(long, default_value = "720")]
    height: f64,
}

impl ViewportArgs {
    fn viewport(&self) -> anyhow::Result<Viewport> {
        if !(self.width > 0.0 && self.height > 0.0) {
            bail!("viewport must be positive, got {}x{}", self.width, self.height);
        }
        Ok(Viewport::new(self.width, self.height))
    }
}

fn load(manifest: &Path) -> anyhow::Result<LayoutManifest> {
    LayoutManifest::load(manifest).with_context(|| format!("loading {}", manifest.display()))
}

/// Input script for `simulate`, expanded into actions.
fn scripted_actions(drag: Option<&[f64]>, wheel: Option<&[f64]>, line_mode: bool) -> Vec<Action> {
    let mut actions = Vec::new();
    if let Some(&[x0, y0, x1, y1]) = drag {
        actions.push(Action::PointerDown { x: x0, y: y0 });
        actions.push(Action::PointerMove { x: x1, y: y1 });
        actions.push(Action::PointerUp);
    }
    if let Some(&[dx, dy]) = wheel {
        actions.push(Action::Wheel {
            delta_x: dx,
            delta_y: dy,
            mode: if line_mode {
                DeltaMode::Line
            } else {
                DeltaMode::Pixel
            },
        });
    }
    actions
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Validate { manifest } => {
            let layout = load(&manifest)?;
            let extent = layout.container.max();
            println!(
                "{}: OK ({} planes, extent {:.0}x{:.0})",
                manifest.display(),
                layout.planes.len(),
                extent.x,
                extent.y
            );
            let missing = layout
                .planes
                .iter()
                .filter(|p| !layout.resolve_src(&p.src).exists())
                .count();
            if missing > 0 {
                tracing::warn!("{missing} image(s) not found; those planes will render blank");
            }
        }
        Commands::Layout {
            images,
            columns,
            cell_width,
            cell_height,
            gap,
            padding,
            out,
        } => {
            if columns == 0 || cell_width <= 0.0 || cell_height <= 0.0 {
                bail!("columns and cell size must be positive");
            }
            let spec = GridSpec {
                columns,
                cell_width,
                cell_height,
                gap,
                padding,
            };
            let mut layout = LayoutManifest::from_image_dir(&images, &spec)
                .with_context(|| format!("laying out {}", images.display()))?;
            match out {
                Some(path) => {
                    let out_dir = match path.parent() {
                        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                        _ => PathBuf::from("."),
                    };
                    if !same_dir(&out_dir, &images) {
                        layout.rebase(out_dir)?;
                    }
                    layout.save(&path)?;
                    println!(
                        "wrote {} planes ({} columns x {} rows) to {}",
                        layout.planes.len(),
                        spec.columns,
                        spec.rows(layout.planes.len()),
                        path.display()
                    );
                }
                None => print!("{}", layout.to_yaml()?),
            }
        }
        Commands::Inspect { manifest, viewport } => {
            let layout = load(&manifest)?;
            let scene = Scene::new(&layout, viewport.viewport()?);
            println!("{}", SceneInspector::summary(&scene));
            for plane in SceneInspector::list_planes(&scene) {
                println!("  {plane}");
            }
        }
        Commands::Simulate {
            manifest,
            frames,
            drag,
            wheel,
            line_mode,
            windows_wheel,
            line_scaled_wheel,
            viewport,
        } => {
            let layout = load(&manifest)?;
            let viewport = viewport.viewport()?;
            let mut scene = Scene::new(&layout, viewport);
            let platform = Platform {
                windows: windows_wheel,
                line_scaled_engine: line_scaled_wheel,
            };
            let mut input = InputNormalizer::new(WheelNormalizer::new(platform), scene.tuning());
            tracing::debug!("wheel platform: {:?}", input.wheel().platform());

            for action in scripted_actions(drag.as_deref(), wheel.as_deref(), line_mode) {
                input.apply(&action);
            }
            tracing::info!(
                "simulating {frames} frames toward ({:.2}, {:.2})",
                input.target().x,
                input.target().y
            );
            for _ in 0..frames {
                scene.tick(input.target());
            }

            let view = RenderView::for_viewport(viewport);
            print!("{}", DebugTextRenderer::new().render(&scene, &view));
            if let Some(info) = SceneInspector::inspect_plane(&scene, PlaneId(0)) {
                tracing::debug!("first plane: {info}");
            }
        }
    }

    Ok(())
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_script_expands_to_gesture() {
        let actions = scripted_actions(Some(&[10.0, 10.0, 20.0, 30.0]), None, false);
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0], Action::PointerDown { x: 10.0, y: 10.0 });
        assert_eq!(actions[2], Action::PointerUp);
    }

    #[test]
    fn wheel_script_respects_line_mode() {
        let actions = scripted_actions(None, Some(&[0.0, 3.0]), true);
        assert!(matches!(
            actions[..],
            [Action::Wheel {
                mode: DeltaMode::Line,
                ..
            }]
        ));
    }

    #[test]
    fn malformed_script_is_ignored() {
        assert!(scripted_actions(Some(&[1.0, 2.0]), Some(&[1.0]), false).is_empty());
    }

    #[test]
    fn simulate_parses_negative_wheel() {
        let cli = Cli::try_parse_from([
            "driftgrid-cli",
            "simulate",
            "grid.yaml",
            "--wheel",
            "-3,4",
            "--drag",
            "0,0,10,10",
        ])
        .unwrap();
        let Commands::Simulate { wheel, drag, .. } = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(wheel, Some(vec![-3.0, 4.0]));
        assert_eq!(drag, Some(vec![0.0, 0.0, 10.0, 10.0]));
    }
}
