use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use warscene::config::{parse_resolution, RenderConfig};
use warscene::export::{export_scene, write_image};
use warscene::util::fresh_seed;

/// Seed-driven war scene generator
#[derive(Parser)]
#[command(name = "warscene")]
#[command(about = "Render deterministic war scenes from a 32-bit seed")]
#[command(version)]
struct Cli {
    /// Render settings file; defaults are used when it does not exist
    #[arg(long, global = true, default_value = "warscene.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one scene to an image file (.jpg, .jpeg or .png)
    Render {
        #[arg(long)]
        seed: u32,

        /// Output size as WxH
        #[arg(long, value_parser = parse_resolution, default_value = "1920x1080")]
        resolution: (u32, u32),

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render at export resolution to war-scene-<seed>.jpg with a landmarks sidecar
    Export {
        /// Scene seed; a fresh one is picked when omitted
        #[arg(long)]
        seed: Option<u32>,

        /// Override the configured export size (WxH)
        #[arg(long, value_parser = parse_resolution)]
        resolution: Option<(u32, u32)>,

        /// Override the configured output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Override the configured JPEG quality (1-100)
        #[arg(long)]
        quality: Option<u8>,
    },

    /// Interactive preview window
    #[cfg(feature = "preview")]
    Preview {
        #[arg(long)]
        seed: Option<u32>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = RenderConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    match cli.command {
        Commands::Render {
            seed,
            resolution: (width, height),
            output,
        } => {
            let width = i32::try_from(width).context("width too large")?;
            let height = i32::try_from(height).context("height too large")?;
            let image = warscene::generate(width, height, seed)?;
            write_image(&image, &output, config.jpeg_quality)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(seed, path = %output.display(), "render written");
        },
        Commands::Export {
            seed,
            resolution,
            output_dir,
            quality,
        } => {
            if let Some((w, h)) = resolution {
                config.export_width = w;
                config.export_height = h;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(q) = quality {
                config.jpeg_quality = q;
            }
            config.validate()?;

            let seed = seed.unwrap_or_else(|| fresh_seed(None));
            info!(
                seed,
                width = config.export_width,
                height = config.export_height,
                "exporting"
            );
            let outcome = export_scene(&config, seed)?;
            println!("{}", outcome.image_path.display());
            println!("{}", outcome.sidecar_path.display());
        },
        #[cfg(feature = "preview")]
        Commands::Preview { seed } => preview(&config, seed)?,
    }

    Ok(())
}

#[cfg(feature = "preview")]
fn preview(config: &RenderConfig, seed: Option<u32>) -> Result<()> {
    use sdl2::keyboard::Keycode;
    use tracing::error;
    use warscene::display::{Display, InputEvent, RenderTarget};
    use warscene::export::ExportJob;

    let (mut display, texture_creator) =
        Display::with_options("warscene", config.preview_width, config.preview_height)
            .map_err(anyhow::Error::msg)?;

    let mut seed = seed.unwrap_or_else(|| fresh_seed(None));
    let (w, h) = display.drawable_size();
    let mut target = RenderTarget::with_size(&texture_creator, w, h).map_err(anyhow::Error::msg)?;
    let mut frame = None;
    let mut dirty = true;
    let mut jobs: Vec<ExportJob> = Vec::new();

    println!("Controls:");
    println!("  R / Space  - New scene");
    println!("  S          - Export at {}x{}", config.export_width, config.export_height);
    println!("  Escape     - Quit");

    'main: loop {
        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::KeyDown(Keycode::R | Keycode::Space) => {
                    seed = fresh_seed(Some(seed));
                    dirty = true;
                },
                InputEvent::KeyDown(Keycode::S) => match ExportJob::spawn(config.clone(), seed) {
                    Ok(job) => {
                        info!(seed, "export started");
                        jobs.push(job);
                    },
                    Err(e) => error!(seed, error = %e, "could not start export"),
                },
                InputEvent::Resized => dirty = true,
                InputEvent::KeyDown(_) => {},
            }
        }

        jobs.retain(|job| match job.poll() {
            None => true,
            Some(Ok(outcome)) => {
                info!(seed = outcome.seed, path = %outcome.image_path.display(), "export finished");
                false
            },
            Some(Err(e)) => {
                error!(seed = job.seed(), error = %e, "export failed");
                false
            },
        });

        if dirty {
            let (w, h) = display.drawable_size();
            // Minimized windows report a zero drawable
            if w > 0 && h > 0 {
                if target.size() != (w, h) {
                    target = RenderTarget::with_size(&texture_creator, w, h)
                        .map_err(anyhow::Error::msg)?;
                }
                let width = i32::try_from(w).context("drawable too wide")?;
                let height = i32::try_from(h).context("drawable too tall")?;
                frame = Some(warscene::generate(width, height, seed)?);
                display
                    .set_title(&format!("warscene - seed {seed}"))
                    .map_err(anyhow::Error::msg)?;
                dirty = false;
            }
        }

        if let Some(buffer) = &frame {
            display.present(&mut target, buffer).map_err(anyhow::Error::msg)?;
        }
    }

    for job in &jobs {
        job.cancel();
    }
    Ok(())
}
