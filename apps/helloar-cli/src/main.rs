use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Mat4;
use helloar_assets::{BuiltinShaders, DirShaderAssets, ShaderAssets, ShaderSources};
use helloar_render::{GlCommand, RecordingContext, TriangleRenderer};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod camera;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "helloar-cli", about = "Drive the AR triangle renderer without a GPU")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML trace configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Render frames into a recording context and print the GL calls
    Trace {
        /// Number of frames to render
        #[arg(short, long)]
        frames: Option<u32>,
        /// Uniform model scale
        #[arg(short, long)]
        scale: Option<f32>,
        /// Directory holding the shader assets
        #[arg(long)]
        shader_dir: Option<PathBuf>,
        /// Print the trace as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Every frame's calls are kept in memory until the trace is printed.
const MAX_TRACE_FRAMES: u32 = 10_000;

/// Recorded calls of one trace run.
#[derive(Debug, Serialize)]
struct Trace {
    setup: Vec<GlCommand>,
    frames: Vec<Vec<GlCommand>>,
}

fn load_sources(config: &CliConfig) -> anyhow::Result<ShaderSources> {
    let assets: Box<dyn ShaderAssets> = match &config.shader_dir {
        Some(dir) => Box::new(DirShaderAssets::new(dir)),
        None => Box::new(BuiltinShaders),
    };
    ShaderSources::load(assets.as_ref(), &config.shaders).context("loading shader assets")
}

fn run_trace(config: &CliConfig) -> anyhow::Result<Trace> {
    anyhow::ensure!(
        config.frames <= MAX_TRACE_FRAMES,
        "frame count {} exceeds the limit of {MAX_TRACE_FRAMES}",
        config.frames
    );
    let sources = load_sources(config)?;
    let mut ctx = RecordingContext::new();
    let mut renderer = TriangleRenderer::create_on_gl_thread(&mut ctx, &sources)
        .context("initializing triangle renderer")?;
    let setup = ctx.take_commands();

    let anchor = Mat4::from_translation(config.camera.target);
    let projection = config.camera.projection_matrix();
    let mut frames = Vec::new();
    for frame in 0..config.frames {
        renderer.update_model_matrix(&anchor, config.scale);
        renderer.draw(&mut ctx, &config.camera.view_matrix(frame), &projection);
        tracing::debug!(
            frame,
            mvp = ?renderer.transforms().model_view_projection,
            "frame rendered"
        );
        frames.push(ctx.take_commands());
    }

    Ok(Trace { setup, frames })
}

fn print_trace(trace: &Trace) {
    println!("-- setup ({} calls)", trace.setup.len());
    for command in &trace.setup {
        println!("  {command:?}");
    }
    for (i, frame) in trace.frames.iter().enumerate() {
        println!("-- frame {i} ({} calls)", frame.len());
        for command in frame {
            println!("  {command:?}");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("helloar-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", helloar_assets::crate_info());
            println!("render: {}", helloar_render::crate_info());
        }
        Commands::Trace {
            frames,
            scale,
            shader_dir,
            json,
        } => {
            if let Some(frames) = frames {
                config.frames = frames;
            }
            if let Some(scale) = scale {
                config.scale = scale;
            }
            if shader_dir.is_some() {
                config.shader_dir = shader_dir;
            }

            tracing::info!(frames = config.frames, scale = config.scale, "tracing renderer");
            let trace = run_trace(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&trace)?);
            } else {
                print_trace(&trace);
            }
        }
    }

    Ok(())
}
