use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use photoframe::{
    ContainerMeasurement, DirectorySink, EditorConfig, SceneCompositor, SelectedFile,
};

#[derive(Parser, Debug)]
#[command(name = "photoframe", version)]
#[command(about = "Compose a photo behind a decorative frame inside a circular canvas")]
struct Cli {
    /// Editor configuration JSON. Missing keys use the built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose and write the framed PNG.
    Export(ExportArgs),
    /// Print the computed canvas and photo geometry as JSON.
    Layout(LayoutArgs),
}

#[derive(clap::Args, Debug)]
struct SessionArgs {
    /// Photo to place under the frame.
    #[arg(long)]
    photo: PathBuf,

    /// Device viewport width in CSS pixels.
    #[arg(long, default_value_t = 1280)]
    viewport_width: u32,

    /// Container content width; defaults to the viewport width.
    #[arg(long)]
    container_width: Option<u32>,

    /// Photo scale factor (clamped to the configured slider range).
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Drag offset applied to the photo, as `dx,dy` on-screen pixels.
    #[arg(long, value_parser = parse_offset, allow_hyphen_values = true)]
    offset: Option<(f64, f64)>,

    /// Photo rotation in degrees.
    #[arg(long)]
    rotate: Option<f64>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Frame overlay (PNG, JPEG, WebP or SVG).
    #[arg(long)]
    frame: Option<PathBuf>,

    /// Output directory; the file name comes from the configuration.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Fail instead of replacing an existing export.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    #[command(flatten)]
    session: SessionArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => EditorConfig::from_path(path)?,
        None => EditorConfig::default(),
    };
    match cli.cmd {
        Command::Export(args) => cmd_export(cfg, args),
        Command::Layout(args) => cmd_layout(cfg, args),
    }
}

fn parse_offset(s: &str) -> Result<(f64, f64), String> {
    let (dx, dy) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `dx,dy`, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid offset component '{v}': {e}"))
    };
    Ok((parse(dx)?, parse(dy)?))
}

fn open_session(cfg: EditorConfig, args: &SessionArgs) -> anyhow::Result<SceneCompositor> {
    let measurement = ContainerMeasurement {
        viewport_width: args.viewport_width,
        container_width: Some(args.container_width.unwrap_or(args.viewport_width)),
    };
    let mut session = SceneCompositor::new(cfg, measurement)?;

    let photo = SelectedFile::from_path(&args.photo)?;
    session
        .load_photo(photo)
        .with_context(|| format!("load photo '{}'", args.photo.display()))?;
    session.set_user_scale(args.scale)?;
    if let Some((dx, dy)) = args.offset {
        session.drag_photo(photoframe::Vec2::new(dx, dy))?;
    }
    if let Some(deg) = args.rotate {
        session.rotate_photo(deg)?;
    }
    Ok(session)
}

fn cmd_export(cfg: EditorConfig, args: ExportArgs) -> anyhow::Result<()> {
    let mut session = open_session(cfg, &args.session)?;
    if let Some(frame) = &args.frame {
        let bytes =
            std::fs::read(frame).with_context(|| format!("read frame '{}'", frame.display()))?;
        session
            .load_frame(&bytes)
            .with_context(|| format!("load frame '{}'", frame.display()))?;
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    let mut sink = DirectorySink::new(&args.out);
    if args.no_overwrite {
        sink = sink.no_overwrite();
    }
    let report = session.export(&mut sink)?;

    eprintln!(
        "wrote {} ({}x{})",
        sink.path_for(&report.file_name).display(),
        report.width,
        report.height
    );
    Ok(())
}

fn cmd_layout(cfg: EditorConfig, args: LayoutArgs) -> anyhow::Result<()> {
    let session = open_session(cfg, &args.session)?;
    let report = serde_json::json!({
        "viewport": session.viewport(),
        "viewport_scale": session.viewport_scale(),
        "layer_geometry": session.layer_geometry(),
        "bound_box": session.photo_bound_box(),
        "controls": session.controls(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
