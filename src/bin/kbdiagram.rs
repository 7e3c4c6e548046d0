use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kbdiagram", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the full reveal plan (shapes + phases) as JSON.
    Plan(PlanArgs),
    /// Print phase counts and timing.
    Summary(ConfigArgs),
    /// Write an SVG still of the diagram at a point in time.
    Svg(StillArgs),
    /// Write a PNG still of the diagram at a point in time.
    Preview(StillArgs),
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Layout config JSON; omitted fields use the reference board.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct StillArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Seconds into the animation; defaults to the finished diagram.
    #[arg(long)]
    at: Option<f64>,

    /// Output width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Output path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Summary(args) => cmd_summary(args),
        Command::Svg(args) => cmd_svg(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn load_diagram(args: &ConfigArgs) -> anyhow::Result<kbdiagram::Diagram> {
    let cfg = match &args.config {
        Some(path) => kbdiagram::LayoutConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => kbdiagram::LayoutConfig::reference(),
    };
    Ok(kbdiagram::build(&cfg)?)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let diagram = load_diagram(&args.config)?;
    let json = kbdiagram::to_json(&diagram)?;

    match args.out {
        Some(out) => {
            ensure_parent(&out)?;
            std::fs::write(&out, json).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_summary(args: ConfigArgs) -> anyhow::Result<()> {
    let diagram = load_diagram(&args)?;
    let timeline = kbdiagram::Timeline::new(&diagram);

    println!("shapes:   {}", diagram.shapes.len());
    println!("phases:   {}", timeline.phase_count());
    println!("duration: {:.3}s", timeline.total_duration());
    println!("runtime:  {:.3}s (with hold)", timeline.runtime());
    for (i, phase) in diagram.phases.iter().enumerate() {
        let start = timeline.phase_start(i).unwrap_or_default();
        println!(
            "  {i:>3} @ {start:>7.3}s  {:>6.3}s  {:>3} ops  {:?}",
            phase.duration,
            phase.ops.len(),
            phase.kind
        );
    }
    Ok(())
}

fn render_still(args: &StillArgs) -> anyhow::Result<kbdiagram::SvgDocument> {
    let diagram = load_diagram(&args.config)?;
    let timeline = kbdiagram::Timeline::new(&diagram);
    let snapshot = match args.at {
        Some(t) => timeline.sample(t)?,
        None => timeline.snapshot(timeline.phase_count())?,
    };
    let opts = kbdiagram::SvgOptions {
        width_px: args.width,
        ..kbdiagram::SvgOptions::default()
    };
    Ok(kbdiagram::render_svg(&snapshot, &opts)?)
}

fn cmd_svg(args: StillArgs) -> anyhow::Result<()> {
    let doc = render_still(&args)?;
    ensure_parent(&args.out)?;
    std::fs::write(&args.out, doc.svg)
        .with_context(|| format!("write svg '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_preview(args: StillArgs) -> anyhow::Result<()> {
    let doc = render_still(&args)?;
    let (width, height, rgba) = kbdiagram::rasterize_svg(&doc.svg)?;
    kbdiagram::write_png(&args.out, width, height, &rgba)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
