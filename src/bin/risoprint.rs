use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use vello_cpu::kurbo::{BezPath, Circle, Rect, Shape as _};
use vello_cpu::peniko::Color;

use risoprint::{PrintCompositor, SeededRng, generate_misregistration, stochastic_halftone};

#[derive(Parser, Debug)]
#[command(name = "risoprint", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the built-in demo plate set for a seed and write a PNG.
    Print(PrintArgs),
    /// Dump the misregistration map for a seed as JSON.
    Offsets(OffsetsArgs),
}

#[derive(Parser, Debug)]
struct PrintArgs {
    /// Output width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Session seed fixing the print run.
    #[arg(long, default_value_t = 42)]
    seed: i32,

    /// Halftone grid pitch for the water plate.
    #[arg(long, default_value_t = 9.0)]
    spacing: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct OffsetsArgs {
    /// Session seed fixing the print run.
    #[arg(long, default_value_t = 42)]
    seed: i32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Print(args) => cmd_print(args),
        Command::Offsets(args) => cmd_offsets(args),
    }
}

fn cmd_offsets(args: OffsetsArgs) -> anyhow::Result<()> {
    let map = generate_misregistration(args.seed);
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

// Density-only paint: the compositor ignores layer RGB, alpha is ink
// coverage.
fn density(alpha: u8) -> Color {
    Color::from_rgba8(255, 255, 255, alpha)
}

fn cmd_print(args: PrintArgs) -> anyhow::Result<()> {
    risoprint::validate_catalog()?;
    let mut comp = PrintCompositor::new(args.width, args.height, args.seed)
        .context("construct compositor")?;
    let (w, h) = (f64::from(args.width), f64::from(args.height));

    // Base terrain tone with a lighter coastal strip left blank.
    comp.layer("light_gray", |ctx| {
        ctx.set_paint(density(110));
        ctx.fill_rect(&Rect::new(w * 0.30, 0.0, w, h));
        ctx.set_paint(density(60));
        ctx.fill_rect(&Rect::new(w * 0.26, 0.0, w * 0.30, h));
    })?;

    // Water: a solid plate turned into halftone dots before compositing.
    comp.layer("teal", |ctx| {
        ctx.set_paint(density(235));
        ctx.fill_rect(&Rect::new(0.0, 0.0, w * 0.28, h));
    })?;
    let mut rng = SeededRng::new(args.seed);
    stochastic_halftone(comp.layer_mut("teal")?, args.spacing, &mut rng)
        .context("halftone water plate")?;

    // Contours across the terrain.
    comp.layer("blue", |ctx| {
        ctx.set_paint(density(170));
        let mut y = h * 0.15;
        while y < h {
            ctx.fill_rect(&Rect::new(w * 0.32, y, w * 0.96, y + 1.5));
            y += h * 0.12;
        }
    })?;

    // Road network: one avenue, one cross street, one diagonal.
    comp.layer("orange", |ctx| {
        ctx.set_paint(density(230));
        ctx.fill_rect(&Rect::new(w * 0.45, 0.0, w * 0.47, h));
        ctx.fill_rect(&Rect::new(w * 0.30, h * 0.55, w, h * 0.57));
        let mut diagonal = BezPath::new();
        diagonal.move_to((w * 0.35, h));
        diagonal.line_to((w * 0.37, h));
        diagonal.line_to((w * 0.92, 0.0));
        diagonal.line_to((w * 0.90, 0.0));
        diagonal.close_path();
        ctx.fill_path(&diagonal);
    })?;

    // Points of interest.
    comp.layer("fluor_pink", |ctx| {
        ctx.set_paint(density(255));
        for (cx, cy) in [(0.52, 0.30), (0.68, 0.62), (0.40, 0.78)] {
            let circle = Circle::new((w * cx, h * cy), w.min(h) * 0.015);
            ctx.fill_path(&circle.to_path(0.1));
        }
    })?;

    comp.composite().context("composite print run")?;
    comp.write_png(&args.out)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    println!(
        "wrote {} ({}x{}, seed {})",
        args.out.display(),
        args.width,
        args.height,
        args.seed
    );
    Ok(())
}
