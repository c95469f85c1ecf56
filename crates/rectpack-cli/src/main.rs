use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rectpack_core::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "rectpack",
    about = "Replay rectangle placements through a free-rectangle tracker",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Commit the placements of a layout file in order and print the free rectangles
    Replay(ReplayArgs),
    /// Simple timing bench over seeded, disjoint grid placements
    Bench(BenchArgs),
}

#[derive(Args, Debug, Clone)]
struct TrackerArgs {
    /// YAML config file path (tracker options)
    #[arg(long, help_heading = "Tracker")]
    config: Option<PathBuf>,
    /// Pruning strategy: sweep | staged
    #[arg(long, help_heading = "Tracker")]
    prune: Option<String>,
    /// Verify free-list invariants after every placement
    #[arg(long, default_value_t = false, help_heading = "Tracker")]
    verify: bool,
    /// Compute the containment sweep in parallel (requires the "parallel" feature)
    #[arg(long, default_value_t = false, help_heading = "Tracker")]
    parallel: bool,
    /// Print the effective tracker config and exit
    #[arg(long, default_value_t = false, help_heading = "Tracker")]
    print_config: bool,
    /// Format for --print-config: json|yaml
    #[arg(long, default_value = "json", help_heading = "Tracker")]
    print_config_format: String,
}

#[derive(Parser, Debug, Clone)]
struct ReplayArgs {
    /// Layout file (JSON or YAML): { bin, placements, tracker? }
    #[arg(help_heading = "Input/Output")]
    layout: PathBuf,
    /// Write the result here instead of stdout
    #[arg(short, long, help_heading = "Input/Output")]
    out: Option<PathBuf>,
    /// Output format: json|yaml
    #[arg(long, default_value = "json", help_heading = "Input/Output")]
    format: String,
    /// Coordinate type of the layout: int|real
    #[arg(long, default_value = "int", help_heading = "Input/Output")]
    coords: String,
    /// Record the free rectangles after every placement
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    steps: bool,
    #[command(flatten)]
    tracker: TrackerArgs,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Square bin side length
    #[arg(long, default_value_t = 1024)]
    size: u32,
    /// Grid cell side length; one placement is generated per cell
    #[arg(long, default_value_t = 32)]
    cell: u32,
    /// RNG seed for placement sizes, offsets and order
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[command(flatten)]
    tracker: TrackerArgs,
}

/// Placements to replay against a single bin.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct LayoutFile<T> {
    bin: Rect<T>,
    #[serde(default)]
    placements: Vec<Rect<T>>,
    #[serde(default)]
    tracker: Option<TrackerConfig>,
}

#[derive(Debug, Serialize)]
struct StepRecord<T> {
    step: usize,
    placed: Rect<T>,
    report: PlaceReport,
    free: Vec<Rect<T>>,
}

#[derive(Debug, Serialize)]
struct ReplayOutput<T> {
    bin: Rect<T>,
    placements: usize,
    free: Vec<Rect<T>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    steps: Vec<StepRecord<T>>,
}

#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    prune: Option<String>,
    verify_invariants: Option<bool>,
    parallel: Option<bool>,
    parallel_threshold: Option<usize>,
}

impl YamlConfig {
    fn into_tracker_config(self, mut cfg: TrackerConfig) -> anyhow::Result<TrackerConfig> {
        if let Some(v) = self.prune {
            cfg.prune = parse_prune(&v)?;
        }
        if let Some(v) = self.verify_invariants {
            cfg.verify_invariants = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        if let Some(v) = self.parallel_threshold {
            cfg.parallel_threshold = v;
        }
        Ok(cfg)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Replay(args) => run_replay(args, cli.progress && !cli.quiet),
        Commands::Bench(b) => run_bench(b),
    }
}

fn run_replay(args: &ReplayArgs, show_progress: bool) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.layout)
        .with_context(|| format!("read layout {}", args.layout.display()))?;
    let yaml = is_yaml(&args.layout);
    match args.coords.to_ascii_lowercase().as_str() {
        "int" | "u32" => replay::<u32>(args, &text, yaml, show_progress),
        "real" | "f64" => replay::<f64>(args, &text, yaml, show_progress),
        other => anyhow::bail!("unknown coordinate type: {}", other),
    }
}

fn replay<T>(args: &ReplayArgs, text: &str, yaml: bool, show_progress: bool) -> anyhow::Result<()>
where
    T: Coord + Serialize + DeserializeOwned,
{
    let layout: LayoutFile<T> = if yaml {
        serde_yaml::from_str(text).context("parse YAML layout")?
    } else {
        serde_json::from_str(text).context("parse JSON layout")?
    };
    let cfg = resolve_config(&args.tracker, layout.tracker.clone())?;
    if args.tracker.print_config {
        return print_config(&cfg, &args.tracker.print_config_format);
    }

    let mut tracker = FreeRectManager::with_config(layout.bin, cfg)?;
    info!(placements = layout.placements.len(), "loaded layout");

    let bar = progress_bar(layout.placements.len(), show_progress)?;
    let mut steps = Vec::new();
    let mut peak = tracker.len();
    let start = Instant::now();
    for (i, p) in layout.placements.iter().enumerate() {
        let report = tracker
            .place_rect(p)
            .with_context(|| format!("placement #{} {:?}", i, p))?;
        if report.is_noop() {
            warn!(index = i, placed = ?p, "placement left the free space unchanged");
        }
        peak = peak.max(report.after_split);
        if args.steps {
            steps.push(StepRecord {
                step: i,
                placed: *p,
                report,
                free: tracker.as_slice().to_vec(),
            });
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!(
        free = tracker.len(),
        peak,
        time = %fmt_dur(start.elapsed()),
        "replay finished"
    );

    let out = ReplayOutput {
        bin: tracker.root(),
        placements: tracker.placements(),
        free: tracker.as_slice().to_vec(),
        steps,
    };
    write_output(&out, &args.format, args.out.as_deref())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(&b.tracker, None)?;
    if b.tracker.print_config {
        return print_config(&cfg, &b.tracker.print_config_format);
    }
    let placements = grid_placements(b.size, b.cell, b.seed)?;
    debug!(count = placements.len(), "generated placements");

    let start = Instant::now();
    let mut tracker = FreeRectManager::with_config(Rect::new(0, 0, b.size, b.size), cfg)?;
    let mut peak = tracker.len();
    for p in &placements {
        let report = tracker.place_rect(p)?;
        peak = peak.max(report.after_split);
    }
    let dur = start.elapsed();
    println!(
        "placements={} free={} peak={} prune={:?} time={}",
        placements.len(),
        tracker.len(),
        peak,
        tracker.config().prune,
        fmt_dur(dur)
    );
    Ok(())
}

/// One random sub-rectangle per `cell x cell` grid cell, shuffled. Disjoint by construction.
fn grid_placements(size: u32, cell: u32, seed: u64) -> anyhow::Result<Vec<Rect>> {
    if cell == 0 || cell > size {
        anyhow::bail!("cell ({}) must be in 1..={}", cell, size);
    }
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let per_side = size / cell;
    let mut out = Vec::with_capacity(grid_cell_count(size, cell));
    for cy in 0..per_side {
        for cx in 0..per_side {
            let w = rng.gen_range(1..=cell);
            let h = rng.gen_range(1..=cell);
            let x = cx * cell + rng.gen_range(0..=cell - w);
            let y = cy * cell + rng.gen_range(0..=cell - h);
            out.push(Rect::new(x, y, w, h));
        }
    }
    out.shuffle(&mut rng);
    Ok(out)
}

/// Number of whole `cell x cell` cells in a `size x size` bin.
fn grid_cell_count(size: u32, cell: u32) -> usize {
    let per_side = (size / cell) as usize;
    per_side * per_side
}

/// Layout defaults, then the YAML config file, then command-line flags.
fn resolve_config(
    args: &TrackerArgs,
    from_layout: Option<TrackerConfig>,
) -> anyhow::Result<TrackerConfig> {
    let mut cfg = from_layout.unwrap_or_default();
    if let Some(path) = &args.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        cfg = y.into_tracker_config(cfg)?;
    }
    if let Some(p) = &args.prune {
        cfg.prune = parse_prune(p)?;
    }
    if args.verify {
        cfg.verify_invariants = true;
    }
    if args.parallel {
        if cfg!(not(feature = "parallel")) {
            warn!("--parallel has no effect without the \"parallel\" feature");
        }
        cfg.parallel = true;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn parse_prune(s: &str) -> anyhow::Result<PruneStrategy> {
    match s.parse() {
        Ok(p) => Ok(p),
        Err(()) => anyhow::bail!("unknown prune strategy: {}", s),
    }
}

fn print_config(cfg: &TrackerConfig, format: &str) -> anyhow::Result<()> {
    match format {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(())
}

fn write_output<S: Serialize>(value: &S, format: &str, out: Option<&Path>) -> anyhow::Result<()> {
    let text = match format.to_ascii_lowercase().as_str() {
        "json" => serde_json::to_string_pretty(value)?,
        "yaml" => serde_yaml::to_string(value)?,
        other => anyhow::bail!("unknown output format: {}", other),
    };
    match out {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("create out dir {}", dir.display()))?;
            }
            fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "wrote free rectangles");
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn progress_bar(len: usize, show: bool) -> anyhow::Result<Option<indicatif::ProgressBar>> {
    use indicatif::{ProgressBar, ProgressStyle};
    if !show || len < 1000 {
        return Ok(None);
    }
    let b = ProgressBar::new(len as u64);
    b.set_style(ProgressStyle::with_template(
        "{spinner:.green} placing {pos}/{len} [{elapsed_precise}] {wide_msg}",
    )?);
    Ok(Some(b))
}

fn is_yaml(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref(),
        Some("yaml" | "yml")
    )
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
