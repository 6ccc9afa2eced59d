use crate::motif::MotifClass;
use crate::scan::Backend;
use crate::utils::{GenomicRegion, Result};
use crate::workflows::parse_class_value;
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Parser, Subcommand, ValueEnum};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="nbdscan",
          author="nbdscan developers",
          version=&**FULL_VERSION,
          long_about = None,
          disable_help_subcommand = true,
          after_help = format!("Copyright (C) 2023-{}     nbdscan developers
This program comes with ABSOLUTELY NO WARRANTY; scores are heuristic
propensity estimates, not structure predictions.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{author}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Non-B DNA Motif Scanner")]
    Scan(ScanArgs),
    #[clap(about = "Motif Class Taxonomy")]
    Classes(ClassesArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendArg {
    Auto,
    Automaton,
    Reference,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => Backend::Auto,
            BackendArg::Automaton => Backend::Automaton,
            BackendArg::Reference => Backend::Reference,
        }
    }
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("targets").args(["region", "regions_path"])))]
#[command(arg_required_else_help(true))]
pub struct ScanArgs {
    #[clap(required = true)]
    #[clap(short = 'g')]
    #[clap(long = "genome")]
    #[clap(help = "Path to indexed FASTA file")]
    #[clap(value_name = "FASTA")]
    #[arg(value_parser = check_file_exists)]
    pub genome_path: PathBuf,

    #[clap(short = 'r')]
    #[clap(long = "region")]
    #[clap(help = "Scan a single region (chr:start-end)")]
    #[clap(value_name = "REGION")]
    #[arg(value_parser = region_from_string)]
    pub region: Option<GenomicRegion>,

    #[clap(short = 'b')]
    #[clap(long = "regions")]
    #[clap(help = "BED file with regions to scan")]
    #[clap(value_name = "BED")]
    #[arg(value_parser = check_file_exists)]
    pub regions_path: Option<PathBuf>,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of detector threads (default: one per detector, up to the core count)")]
    #[clap(value_name = "THREADS")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: Option<usize>,

    #[clap(long = "nonoverlap")]
    #[clap(help = "Resolve overlaps into a near-independent motif set")]
    pub nonoverlap: bool,

    #[clap(long = "hotspots")]
    #[clap(help = "Report motif-dense hotspot regions")]
    pub report_hotspots: bool,

    #[clap(long = "no-hybrids")]
    #[clap(help = "Do not report class-overlap hybrid regions")]
    pub no_hybrids: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-score")]
    #[clap(value_name = "CLASS=SCORE")]
    #[clap(help = "Minimum normalized score for a class (repeatable)")]
    #[arg(value_parser = class_score_from_string)]
    pub min_scores: Vec<(MotifClass, f64)>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-length")]
    #[clap(value_name = "CLASS=LENGTH")]
    #[clap(help = "Minimum motif length for a class (repeatable)")]
    #[arg(value_parser = parse_class_value::<usize>)]
    pub min_lengths: Vec<(MotifClass, usize)>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "merge-distance")]
    #[clap(value_name = "BP")]
    #[clap(help = "Largest gap between near-duplicate motifs of one subclass")]
    #[clap(default_value = "10")]
    pub merge_distance: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "overlap-budget")]
    #[clap(value_name = "FRAC")]
    #[clap(help = "Largest fraction of a motif that may overlap other classes")]
    #[clap(default_value = "0.5")]
    #[arg(value_parser = ensure_unit_float)]
    pub overlap_budget: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "hotspot-window")]
    #[clap(value_name = "BP")]
    #[clap(help = "Window size for hotspot detection")]
    #[clap(default_value = "100")]
    pub hotspot_window: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "chunk-size")]
    #[clap(value_name = "BP")]
    #[clap(help = "Size of the chunks long sequences are scanned in")]
    #[clap(default_value = "100000")]
    pub chunk_size: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "chunk-overlap")]
    #[clap(value_name = "BP")]
    #[clap(help = "Overlap between consecutive chunks")]
    #[clap(default_value = "1000")]
    pub chunk_overlap: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "detector-timeout")]
    #[clap(value_name = "SECONDS")]
    #[clap(help = "Abandon a detector after this many seconds on one chunk")]
    pub detector_timeout: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "backend")]
    #[clap(value_name = "BACKEND")]
    #[clap(help = "Literal matching backend")]
    #[clap(value_enum, default_value = "auto")]
    pub backend: BackendArg,
}

#[derive(Parser, Debug)]
pub struct ClassesArgs {
    #[clap(long = "subclasses")]
    #[clap(help = "List every subclass with its taxonomy code")]
    pub subclasses: bool,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn region_from_string(s: &str) -> Result<GenomicRegion> {
    GenomicRegion::from_string(s)
}

fn ensure_unit_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "The value must be between 0.0 and 1.0, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}

fn class_score_from_string(s: &str) -> Result<(MotifClass, f64)> {
    let (class, score) = parse_class_value::<f64>(s)?;
    if !(0.0..=1.0).contains(&score) {
        return Err(format!("The score must be between 0.0 and 1.0, got: {}", score));
    }
    Ok((class, score))
}
