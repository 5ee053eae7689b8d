// Clippy allows
#![allow(clippy::too_many_arguments)]

//! ggmat: gamma-gamma matrix toolkit
//!
//! Usage: ggmat <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process;

use ggmat::commands::{
    ConvertCommand, CutCommand, DumpCommand, GenerateCommand, GenerateConfig, ImportCommand,
    InfoCommand, ProjectCommand, RegionSpec, TransposeCommand,
};
use ggmat::cut::{CutAxis, Linear};
use ggmat::error::{MatrixError, Result};
use ggmat::matrix::{ElementKind, StorageVariant};
use ggmat::ErrorCode;

#[derive(Parser)]
#[command(name = "ggmat")]
#[command(version)]
#[command(about = "ggmat: gamma-gamma matrix toolkit - compressed storage, projection, transposition and cuts", long_about = None)]
struct Cli {
    /// Storage format for every matrix a command creates: raw, lc1 or lc2
    /// (default: lc2, or the source format for floating-point data)
    #[arg(long, global = true)]
    format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a matrix onto its row-sum and column-sum axes
    Project {
        /// Input matrix
        #[arg(short, long)]
        input: PathBuf,

        /// Row-sum output (one line of width `columns` per level)
        #[arg(short = 'x', long = "rows")]
        row_sum: Option<PathBuf>,

        /// Column-sum output (one line of width `lines` per level)
        #[arg(short = 'y', long = "cols")]
        col_sum: Option<PathBuf>,

        /// Print projection statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Transpose a matrix (lines become columns)
    Transpose {
        /// Input matrix
        #[arg(short, long)]
        input: PathBuf,

        /// Output matrix (may be the input)
        #[arg(short, long)]
        output: PathBuf,

        /// Print transposition statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Re-encode a matrix into another format or element kind
    Convert {
        /// Input matrix
        #[arg(short, long)]
        input: PathBuf,

        /// Output matrix (may be the input)
        #[arg(short, long)]
        output: PathBuf,

        /// Output element kind: int, float or double (default: input kind)
        #[arg(short, long)]
        kind: Option<String>,

        /// Write the transpose, reading the input column by column
        #[arg(long)]
        transpose: bool,

        /// Print conversion statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Show header fields and compression of a matrix
    Info {
        /// Input matrix
        input: PathBuf,

        /// Also report the total of every level
        #[arg(long)]
        totals: bool,
    },

    /// Cut a background-subtracted spectrum from a matrix
    Cut {
        /// Input matrix
        #[arg(short, long)]
        input: PathBuf,

        /// Cut region LOW:HIGH (repeatable)
        #[arg(short, long = "cut", required = true, allow_hyphen_values = true)]
        cut: Vec<String>,

        /// Background region LOW:HIGH (repeatable)
        #[arg(short, long = "bg", allow_hyphen_values = true)]
        bg: Vec<String>,

        /// Axis the regions select along: lines or columns
        #[arg(long, default_value = "lines")]
        axis: String,

        /// Matrix level to cut
        #[arg(short, long, default_value_t = 0)]
        level: u32,

        /// Calibration offset: channel = offset + gain * value
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset: f64,

        /// Calibration gain: channel = offset + gain * value
        #[arg(long, default_value_t = 1.0)]
        gain: f64,

        /// Spectrum name written in the output header
        #[arg(short, long, default_value = "cut")]
        name: String,

        /// Load the level into memory before cutting
        #[arg(long)]
        in_memory: bool,

        /// Print cut statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Write a matrix as tab-separated text
    Dump {
        /// Input matrix
        input: PathBuf,

        /// Dump only this level
        #[arg(short, long)]
        level: Option<u32>,

        /// Omit the shape comment line
        #[arg(long)]
        no_header: bool,

        /// Print dump statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Build a matrix from whitespace-separated text
    Import {
        /// Input text file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output matrix
        #[arg(short, long)]
        output: PathBuf,

        /// Element kind: int, float or double
        #[arg(short, long, default_value = "int")]
        kind: String,

        /// Print import statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Generate a synthetic symmetric coincidence matrix
    Generate {
        /// Output matrix
        #[arg(short, long)]
        output: PathBuf,

        /// Lines and columns of the square matrix
        #[arg(long, default_value_t = 512)]
        size: u32,

        /// Number of levels
        #[arg(long, default_value_t = 1)]
        levels: u32,

        /// Element kind: int, float or double
        #[arg(short, long, default_value = "int")]
        kind: String,

        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Transitions per cascade
        #[arg(long, default_value_t = 8)]
        gammas: usize,

        /// Height of the strongest coincidence peak
        #[arg(long, default_value_t = 1000.0)]
        peak_height: f64,

        /// Flat background per bin
        #[arg(long, default_value_t = 2.0)]
        background: f64,

        /// Print generation statistics to stderr
        #[arg(long)]
        stats: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Must be set before any matrix is created
    if let Some(format) = &cli.format {
        match StorageVariant::from_name(format) {
            Some(variant) => ggmat::config::set_default_variant(variant),
            None => {
                eprintln!("Error: invalid format '{}'. Use: raw, lc1, lc2", format);
                process::exit(ErrorCode::Unknown as i32);
            }
        }
    }

    let result = match cli.command {
        Commands::Project {
            input,
            row_sum,
            col_sum,
            stats,
        } => run_project(input, row_sum, col_sum, stats),

        Commands::Transpose {
            input,
            output,
            stats,
        } => run_transpose(input, output, stats),

        Commands::Convert {
            input,
            output,
            kind,
            transpose,
            stats,
        } => run_convert(input, output, kind, transpose, stats),

        Commands::Info { input, totals } => run_info(input, totals),

        Commands::Cut {
            input,
            cut,
            bg,
            axis,
            level,
            offset,
            gain,
            name,
            in_memory,
            stats,
        } => run_cut(
            input, cut, bg, axis, level, offset, gain, name, in_memory, stats,
        ),

        Commands::Dump {
            input,
            level,
            no_header,
            stats,
        } => run_dump(input, level, no_header, stats),

        Commands::Import {
            input,
            output,
            kind,
            stats,
        } => run_import(input, output, kind, stats),

        Commands::Generate {
            output,
            size,
            levels,
            kind,
            seed,
            gammas,
            peak_height,
            background,
            stats,
        } => run_generate(
            output,
            size,
            levels,
            kind,
            seed,
            gammas,
            peak_height,
            background,
            stats,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(e.code() as i32);
    }
}

fn parse_kind(kind: &str) -> Result<ElementKind> {
    ElementKind::from_name(kind).ok_or_else(|| {
        MatrixError::Format(format!(
            "Invalid kind '{}'. Use: int, float, double",
            kind
        ))
    })
}

fn run_project(
    input: PathBuf,
    row_sum: Option<PathBuf>,
    col_sum: Option<PathBuf>,
    stats: bool,
) -> Result<()> {
    let result = ProjectCommand::new().run(&input, row_sum.as_deref(), col_sum.as_deref())?;
    if stats {
        eprintln!("Project stats: {}", result);
    }
    Ok(())
}

fn run_transpose(input: PathBuf, output: PathBuf, stats: bool) -> Result<()> {
    let result = TransposeCommand::new().run(&input, &output)?;
    if stats {
        eprintln!("Transpose stats: {}", result);
    }
    Ok(())
}

fn run_convert(
    input: PathBuf,
    output: PathBuf,
    kind: Option<String>,
    transpose: bool,
    stats: bool,
) -> Result<()> {
    let mut cmd = ConvertCommand::new().with_transpose(transpose);
    if let Some(kind) = kind {
        cmd = cmd.with_kind(parse_kind(&kind)?);
    }
    let result = cmd.run(&input, &output)?;
    if stats {
        eprintln!("Convert stats: {}", result);
    }
    Ok(())
}

fn run_info(input: PathBuf, totals: bool) -> Result<()> {
    let summary = InfoCommand::new().with_totals(totals).run(&input)?;
    println!("{}", summary);
    Ok(())
}

fn run_cut(
    input: PathBuf,
    cut: Vec<String>,
    bg: Vec<String>,
    axis: String,
    level: u32,
    offset: f64,
    gain: f64,
    name: String,
    in_memory: bool,
    stats: bool,
) -> Result<()> {
    let axis = CutAxis::from_name(&axis).ok_or_else(|| {
        MatrixError::Format(format!("Invalid axis '{}'. Use: lines, columns", axis))
    })?;
    let cut = cut
        .iter()
        .map(|s| s.parse::<RegionSpec>())
        .collect::<Result<Vec<_>>>()?;
    let background = bg
        .iter()
        .map(|s| s.parse::<RegionSpec>())
        .collect::<Result<Vec<_>>>()?;

    let cmd = CutCommand {
        level,
        axis,
        cut,
        background,
        calibration: Linear {
            offset,
            slope: gain,
        },
        in_memory,
    };
    let (spectrum, result) = cmd.run(&input, &name)?;

    let stdout = io::stdout();
    spectrum.write_text(stdout.lock())?;
    if stats {
        eprintln!("Cut stats: {}", result);
    }
    Ok(())
}

fn run_dump(input: PathBuf, level: Option<u32>, no_header: bool, stats: bool) -> Result<()> {
    let stdout = io::stdout();
    let cmd = DumpCommand { level, no_header };
    let result = cmd.run(&input, stdout.lock())?;
    if stats {
        eprintln!("Dump stats: {}", result);
    }
    Ok(())
}

fn run_import(input: Option<PathBuf>, output: PathBuf, kind: String, stats: bool) -> Result<()> {
    let cmd = ImportCommand::new().with_kind(parse_kind(&kind)?);
    let result = match input {
        Some(path) if path.to_string_lossy() != "-" => cmd.run(&path, &output)?,
        _ => cmd.run_reader(io::stdin().lock(), &output)?,
    };
    if stats {
        eprintln!("Import stats: {}", result);
    }
    Ok(())
}

fn run_generate(
    output: PathBuf,
    size: u32,
    levels: u32,
    kind: String,
    seed: u64,
    gammas: usize,
    peak_height: f64,
    background: f64,
    stats: bool,
) -> Result<()> {
    let config = GenerateConfig {
        size,
        levels,
        kind: parse_kind(&kind)?,
        seed,
        gammas,
        peak_height,
        background,
        ..Default::default()
    };
    let result = GenerateCommand::new(config).run(&output)?;
    if stats {
        eprintln!("Generate stats: {}", result);
    }
    Ok(())
}
