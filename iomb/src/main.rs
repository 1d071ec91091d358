//! iomb CLI - work with DQI matrix literals
//!
//! ```bash
//! iomb parse dqi.txt                      # Normalise a matrix literal
//! iomb parse dqi.txt --format json        # Convert it to JSON
//! iomb rand --rows 3 --cols 4 --seed 7    # Random pedigree matrix
//! iomb aggregate dqi.txt weights.csv      # Collapse columns with weights
//! iomb weights weights.csv                # Show a parsed weight table
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use iomb::{
    aggregate_files, format_delimiter, parse_weights_bytes, AggregateOptions, DqiMatrix,
    SampleOptions,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "iomb")]
#[command(about = "Parse, sample and aggregate data quality indicator matrices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a matrix literal and print it
    Parse {
        /// Input file with a matrix literal
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Literal)]
        format: Format,
    },

    /// Generate a random matrix
    Rand {
        #[arg(long)]
        rows: usize,

        #[arg(long)]
        cols: usize,

        /// Scores per cell
        #[arg(long, default_value = "5")]
        arity: usize,

        /// Smallest score
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        low: i32,

        /// Largest score
        #[arg(long, default_value = "5", allow_hyphen_values = true)]
        high: i32,

        /// Seed for a reproducible matrix
        #[arg(long, env = "IOMB_SEED")]
        seed: Option<u64>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Literal)]
        format: Format,
    },

    /// Aggregate the columns of a matrix with a weight table
    Aggregate {
        /// Input file with a matrix literal
        matrix: PathBuf,

        /// Weight table CSV (row labels + one column per matrix column)
        weights: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Literal)]
        format: Format,

        /// Do not print progress to stderr
        #[arg(short, long)]
        quiet: bool,
    },

    /// Parse a weight table and print it as JSON
    Weights {
        /// Weight table CSV
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Bracketed matrix literal
    Literal,
    /// Pretty-printed JSON
    Json,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input,
            output,
            format,
        } => cmd_parse(&input, output.as_deref(), format),

        Commands::Rand {
            rows,
            cols,
            arity,
            low,
            high,
            seed,
            output,
            format,
        } => {
            let options = SampleOptions {
                arity,
                low,
                high,
                seed,
            };
            cmd_rand(rows, cols, &options, output.as_deref(), format)
        }

        Commands::Aggregate {
            matrix,
            weights,
            delimiter,
            output,
            format,
            quiet,
        } => {
            let options = AggregateOptions { delimiter, quiet };
            cmd_aggregate(&matrix, &weights, &options, output.as_deref(), format)
        }

        Commands::Weights {
            input,
            delimiter,
            output,
        } => cmd_weights(&input, delimiter, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(
    input: &Path,
    output: Option<&Path>,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing matrix: {}", input.display());

    let text = fs::read_to_string(input)?;
    let matrix = DqiMatrix::parse(&text)?;

    eprintln!("   Shape: {}x{}", matrix.rows(), matrix.cols());
    if let Some(arity) = matrix.arity() {
        eprintln!("   Arity: {}", arity);
    }

    write_matrix(&matrix, output, format)
}

fn cmd_rand(
    rows: usize,
    cols: usize,
    options: &SampleOptions,
    output: Option<&Path>,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!(
        "🎲 Sampling {}x{} matrix, {} scores in {}..={}",
        rows, cols, options.arity, options.low, options.high
    );

    let matrix = DqiMatrix::sample(rows, cols, options)?;
    write_matrix(&matrix, output, format)
}

fn cmd_aggregate(
    matrix: &Path,
    weights: &Path,
    options: &AggregateOptions,
    output: Option<&Path>,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = aggregate_files(matrix, weights, options)?;

    if !options.quiet {
        eprintln!("\n✨ Aggregated {} rows", report.aggregated.rows());
    }

    match format {
        Format::Literal => write_output(&report.aggregated.to_string(), output),
        Format::Json => write_output(&serde_json::to_string_pretty(&report)?, output),
    }
}

fn cmd_weights(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Reading weights: {}", input.display());

    let bytes = fs::read(input)?;
    let result = parse_weights_bytes(&bytes, delimiter)?;

    let (rows, cols) = result.table.shape();
    eprintln!("   Encoding: {}", result.encoding);
    let detected = if delimiter.is_none() {
        " (auto-detected)"
    } else {
        ""
    };
    eprintln!("   Delimiter: '{}'{}", format_delimiter(result.delimiter), detected);
    eprintln!("✅ Parsed {}x{} weights", rows, cols);

    let json = serde_json::to_string_pretty(&result.table)?;
    write_output(&json, output)
}

fn write_matrix(
    matrix: &DqiMatrix,
    output: Option<&Path>,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = match format {
        Format::Literal => matrix.to_string(),
        Format::Json => serde_json::to_string_pretty(matrix)?,
    };
    write_output(&content, output)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
