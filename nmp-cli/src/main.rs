use anyhow::Result;
use clap::{Parser, Subcommand};
use nmp::LookupMode;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::PackOptions;

/// UK postcode lookup CLI tool
#[derive(Parser)]
#[command(name = "nmp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the postcode pack file
    #[arg(short, long, env = "NMP_PACK", global = true)]
    pack: Option<PathBuf>,

    /// How postcode prefixes map to buckets: compatible or strict
    #[arg(
        long,
        env = "NMP_LOOKUP_MODE",
        default_value = "compatible",
        global = true
    )]
    lookup_mode: LookupMode,

    /// Only report warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Report timing and per-step detail
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the coordinates of a single postcode
    Lookup {
        /// Postcode without spaces between the parts (e.g., SW1A1AA or M1)
        postcode: String,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,

        /// Output result as a GeoJSON Feature
        #[arg(short, long, conflicts_with = "json")]
        geojson: bool,
    },

    /// Look up every postcode in a CSV file
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Output file (defaults to <input>_located.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column holding the postcodes
        #[arg(long, default_value = "postcode")]
        postcode_col: String,
    },

    /// Display information about the pack
    Info,

    /// Great-circle distance between two postcodes or "lat,lon" points
    Distance {
        /// First point
        from: String,

        /// Second point
        to: String,
    },

    /// Sort CSV rows by distance from a postcode or "lat,lon" point
    Sort {
        /// Input CSV file
        input: PathBuf,

        /// Reference point
        #[arg(long)]
        from: String,

        /// Column name for latitude
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude
        #[arg(long, default_value = "lon")]
        lon_col: String,

        /// Output file (defaults to <input>_sorted.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List every record in one prefix bucket
    Dump {
        /// One or two character prefix (e.g., SW or B)
        prefix: String,

        /// Output one JSON object per line
        #[arg(short, long)]
        json: bool,
    },
}

fn init_tracing(quiet: bool, verbose: bool) {
    let default_filter = if verbose {
        "nmp_cli=debug"
    } else if quiet {
        "nmp_cli=warn"
    } else {
        "nmp_cli=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let options = PackOptions {
        path: cli.pack,
        lookup_mode: cli.lookup_mode,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Lookup {
            postcode,
            json,
            geojson,
        } => commands::lookup::run(&options, &postcode, json, geojson),
        Commands::Batch {
            input,
            output,
            postcode_col,
        } => commands::batch::run(&options, input, output, &postcode_col),
        Commands::Info => commands::info::run(&options),
        Commands::Distance { from, to } => commands::distance::run(&options, &from, &to),
        Commands::Sort {
            input,
            from,
            lat_col,
            lon_col,
            output,
        } => commands::sort::run(&options, input, &from, &lat_col, &lon_col, output),
        Commands::Dump { prefix, json } => commands::dump::run(&options, &prefix, json),
    }
}
