//! cqm command-line interface

use anyhow::Result;
use clap::{Parser, Subcommand};
use cqm::cli::{dependencies, diff, load, logic, normalize, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Clinical quality measure tool
#[derive(Parser)]
#[command(name = "cqm")]
#[command(author, version, about = "Clinical quality measure logic tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, pretty, table)
    #[arg(short = 'f', long, global = true)]
    format: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve statement dependencies across ELM libraries
    Dependencies {
        /// ELM JSON files
        files: Vec<PathBuf>,

        /// Name of the measure's main library
        #[arg(short, long)]
        main: String,

        /// Also report the complexity of the main library's statements
        #[arg(short, long)]
        complexity: bool,

        /// Maximum statement resolution depth
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Render the population logic of an HQMF measure
    Logic {
        /// HQMF measure JSON file
        measure: PathBuf,

        /// Value set catalogue JSON file
        #[arg(long)]
        value_sets: Option<PathBuf>,

        /// ELM JSON files providing direct reference codes
        #[arg(long)]
        elm: Vec<PathBuf>,
    },

    /// Diff the population logic of two measure versions
    Diff {
        /// Current version
        current: PathBuf,

        /// Version to compare against
        other: PathBuf,

        /// Diff population by population
        #[arg(short = 'p', long)]
        by_population: bool,

        /// Inputs are rendered logic JSON instead of HQMF measures
        #[arg(long)]
        logic_json: bool,

        /// Value set catalogue JSON file
        #[arg(long)]
        value_sets: Option<PathBuf>,
    },

    /// Assign direct reference code ids to inline-coded data criteria
    Normalize {
        /// HQMF measure JSON file
        measure: PathBuf,

        /// ELM JSON files
        elm: Vec<PathBuf>,

        /// Print the assignments instead of the measure
        #[arg(short, long)]
        summary: bool,
    },

    /// Run the whole measure load and print every derived artifact
    Load {
        /// ELM JSON files
        elm: Vec<PathBuf>,

        /// Name of the measure's main library
        #[arg(short, long)]
        main: String,

        /// HQMF measure JSON file
        #[arg(long)]
        measure: Option<PathBuf>,

        /// Value set catalogue JSON file
        #[arg(long)]
        value_sets: Option<PathBuf>,

        /// Component measure JSON files of a composite measure
        #[arg(long = "component")]
        components: Vec<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let format: Option<output::OutputFormat> = cli.format.as_deref().map(str::parse).transpose()?;

    match cli.command {
        Commands::Dependencies {
            files,
            main,
            complexity,
            max_depth,
        } => dependencies::run(dependencies::DependenciesConfig {
            files,
            main,
            complexity,
            max_depth,
            format,
            output_file: cli.output,
        }),

        Commands::Logic {
            measure,
            value_sets,
            elm,
        } => logic::run(logic::LogicConfig {
            measure,
            value_sets,
            elm,
            format,
            output_file: cli.output,
        }),

        Commands::Diff {
            current,
            other,
            by_population,
            logic_json,
            value_sets,
        } => diff::run(diff::DiffConfig {
            current,
            other,
            by_population,
            logic_json,
            value_sets,
            format,
            output_file: cli.output,
        }),

        Commands::Normalize {
            measure,
            elm,
            summary,
        } => normalize::run(normalize::NormalizeConfig {
            measure,
            elm,
            summary,
            format,
            output_file: cli.output,
        }),

        Commands::Load {
            elm,
            main,
            measure,
            value_sets,
            components,
        } => load::run(load::LoadConfig {
            elm,
            main,
            measure,
            value_sets,
            components,
            verbose: cli.verbose,
            format,
            output_file: cli.output,
        }),
    }
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
