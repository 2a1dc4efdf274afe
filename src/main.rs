use aps_graph::config::load_config;
use aps_graph::graph::bucketer::TimeResolution;
use aps_graph::logger::{self, init_logger, FileLogger, StdoutLogger};
use aps_graph::pipeline::{run_build, run_year_merge, GraphKind};
use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Parser)]
#[command(name = "aps-graph")]
#[command(about = "APS Corpus Graph Builder", long_about = None)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = "config.json")]
    config: String,

    /// Override the works metadata root
    #[arg(long)]
    works_dir: Option<String>,

    /// Override the citation CSV path
    #[arg(long)]
    citation_csv: Option<String>,

    /// Override the output directory
    #[arg(long)]
    output: Option<String>,

    /// Log to a versioned build_N.log under this directory instead of stdout
    #[arg(long)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build per-period graph files from the corpus
    Build {
        /// Bucketing resolution ("year" or "month")
        #[arg(short, long, default_value = "year")]
        resolution: TimeResolution,

        /// Graphs to build (e.g., "coauthorship", "citation")
        #[arg(short, long, value_delimiter = ',', num_args = 1..,
              default_values_t = [GraphKind::Coauthorship, GraphKind::Citation])]
        graphs: Vec<GraphKind>,
    },
    /// Merge month-resolution graph files into yearly files
    MergeYears {
        /// Graphs to merge
        #[arg(short, long, value_delimiter = ',', num_args = 1..,
              default_values_t = [GraphKind::Coauthorship, GraphKind::Citation])]
        graphs: Vec<GraphKind>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.log_dir {
        Some(dir) => init_logger(FileLogger::create(Path::new(dir))?),
        None => init_logger(StdoutLogger),
    }

    // Load config, applying CLI path overrides
    let mut config = load_config(&cli.config)?;
    if let Some(works_dir) = cli.works_dir {
        config.corpus.works_dir = works_dir;
    }
    if let Some(citation_csv) = cli.citation_csv {
        config.corpus.citation_csv = citation_csv;
    }
    if let Some(output) = cli.output {
        config.output.dir = output;
    }

    match cli.command {
        Commands::Build { resolution, graphs } => {
            logger::info(&format!(
                "starting {} build for: {:?}",
                resolution,
                graphs.iter().map(|g| g.to_string()).collect::<Vec<_>>()
            ));
            let report = run_build(&config, &graphs, resolution)?;
            let total_files: usize = report.graph_files.iter().map(|(_, f)| f.len()).sum();
            logger::info(&format!(
                "build complete: {} buckets, {} graph files",
                report.summary.buckets, total_files
            ));
        }
        Commands::MergeYears { graphs } => {
            let merged = run_year_merge(&config, &graphs)?;
            logger::info(&format!("year merge complete: {} files", merged.len()));
        }
    }

    Ok(())
}
