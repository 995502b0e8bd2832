use clap::Parser;
use log::{error, info};
use pangenome_pathways::error::PathwayError;
use pangenome_pathways::genes::GENE_LIST_FILE;
use pangenome_pathways::heatmap::HeatmapConfig;
use pangenome_pathways::pipeline::{self, Outcome, PipelineConfig, DEFAULT_PLOT_FILE};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(thiserror::Error, Debug)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Pipeline(#[from] PathwayError),
}

#[derive(Parser)]
#[command(
    name = "pathway-map",
    about = "Plots a cluster map of enriched pathways across pangenome isolates",
    long_about = "Combines a Roary gene presence/absence table with BioCyc SmartTables of enriched \
                  pathways. For every pathway the presence of its genes is counted per isolate and \
                  normalised into a frequency, which is drawn as a clustered heatmap, split into \
                  core and accessory pathways, and optionally exported to a spreadsheet. \
                  Without a SmartTable the canonical gene names are written to a text file instead.",
    version,
    after_help = "Example usage:\n    \
                  pathway-map gene_presence_absence.Rtab -s SmartTables/ --core --score 0.95\n    \
                  pathway-map gene_presence_absence.Rtab -s Enrichment.txt -a --output pathways.xlsx\n    \
                  pathway-map gene_presence_absence.Rtab",
    color = clap::ColorChoice::Always
)]
#[derive(Debug)]
struct Args {
    /// File path for Roary gene presence/absence data (tab-delimited, genes x isolates)
    #[arg(value_name = "ROARY_FILE")]
    roary_file: PathBuf,

    /// File or folder path for SmartTables of enriched pathways.
    /// Folders are searched recursively for Enrich*.txt files
    #[arg(short = 's', long = "SmartTable", visible_alias = "smart-table", value_name = "PATH")]
    smart_table: Option<PathBuf>,

    /// Show accessory pathways only
    #[arg(short, long)]
    accessories: bool,

    /// Print core pathways
    #[arg(short, long)]
    core: bool,

    /// Cutoff score (0 <= score <= 1) deciding whether a pathway is core or accessory
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    score: f64,

    /// Output pathway frequencies to an Excel file (.xlsx), or .csv/.tsv
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path for the clustered heatmap (.svg, or .png with the png feature)
    #[arg(long, value_name = "FILE", default_value = DEFAULT_PLOT_FILE)]
    plot: PathBuf,

    /// Skip drawing the heatmap
    #[arg(long)]
    no_plot: bool,

    /// Heatmap width in pixels
    #[arg(long, default_value = "1200")]
    width: u32,

    /// Heatmap height in pixels
    #[arg(long, default_value = "900")]
    height: u32,

    /// Heatmap title
    #[arg(long)]
    title: Option<String>,

    /// Where to write canonical gene names when no SmartTable is given
    #[arg(long, value_name = "FILE", default_value = GENE_LIST_FILE)]
    gene_list: PathBuf,

    /// Fail if a pathway gene is missing from the Roary table instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            gene_table: self.roary_file,
            enrichment: self.smart_table,
            accessories: self.accessories,
            core: self.core,
            score: self.score,
            output: self.output,
            plot: (!self.no_plot).then_some(self.plot),
            heatmap: HeatmapConfig {
                width: self.width,
                height: self.height,
                title: self.title,
            },
            strict: self.strict,
            gene_list: self.gene_list,
        }
    }
}

fn create_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn run(config: PipelineConfig) -> Result<(), MapError> {
    if config.enrichment.is_some() {
        config.validate()?;
    }

    // Create output directories if they don't exist
    for path in config.output_paths() {
        create_parent_dir(path)?;
    }

    let stdout = io::stdout();
    match pipeline::run(&config, &mut stdout.lock())? {
        Outcome::GeneList { path, genes } => {
            info!("{} canonical genes written to {}", genes, path.display());
        }
        Outcome::Pathways {
            table,
            classification,
            plot,
        } => {
            info!(
                "{} pathways across {} isolates ({} core, {} accessory)",
                table.len(),
                table.isolates().len(),
                classification.core.len(),
                classification.accessory.len()
            );
            if let Some(plot) = plot {
                info!("Cluster map saved to {}", plot.display());
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let start_time = std::time::Instant::now();

    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(args.into_config()) {
        Ok(()) => {
            info!(
                "Total execution time: {:.2} seconds",
                start_time.elapsed().as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
