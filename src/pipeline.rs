use crate::classify::{classify, Classification, Cutoff, Score};
use crate::enrichment::EnrichmentSource;
use crate::error::{PathwayError, Result};
use crate::export::{export_table, ExportFormat};
use crate::frequency::{aggregate, unmatched_genes};
use crate::genes::{load_gene_matrix, write_gene_list, GENE_LIST_FILE};
use crate::heatmap::{clustermap, HeatmapConfig, PlotFormat};
use crate::types::FrequencyTable;
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default destination of the clustered heatmap
pub const DEFAULT_PLOT_FILE: &str = "pathway_clustermap.svg";

/// Everything one run needs, built once from the command line
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Gene presence/absence table (genes x isolates)
    pub gene_table: PathBuf,
    /// SmartTable file or folder; `None` only dumps the canonical gene list
    pub enrichment: Option<PathBuf>,
    /// Plot the accessory pathways instead of all pathways
    pub accessories: bool,
    /// Print core pathway names
    pub core: bool,
    /// Core cutoff as a fraction of the isolate count
    pub score: f64,
    /// Spreadsheet destination for the frequency table
    pub output: Option<PathBuf>,
    /// Heatmap destination; `None` disables plotting
    pub plot: Option<PathBuf>,
    pub heatmap: HeatmapConfig,
    /// Fail when pathway genes are missing from the gene table
    pub strict: bool,
    /// Where the canonical gene list goes when no enrichment data is given
    pub gene_list: PathBuf,
}

impl PipelineConfig {
    pub fn new(gene_table: impl Into<PathBuf>) -> Self {
        Self {
            gene_table: gene_table.into(),
            enrichment: None,
            accessories: false,
            core: false,
            score: 1.0,
            output: None,
            plot: Some(PathBuf::from(DEFAULT_PLOT_FILE)),
            heatmap: HeatmapConfig::default(),
            strict: false,
            gene_list: PathBuf::from(GENE_LIST_FILE),
        }
    }

    /// Checks parameters that can be rejected before any file is read
    pub fn validate(&self) -> Result<Score> {
        let score = Score::new(self.score)?;
        if let Some(output) = &self.output {
            ExportFormat::from_path(output)?;
        }
        if let Some(plot) = &self.plot {
            PlotFormat::from_path(plot)?;
        }
        Ok(score)
    }

    /// Files this run will write: the gene list without enrichment data,
    /// otherwise the spreadsheet and heatmap if requested
    pub fn output_paths(&self) -> Vec<&Path> {
        if self.enrichment.is_none() {
            return vec![self.gene_list.as_path()];
        }
        [self.output.as_deref(), self.plot.as_deref()]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// What a run produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No enrichment data: the canonical gene names were written out
    GeneList { path: PathBuf, genes: usize },
    /// Pathway frequencies and their core/accessory split
    Pathways {
        table: FrequencyTable,
        classification: Classification,
        plot: Option<PathBuf>,
    },
}

/// Runs the whole pipeline; core pathway names are printed to `out`.
///
/// # Errors
/// * `PathwayError::InvalidParameter` for a bad score or output extension,
///   raised before any pathway input is read
/// * `PathwayError::InvalidPath` if the enrichment path is neither a file nor a directory
/// * `PathwayError::UnmatchedGenes` in strict mode
/// * any read, parse or write error from the stages
pub fn run<W: Write>(config: &PipelineConfig, out: &mut W) -> Result<Outcome> {
    let Some(enrichment) = &config.enrichment else {
        let genes = load_gene_matrix(&config.gene_table)?;
        write_gene_list(&genes, &config.gene_list)?;
        return Ok(Outcome::GeneList {
            path: config.gene_list.clone(),
            genes: genes.n_genes(),
        });
    };

    let score = config.validate()?;
    let source = EnrichmentSource::resolve(enrichment)?;
    let pathways = source.load()?;
    let genes = load_gene_matrix(&config.gene_table)?;

    if config.strict {
        let missing = unmatched_genes(&genes, &pathways);
        if !missing.is_empty() {
            return Err(PathwayError::UnmatchedGenes {
                count: missing.len(),
                examples: missing.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
            });
        }
    }

    let table = aggregate(&genes, &pathways)?;
    let cutoff = Cutoff::new(table.isolates().len(), score);
    let classification = classify(&table, cutoff);

    if let Some(output) = &config.output {
        export_table(&table, output)?;
    }

    if config.core {
        info!("Printing core pathways");
        writeln!(out, "Core pathways:")?;
        for pathway in &classification.core {
            writeln!(out, "{}", pathway)?;
        }
    }

    let mut plot = None;
    if let Some(path) = &config.plot {
        let rendered = if config.accessories {
            info!("Plotting accessory pathways");
            clustermap(&table.subset(&classification.accessory), path, &config.heatmap)?
        } else {
            info!("Plotting all pathways");
            clustermap(&table, path, &config.heatmap)?
        };
        if rendered {
            plot = Some(path.clone());
        }
    }

    Ok(Outcome::Pathways {
        table,
        classification,
        plot,
    })
}
