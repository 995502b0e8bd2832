use crate::error::{PathwayError, Result};
use crate::types::PathwayGeneSet;
use log::{debug, info};
use polars::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// SmartTable column listing the genes matched to a pathway
pub const MATCHES_COLUMN: &str = "Matches";

/// Separator between gene names inside a `Matches` cell
pub const MATCH_SEPARATOR: &str = " // ";

/// Where pathway enrichment data comes from, resolved once from a user path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentSource {
    /// A single SmartTable file
    SingleFile(PathBuf),
    /// A folder searched recursively for `Enrich*.txt` SmartTables
    Directory(PathBuf),
}

impl EnrichmentSource {
    /// Classifies `path` as a file or directory.
    ///
    /// # Errors
    /// * `PathwayError::InvalidPath` if the path is neither
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Ok(EnrichmentSource::Directory(path.to_path_buf()))
        } else if path.is_file() {
            Ok(EnrichmentSource::SingleFile(path.to_path_buf()))
        } else {
            Err(PathwayError::InvalidPath(path.to_path_buf()))
        }
    }

    /// Loads the pathway gene sets behind this source
    pub fn load(&self) -> Result<PathwayGeneSet> {
        match self {
            EnrichmentSource::SingleFile(path) => {
                info!("File path given, reading {}", path.display());
                read_smart_table(path)
            }
            EnrichmentSource::Directory(dir) => {
                info!(
                    "Folder path given, merging enrichment files under {}",
                    dir.display()
                );
                read_enrichment_dir(dir)
            }
        }
    }
}

/// Splits a `Matches` cell into gene names, dropping empty tokens
pub fn split_matches(cell: &str) -> impl Iterator<Item = &str> {
    cell.split(MATCH_SEPARATOR).filter(|gene| !gene.is_empty())
}

/// Reads one SmartTable of enriched pathways.
///
/// The first column names the pathway and the `Matches` column lists its
/// genes separated by `" // "`. Repeated pathway rows are unioned.
///
/// # Errors
/// * `PathwayError::MissingColumn` if there is no `Matches` column
/// * `PathwayError::Polars` if the table cannot be parsed
pub fn read_smart_table(path: impl AsRef<Path>) -> Result<PathwayGeneSet> {
    let path = path.as_ref();
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(b'\t')
        .with_quote_char(None)
        .with_infer_schema_length(Some(0))
        .with_truncate_ragged_lines(true)
        .finish()?
        .collect()?;

    let pathway_column = df
        .get_column_names()
        .first()
        .map(|name| name.to_string())
        .ok_or_else(|| PathwayError::InvalidFileFormat(format!("{} is empty", path.display())))?;

    let pathways = df.column(&pathway_column)?.str()?;
    let matches = df
        .column(MATCHES_COLUMN)
        .map_err(|_| PathwayError::missing_column(MATCHES_COLUMN, path))?
        .str()?;

    let mut gene_sets = PathwayGeneSet::new();
    for (pathway, cell) in pathways.into_iter().zip(matches.into_iter()) {
        let Some(pathway) = pathway else { continue };
        gene_sets.insert(pathway, split_matches(cell.unwrap_or_default()));
    }

    debug!("{}: {} pathways", path.display(), gene_sets.len());
    Ok(gene_sets)
}

/// True for file names of the form `Enrich*.txt`
pub fn is_enrichment_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.starts_with("Enrich") && name.ends_with(".txt"))
}

/// Lists `Enrich*.txt` files below `dir`, recursively and in sorted order
pub fn find_enrichment_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() && is_enrichment_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(PathwayError::NoEnrichmentFiles(dir.to_path_buf()));
    }
    Ok(files)
}

/// Reads and merges every enrichment file below `dir`
pub fn read_enrichment_dir(dir: impl AsRef<Path>) -> Result<PathwayGeneSet> {
    let files = find_enrichment_files(dir)?;

    let mut merged = PathwayGeneSet::new();
    for file in &files {
        debug!("Reading {}", file.display());
        merged.merge(read_smart_table(file)?);
    }

    info!(
        "{} enrichment files merged into {} pathways",
        files.len(),
        merged.len()
    );
    Ok(merged)
}
