use crate::error::{PathwayError, Result};
use crate::types::GeneMatrix;
use log::{debug, info};
use ndarray::Array2;
use polars::prelude::*;
use regex::Regex;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

/// Default file name for the canonical gene list
pub const GENE_LIST_FILE: &str = "roarygenes.txt";

/// Copy-number style suffixes Roary appends to gene names ("abcA_2", "recA2")
static NUMERIC_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_\d+|\d+$").expect("suffix pattern is valid"));

/// Strips the numeric suffix from a raw gene identifier.
///
/// Everything from the first `_<digits>` group, or from trailing digits, is
/// removed. An identifier that consists only of such a suffix is kept as is.
///
/// # Example
/// ```
/// use pangenome_pathways::genes::canonical_gene_name;
///
/// assert_eq!(canonical_gene_name("abcA_1"), "abcA");
/// assert_eq!(canonical_gene_name("recA2"), "recA");
/// assert_eq!(canonical_gene_name("dnaK"), "dnaK");
/// ```
pub fn canonical_gene_name(id: &str) -> String {
    match NUMERIC_SUFFIX.find(id) {
        Some(m) if m.start() > 0 => id[..m.start()].to_string(),
        _ => id.to_string(),
    }
}

/// Reads a tab-delimited gene presence/absence table into a DataFrame.
///
/// The first column holds gene identifiers, every other column one isolate.
/// All columns are read as text; [`canonicalize`] converts the isolate columns.
///
/// # Errors
/// * `PathwayError::Io` if the file does not exist or cannot be read
/// * `PathwayError::Polars` if the table cannot be parsed
pub fn read_gene_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    fs::metadata(path)?;

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(b'\t')
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;

    debug!("{}: {} rows x {} columns", path.display(), df.height(), df.width());
    Ok(df)
}

/// Collapses gene rows that share a canonical name.
///
/// Rows are grouped by [`canonical_gene_name`] of the first column and each
/// isolate column is reduced with `max`, so a canonical gene is present in an
/// isolate if any of its numbered variants is. Missing cells count as absent.
///
/// # Errors
/// * `PathwayError::InvalidFileFormat` if there are no isolate columns or an
///   isolate column is not numeric
pub fn canonicalize(raw: &DataFrame) -> Result<GeneMatrix> {
    let names: Vec<String> = raw
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let (id_column, isolates) = names
        .split_first()
        .ok_or_else(|| PathwayError::InvalidFileFormat("gene table has no columns".into()))?;
    if isolates.is_empty() {
        return Err(PathwayError::InvalidFileFormat(
            "gene table has no isolate columns".into(),
        ));
    }

    let ids = raw.column(id_column)?.cast(&DataType::String)?;
    let canonical: Vec<String> = ids
        .str()?
        .into_iter()
        .map(|id| canonical_gene_name(id.unwrap_or_default()))
        .collect();

    let mut columns = Vec::with_capacity(names.len());
    columns.push(Column::new(id_column.as_str().into(), canonical));
    for isolate in isolates {
        let column = raw
            .column(isolate)?
            .strict_cast(&DataType::Float64)
            .map_err(|_| {
                PathwayError::InvalidFileFormat(format!(
                    "isolate column '{}' holds non-numeric presence values",
                    isolate
                ))
            })?;
        columns.push(column);
    }

    let merged = DataFrame::new(columns)?
        .lazy()
        .group_by_stable([col(id_column.as_str())])
        .agg(
            isolates
                .iter()
                .map(|isolate| col(isolate.as_str()).max())
                .collect::<Vec<_>>(),
        )
        .collect()?;

    let genes: Vec<String> = merged
        .column(id_column)?
        .str()?
        .into_iter()
        .map(|gene| gene.unwrap_or_default().to_string())
        .collect();

    let mut presence = Array2::<f64>::zeros((genes.len(), isolates.len()));
    for (j, isolate) in isolates.iter().enumerate() {
        let values = merged.column(isolate)?.f64()?;
        for (i, value) in values.into_iter().enumerate() {
            presence[[i, j]] = value.unwrap_or(0.0);
        }
    }

    GeneMatrix::new(genes, isolates.to_vec(), presence)
}

/// Reads and canonicalizes a gene presence/absence table
pub fn load_gene_matrix(path: impl AsRef<Path>) -> Result<GeneMatrix> {
    let path = path.as_ref();
    info!("Reading Roary gene presence/absence file {}", path.display());

    let raw = read_gene_table(path)?;
    let matrix = canonicalize(&raw)?;
    info!(
        "{} gene rows condensed to {} genes across {} isolates",
        raw.height(),
        matrix.n_genes(),
        matrix.n_isolates()
    );

    Ok(matrix)
}

/// Writes the canonical gene names, one per line
pub fn write_gene_list(matrix: &GeneMatrix, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut file = BufWriter::new(File::create(path)?);
    for gene in matrix.genes() {
        writeln!(file, "{}", gene)?;
    }
    file.flush()?;

    info!("Common genes written to {}", path.display());
    Ok(())
}
