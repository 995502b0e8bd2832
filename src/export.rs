use crate::error::{PathwayError, Result};
use crate::types::FrequencyTable;
use log::info;
use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::path::Path;

/// Excel's column limit, including the pathway name column
const XLSX_MAX_COLUMNS: usize = 16_384;

/// Supported frequency table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Excel workbook (default)
    Xlsx,
    Csv,
    Tsv,
}

impl ExportFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            "tsv" | "txt" => Some(Self::Tsv),
            _ => None,
        }
    }

    /// # Errors
    /// * `PathwayError::InvalidParameter` for a missing or unknown extension
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                PathwayError::invalid_parameter(
                    "output",
                    path.display(),
                    "output file must end in .xlsx, .csv or .tsv",
                )
            })
    }
}

/// Writes the frequency table with pathways as rows and isolates as columns.
///
/// The format follows the extension of `path`.
pub fn export_table(table: &FrequencyTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = ExportFormat::from_path(path)?;
    info!("Writing pathway frequencies to {}", path.display());

    match format {
        ExportFormat::Xlsx => write_xlsx(table, path),
        ExportFormat::Csv => write_delimited(table, path, b','),
        ExportFormat::Tsv => write_delimited(table, path, b'\t'),
    }
}

fn write_xlsx(table: &FrequencyTable, path: &Path) -> Result<()> {
    if table.isolates().len() + 1 > XLSX_MAX_COLUMNS {
        return Err(PathwayError::InvalidInput(format!(
            "{} isolates do not fit in an Excel sheet",
            table.isolates().len()
        )));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Pathways")?;

    for (j, name) in table.header()?.into_iter().enumerate() {
        worksheet.write_string(0, j as u16, name)?;
    }

    for (i, (pathway, row)) in table
        .pathways()
        .iter()
        .zip(table.values().rows())
        .enumerate()
    {
        let sheet_row = (i + 1) as u32;
        worksheet.write_string(sheet_row, 0, pathway.as_str())?;
        for (j, value) in row.iter().enumerate() {
            worksheet.write_number(sheet_row, (j + 1) as u16, *value)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_delimited(table: &FrequencyTable, path: &Path, separator: u8) -> Result<()> {
    let mut df = table.to_dataframe()?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator)
        .finish(&mut df)?;
    Ok(())
}
