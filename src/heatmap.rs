//! Clustered heatmap of pathway frequencies
//!
//! Pathways (rows) and isolates (columns) are both reordered by average
//! linkage clustering, with dendrograms drawn along the left and top edges.
//! SVG output by default, PNG with the `png` feature.

use crate::cluster::{average_linkage, Dendrogram};
use crate::error::{PathwayError, Result};
use crate::types::FrequencyTable;
use log::{info, warn};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// Dark-to-mint colour ramp anchors, approximating seaborn's "mako"
const MAKO: [(f64, (u8, u8, u8)); 5] = [
    (0.0, (11, 4, 5)),
    (0.25, (62, 53, 107)),
    (0.5, (53, 123, 162)),
    (0.75, (73, 193, 173)),
    (1.0, (222, 245, 229)),
];

const MARGIN: i32 = 20;
const TITLE_HEIGHT: i32 = 40;
const ROW_DENDROGRAM_WIDTH: i32 = 120;
const COL_DENDROGRAM_HEIGHT: i32 = 100;
const LABEL_CHAR_WIDTH: i32 = 6;

/// Configuration for heatmap rendering
#[derive(Clone, Debug)]
pub struct HeatmapConfig {
    /// Plot width in pixels
    pub width: u32,
    /// Plot height in pixels
    pub height: u32,
    /// Optional title drawn above the dendrogram
    pub title: Option<String>,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            title: None,
        }
    }
}

/// Supported plot formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotFormat {
    /// Scalable Vector Graphics (default)
    Svg,
    /// Portable Network Graphics (requires `png` feature)
    Png,
}

impl PlotFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" if cfg!(feature = "png") => Some(Self::Png),
            _ => None,
        }
    }

    /// # Errors
    /// * `PathwayError::InvalidParameter` for an unknown extension, or `.png`
    ///   without the `png` feature
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                let message = if cfg!(feature = "png") {
                    "plot file must end in .svg or .png"
                } else {
                    "plot file must end in .svg (PNG output requires the 'png' feature)"
                };
                PathwayError::invalid_parameter("plot", path.display(), message)
            })
    }
}

/// Maps a frequency in `[0, 1]` onto the colour ramp; NaN maps to the low end
pub fn mako(value: f64) -> RGBColor {
    let v = if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    };

    for pair in MAKO.windows(2) {
        let (lo, c0) = pair[0];
        let (hi, c1) = pair[1];
        if v <= hi {
            let t = (v - lo) / (hi - lo);
            let lerp = |a: u8, b: u8| (a as f64 + t * (b as f64 - a as f64)).round() as u8;
            return RGBColor(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2));
        }
    }

    let (_, last) = MAKO[MAKO.len() - 1];
    RGBColor(last.0, last.1, last.2)
}

/// Clusters rows and columns of the table
pub fn cluster_table(table: &FrequencyTable) -> (Dendrogram, Dendrogram) {
    let rows = average_linkage(table.values());
    let cols = average_linkage(&table.values().t().to_owned());
    (rows, cols)
}

/// Renders a clustered heatmap of `table` to `path`.
///
/// Returns `false` without writing anything when the table has no rows or no
/// isolate columns.
pub fn clustermap(
    table: &FrequencyTable,
    path: impl AsRef<Path>,
    config: &HeatmapConfig,
) -> Result<bool> {
    let path = path.as_ref();
    let format = PlotFormat::from_path(path)?;

    if table.is_empty() || table.isolates().is_empty() {
        warn!("No pathways to plot, skipping {}", path.display());
        return Ok(false);
    }

    let (rows, cols) = cluster_table(table);

    match format {
        PlotFormat::Svg => draw_svg(table, &rows, &cols, path, config)?,
        PlotFormat::Png => draw_png(table, &rows, &cols, path, config)?,
    }

    info!(
        "Heatmap of {} pathways x {} isolates written to {}",
        table.len(),
        table.isolates().len(),
        path.display()
    );
    Ok(true)
}

fn draw_svg(
    table: &FrequencyTable,
    rows: &Dendrogram,
    cols: &Dendrogram,
    path: &Path,
    config: &HeatmapConfig,
) -> Result<()> {
    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    draw_clustermap(&root, table, rows, cols, config)?;
    root.present()?;
    Ok(())
}

#[cfg(feature = "png")]
fn draw_png(
    table: &FrequencyTable,
    rows: &Dendrogram,
    cols: &Dendrogram,
    path: &Path,
    config: &HeatmapConfig,
) -> Result<()> {
    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    draw_clustermap(&root, table, rows, cols, config)?;
    root.present()?;
    Ok(())
}

#[cfg(not(feature = "png"))]
fn draw_png(
    _table: &FrequencyTable,
    _rows: &Dendrogram,
    _cols: &Dendrogram,
    path: &Path,
    _config: &HeatmapConfig,
) -> Result<()> {
    Err(PathwayError::invalid_parameter(
        "plot",
        path.display(),
        "PNG output requires the 'png' feature",
    ))
}

fn label_extent(labels: &[String], min: i32, max: i32) -> i32 {
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32;
    (longest * LABEL_CHAR_WIDTH + 12).clamp(min, max.max(min))
}

fn draw_clustermap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    table: &FrequencyTable,
    rows: &Dendrogram,
    cols: &Dendrogram,
    config: &HeatmapConfig,
) -> Result<()> {
    root.fill(&WHITE)?;

    let width = config.width as i32;
    let height = config.height as i32;
    let title_height = if config.title.is_some() { TITLE_HEIGHT } else { 0 };

    let row_label_width = label_extent(table.pathways(), 60, width / 3);
    let col_label_height = label_extent(table.isolates(), 40, height / 4);

    let heat_x0 = MARGIN + ROW_DENDROGRAM_WIDTH;
    let heat_y0 = MARGIN + title_height + COL_DENDROGRAM_HEIGHT;
    let heat_w = width - heat_x0 - row_label_width - MARGIN;
    let heat_h = height - heat_y0 - col_label_height - MARGIN;
    if heat_w <= 0 || heat_h <= 0 {
        return Err(PathwayError::Plot(format!(
            "canvas {}x{} is too small for the heatmap",
            config.width, config.height
        )));
    }

    let n_rows = table.len();
    let n_cols = table.isolates().len();
    let cell_w = heat_w as f64 / n_cols as f64;
    let cell_h = heat_h as f64 / n_rows as f64;

    if let Some(title) = &config.title {
        root.draw(&Text::new(
            title.clone(),
            (width / 2, MARGIN),
            ("sans-serif", 20)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Top)),
        ))?;
    }

    // cells
    let values = table.values();
    for (r_slot, &r) in rows.order.iter().enumerate() {
        let y0 = heat_y0 as f64 + r_slot as f64 * cell_h;
        for (c_slot, &c) in cols.order.iter().enumerate() {
            let x0 = heat_x0 as f64 + c_slot as f64 * cell_w;
            root.draw(&Rectangle::new(
                [
                    (x0 as i32, y0 as i32),
                    ((x0 + cell_w).ceil() as i32, (y0 + cell_h).ceil() as i32),
                ],
                mako(values[[r, c]]).filled(),
            ))?;
        }
    }

    // pathway labels, thinned out when rows are too short to read
    let row_font = (cell_h * 0.8).clamp(6.0, 14.0);
    let row_step = (8.0 / cell_h).ceil().max(1.0) as usize;
    for (r_slot, &r) in rows.order.iter().enumerate().step_by(row_step) {
        let y = heat_y0 as f64 + (r_slot as f64 + 0.5) * cell_h;
        root.draw(&Text::new(
            table.pathways()[r].clone(),
            (heat_x0 + heat_w + 4, y as i32),
            ("sans-serif", row_font)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;
    }

    // isolate labels, rotated to run downwards
    let col_font = (cell_w * 0.8).clamp(6.0, 14.0);
    let col_step = (8.0 / cell_w).ceil().max(1.0) as usize;
    for (c_slot, &c) in cols.order.iter().enumerate().step_by(col_step) {
        let x = heat_x0 as f64 + (c_slot as f64 + 0.5) * cell_w;
        root.draw(&Text::new(
            table.isolates()[c].clone(),
            (x as i32 + (col_font / 2.0) as i32, heat_y0 + heat_h + 4),
            ("sans-serif", col_font)
                .into_font()
                .transform(FontTransform::Rotate90)
                .color(&BLACK),
        ))?;
    }

    // row dendrogram grows leftwards from the heatmap
    let row_scale = dendrogram_scale(rows, ROW_DENDROGRAM_WIDTH - 8);
    draw_dendrogram(root, rows, |pos, h| {
        (
            heat_x0 - 4 - (h * row_scale) as i32,
            (heat_y0 as f64 + (pos + 0.5) * cell_h) as i32,
        )
    })?;

    // column dendrogram grows upwards
    let col_scale = dendrogram_scale(cols, COL_DENDROGRAM_HEIGHT - 8);
    draw_dendrogram(root, cols, |pos, h| {
        (
            (heat_x0 as f64 + (pos + 0.5) * cell_w) as i32,
            heat_y0 - 4 - (h * col_scale) as i32,
        )
    })?;

    draw_colorbar(root, MARGIN + 10, MARGIN + title_height + 10, COL_DENDROGRAM_HEIGHT - 30)?;

    Ok(())
}

fn dendrogram_scale(dendro: &Dendrogram, extent: i32) -> f64 {
    let max = dendro.max_height();
    if max > 0.0 {
        extent as f64 / max
    } else {
        0.0
    }
}

fn draw_dendrogram<DB, F>(root: &DrawingArea<DB, Shift>, dendro: &Dendrogram, to_pixel: F) -> Result<()>
where
    DB: DrawingBackend,
    F: Fn(f64, f64) -> (i32, i32),
{
    let positions = dendro.node_positions();
    let line = RGBColor(60, 60, 60);

    for merge in &dendro.merges {
        let (p_l, h_l) = (positions[merge.left], dendro.node_height(merge.left));
        let (p_r, h_r) = (positions[merge.right], dendro.node_height(merge.right));
        root.draw(&PathElement::new(
            vec![
                to_pixel(p_l, h_l),
                to_pixel(p_l, merge.height),
                to_pixel(p_r, merge.height),
                to_pixel(p_r, h_r),
            ],
            line.stroke_width(1),
        ))?;
    }
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    x: i32,
    y: i32,
    bar_height: i32,
) -> Result<()> {
    let bar_width = 14;
    let steps = 50;
    let step = bar_height as f64 / steps as f64;

    for i in 0..steps {
        let y0 = y as f64 + i as f64 * step;
        let value = 1.0 - i as f64 / (steps - 1) as f64;
        root.draw(&Rectangle::new(
            [(x, y0 as i32), (x + bar_width, (y0 + step).ceil() as i32)],
            mako(value).filled(),
        ))?;
    }

    let font = ("sans-serif", 10).into_font().color(&BLACK);
    root.draw(&Text::new(
        "1.0",
        (x + bar_width + 4, y),
        font.pos(Pos::new(HPos::Left, VPos::Top)),
    ))?;
    root.draw(&Text::new(
        "0.0",
        (x + bar_width + 4, y + bar_height),
        ("sans-serif", 10)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Bottom)),
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mako_endpoints() {
        assert_eq!(mako(0.0), RGBColor(11, 4, 5));
        assert_eq!(mako(1.0), RGBColor(222, 245, 229));
        assert_eq!(mako(0.5), RGBColor(53, 123, 162));
    }

    #[test]
    fn test_mako_clamps() {
        assert_eq!(mako(-1.0), mako(0.0));
        assert_eq!(mako(3.0), mako(1.0));
        assert_eq!(mako(f64::NAN), mako(0.0));
    }

    #[test]
    fn test_plot_format_from_path() {
        assert_eq!(
            PlotFormat::from_path(Path::new("map.svg")).unwrap(),
            PlotFormat::Svg
        );
        assert_eq!(
            PlotFormat::from_path(Path::new("MAP.SVG")).unwrap(),
            PlotFormat::Svg
        );
        assert!(PlotFormat::from_path(Path::new("map.pdf")).is_err());
        assert!(PlotFormat::from_path(Path::new("map")).is_err());
    }

    #[test]
    fn test_label_extent() {
        let labels = vec!["a".to_string(), "abcdefghij".to_string()];
        assert_eq!(label_extent(&labels, 10, 500), 10 * LABEL_CHAR_WIDTH + 12);
        assert_eq!(label_extent(&labels, 100, 500), 100);
        assert_eq!(label_extent(&labels, 10, 20), 20);
    }
}
