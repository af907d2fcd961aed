//! End-to-end pipeline: image → grid table + preview → workbook

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use mosaic_sheets_core::Grid;
use mosaic_sheets_csv::{GridTableReadOptions, GridTableWriteOptions, GridTableWriter};
use mosaic_sheets_image::{average_grid, load_rgb, render_preview, save_preview, CropPlan};

use crate::compose::{compose_tables, ComposeReport, SheetLayout};
use crate::error::{Error, Result};

/// How artifact files are named
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactNaming {
    /// Prefix of grid table files (`CSV_<label>.csv`)
    pub csv_prefix: String,
    /// Prefix of preview images (`IMG_<label>.<ext>`)
    pub image_prefix: String,
    /// Preview file extension; also picks the image format
    pub preview_extension: String,
    /// Workbook file name, relative to the output directory unless absolute
    pub workbook_name: String,
}

impl Default for ArtifactNaming {
    fn default() -> Self {
        Self {
            csv_prefix: "CSV_".to_string(),
            image_prefix: "IMG_".to_string(),
            preview_extension: "jpg".to_string(),
            workbook_name: "EXCEL_output.xlsx".to_string(),
        }
    }
}

impl ArtifactNaming {
    /// Grid table file name for `label`
    pub fn table_file(&self, label: &str) -> String {
        format!("{}{}.csv", self.csv_prefix, label)
    }

    /// Preview image file name for `label`
    pub fn preview_file(&self, label: &str) -> String {
        format!("{}{}.{}", self.image_prefix, label, self.preview_extension)
    }

    /// Workbook path inside `out_dir`
    pub fn workbook_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(&self.workbook_name)
    }
}

/// Grid size and table format
#[derive(Debug, Clone)]
pub struct MosaicOptions {
    /// Grid rows
    pub rows: u32,
    /// Grid columns
    pub cols: u16,
    /// How grid tables are written
    pub table: GridTableWriteOptions,
}

impl Default for MosaicOptions {
    fn default() -> Self {
        Self {
            rows: 50,
            cols: 80,
            table: GridTableWriteOptions::default(),
        }
    }
}

/// Files and data produced for one image
#[derive(Debug, Clone)]
pub struct MosaicArtifacts {
    pub label: String,
    pub grid: Grid,
    pub plan: CropPlan,
    pub table: PathBuf,
    pub preview: PathBuf,
}

/// Everything [`run_all`] produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mosaics: Vec<MosaicArtifacts>,
    pub workbook: ComposeReport,
}

/// `label_1`, `label_2`, ... for `count` images
pub fn default_labels(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("label_{}", i)).collect()
}

/// Average one image into a grid, then save its table and preview in
/// `out_dir`
pub fn mosaic<P: AsRef<Path>>(
    image_path: P,
    label: &str,
    out_dir: &Path,
    options: &MosaicOptions,
    naming: &ArtifactNaming,
) -> Result<MosaicArtifacts> {
    let image = load_rgb(image_path)?;
    let averaged = average_grid(&image, options.rows, options.cols)?;
    let plan = averaged.plan;

    fs::create_dir_all(out_dir)?;

    let table = out_dir.join(naming.table_file(label));
    GridTableWriter::write_file(&averaged.grid, &table, &options.table)?;

    let preview = out_dir.join(naming.preview_file(label));
    let painted = render_preview(&averaged.grid, plan.cell_height, plan.cell_width);
    save_preview(&painted, &preview)?;

    Ok(MosaicArtifacts {
        label: label.to_string(),
        grid: averaged.grid,
        plan,
        table,
        preview,
    })
}

/// Run [`mosaic`] for every image, then compose all tables into one workbook
pub fn run_all<P: AsRef<Path>>(
    images: &[P],
    labels: &[String],
    out_dir: &Path,
    options: &MosaicOptions,
    naming: &ArtifactNaming,
    layout: &SheetLayout,
) -> Result<RunReport> {
    if images.is_empty() {
        return Err(Error::NoTables);
    }
    if images.len() != labels.len() {
        return Err(Error::LabelCount {
            images: images.len(),
            labels: labels.len(),
        });
    }
    let mut seen = HashSet::new();
    if let Some(duplicate) = labels.iter().find(|label| !seen.insert(label.as_str())) {
        return Err(Error::DuplicateLabel(duplicate.clone()));
    }

    let mosaics = images
        .iter()
        .zip(labels)
        .map(|(image, label)| mosaic(image, label, out_dir, options, naming))
        .collect::<Result<Vec<_>>>()?;

    let tables: Vec<&Path> = mosaics.iter().map(|m| m.table.as_path()).collect();
    let read_options = GridTableReadOptions {
        delimiter: options.table.delimiter,
        ..GridTableReadOptions::default()
    }
    .with_expected_shape(options.rows, options.cols);
    let workbook = compose_tables(
        &tables,
        naming.workbook_path(out_dir),
        layout,
        &read_options,
    )?;

    info!(
        "composed {} mosaics into {}",
        mosaics.len(),
        workbook.output.display()
    );

    Ok(RunReport { mosaics, workbook })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_naming() {
        let naming = ArtifactNaming::default();
        assert_eq!(naming.table_file("label_1"), "CSV_label_1.csv");
        assert_eq!(naming.preview_file("label_1"), "IMG_label_1.jpg");
        assert_eq!(
            naming.workbook_path(Path::new("out")),
            Path::new("out").join("EXCEL_output.xlsx")
        );
    }

    #[test]
    fn test_default_labels() {
        assert_eq!(default_labels(3), vec!["label_1", "label_2", "label_3"]);
        assert!(default_labels(0).is_empty());
    }

    #[test]
    fn test_run_all_validates_labels() {
        let out = Path::new("unused");
        let options = MosaicOptions::default();
        let naming = ArtifactNaming::default();
        let layout = SheetLayout::default();

        let labels = vec!["a".to_string()];
        assert!(matches!(
            run_all(&["x.png", "y.png"], &labels, out, &options, &naming, &layout),
            Err(Error::LabelCount { images: 2, labels: 1 })
        ));

        let labels = vec!["a".to_string(), "a".to_string()];
        assert!(matches!(
            run_all(&["x.png", "y.png"], &labels, out, &options, &naming, &layout),
            Err(Error::DuplicateLabel(ref l)) if l == "a"
        ));

        let none: [&str; 0] = [];
        assert!(matches!(
            run_all(&none, &[], out, &options, &naming, &layout),
            Err(Error::NoTables)
        ));
    }
}
