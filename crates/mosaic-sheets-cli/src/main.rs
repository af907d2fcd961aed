//! Mosaic Sheets CLI - hide pictures in spreadsheet conditional formatting

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{debug, LevelFilter};
use mosaic_sheets::prelude::*;
use mosaic_sheets::{
    default_labels, locate_mosaic, save_preview, CellValue, GridTableWriteOptions,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mosaic")]
#[command(
    author,
    version,
    about = "Turn pictures into gray-level spreadsheet mosaics"
)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Average one image into a grid table and a preview image
    Grid {
        /// Input image
        image: PathBuf,

        /// Grid rows
        #[arg(long, default_value = "50")]
        rows: u32,

        /// Grid columns
        #[arg(long, default_value = "80")]
        cols: u16,

        /// Label used in the output file names (default: label_1)
        #[arg(short, long)]
        label: Option<String>,

        /// Directory for the table and preview
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Table field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Preview file extension, which also picks the image format
        #[arg(long, default_value = "jpg")]
        preview_ext: String,
    },

    /// Multiplex grid tables into one workbook
    Compose {
        /// Grid tables, selected as 1, 2, ... in this order
        #[arg(required = true)]
        tables: Vec<PathBuf>,

        /// Output workbook
        #[arg(short, long, default_value = "EXCEL_output.xlsx")]
        output: PathBuf,

        /// Top-left cell of the mosaic
        #[arg(long, default_value = "B2")]
        origin: CellAddress,

        /// Selector cell (default: two rows below and eleven columns right
        /// of the mosaic)
        #[arg(long)]
        selector: Option<CellAddress>,

        /// Worksheet name
        #[arg(long, default_value = "Sheet")]
        sheet_name: String,

        /// Table field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Required grid rows (needs --cols)
        #[arg(long, requires = "cols")]
        rows: Option<u32>,

        /// Required grid columns (needs --rows)
        #[arg(long, requires = "rows")]
        cols: Option<u16>,
    },

    /// Grid every image, then compose all tables into one workbook
    Run {
        /// Input images
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Grid rows
        #[arg(long, default_value = "50")]
        rows: u32,

        /// Grid columns
        #[arg(long, default_value = "80")]
        cols: u16,

        /// One label per image, in order (default: label_1, label_2, ...)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// Directory for tables, previews and the workbook
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Workbook file name inside the output directory
        #[arg(short, long, default_value = "EXCEL_output.xlsx")]
        output: String,

        /// Preview file extension
        #[arg(long, default_value = "jpg")]
        preview_ext: String,
    },

    /// Print the grid a composed workbook displays for a selector value
    Show {
        /// Composed workbook
        input: PathBuf,

        /// Selector value (default: the value stored in the selector cell)
        #[arg(short = 'k', long)]
        select: Option<i64>,

        /// Worksheet name (default: the first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also paint the displayed sheet into this image
        #[arg(long)]
        render: Option<PathBuf>,

        /// Pixel size of one cell when painting
        #[arg(long, default_value = "10")]
        cell_size: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Grid {
            image,
            rows,
            cols,
            label,
            out_dir,
            delimiter,
            preview_ext,
        } => grid(
            &image,
            rows,
            cols,
            label,
            &out_dir,
            delimiter,
            preview_ext,
        ),
        Commands::Compose {
            tables,
            output,
            origin,
            selector,
            sheet_name,
            delimiter,
            rows,
            cols,
        } => {
            let mut layout = SheetLayout::default()
                .with_sheet_name(sheet_name)
                .with_origin(origin);
            if let Some(selector) = selector {
                layout = layout.with_selector(selector);
            }
            let mut read_options = GridTableReadOptions {
                delimiter: delimiter_byte(delimiter)?,
                ..GridTableReadOptions::default()
            };
            if let (Some(rows), Some(cols)) = (rows, cols) {
                read_options = read_options.with_expected_shape(rows, cols);
            }
            compose(&tables, &output, &layout, &read_options)
        }
        Commands::Run {
            images,
            rows,
            cols,
            labels,
            out_dir,
            output,
            preview_ext,
        } => run(&images, rows, cols, labels, &out_dir, output, preview_ext),
        Commands::Show {
            input,
            select,
            sheet,
            json,
            render,
            cell_size,
        } => show(
            &input,
            select,
            sheet.as_deref(),
            json,
            render.as_deref(),
            cell_size,
        ),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }
    Ok(delimiter as u8)
}

fn grid(
    image: &Path,
    rows: u32,
    cols: u16,
    label: Option<String>,
    out_dir: &Path,
    delimiter: char,
    preview_ext: String,
) -> Result<()> {
    let label = label.unwrap_or_else(|| "label_1".to_string());
    let options = MosaicOptions {
        rows,
        cols,
        table: GridTableWriteOptions {
            delimiter: delimiter_byte(delimiter)?,
            ..GridTableWriteOptions::default()
        },
    };
    let naming = ArtifactNaming {
        preview_extension: preview_ext,
        ..ArtifactNaming::default()
    };

    let artifacts = mosaic(image, &label, out_dir, &options, &naming)
        .with_context(|| format!("Failed to grid {}", image.display()))?;

    println!(
        "{}: {}x{} grid, {}x{} pixel cells",
        artifacts.label,
        artifacts.grid.rows(),
        artifacts.grid.cols(),
        artifacts.plan.cell_height,
        artifacts.plan.cell_width
    );
    println!("  table:   {}", artifacts.table.display());
    println!("  preview: {}", artifacts.preview.display());
    Ok(())
}

fn compose(
    tables: &[PathBuf],
    output: &Path,
    layout: &SheetLayout,
    read_options: &GridTableReadOptions,
) -> Result<()> {
    let report = compose_tables(tables, output, layout, read_options)
        .with_context(|| format!("Failed to compose {}", output.display()))?;

    println!(
        "Wrote {} ({} tables, {}x{})",
        report.output.display(),
        report.tables,
        report.shape.0,
        report.shape.1
    );
    println!("  mosaic:   {}", report.data_range);
    println!("  selector: {} (1..={})", report.selector, report.tables);
    Ok(())
}

fn run(
    images: &[PathBuf],
    rows: u32,
    cols: u16,
    labels: Vec<String>,
    out_dir: &Path,
    output: String,
    preview_ext: String,
) -> Result<()> {
    let labels = if labels.is_empty() {
        default_labels(images.len())
    } else {
        labels
    };
    let options = MosaicOptions {
        rows,
        cols,
        ..MosaicOptions::default()
    };
    let naming = ArtifactNaming {
        preview_extension: preview_ext,
        workbook_name: output,
        ..ArtifactNaming::default()
    };

    let report = run_all(
        images,
        &labels,
        out_dir,
        &options,
        &naming,
        &SheetLayout::default(),
    )
    .context("Failed to build mosaics")?;

    for artifacts in &report.mosaics {
        println!(
            "{}: {} and {}",
            artifacts.label,
            artifacts.table.display(),
            artifacts.preview.display()
        );
    }
    println!(
        "Wrote {} with selector {} (1..={})",
        report.workbook.output.display(),
        report.workbook.selector,
        report.workbook.tables
    );
    Ok(())
}

fn show(
    input: &Path,
    select: Option<i64>,
    sheet: Option<&str>,
    json: bool,
    render: Option<&Path>,
    cell_size: u32,
) -> Result<()> {
    let workbook = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let worksheet = match sheet {
        Some(name) => workbook
            .worksheet_by_name(name)
            .with_context(|| format!("No sheet named '{}'", name))?,
        None => workbook
            .worksheet(0)
            .context("Workbook has no sheets")?,
    };

    let location = locate_mosaic(worksheet)
        .with_context(|| format!("'{}' is not a composed mosaic", worksheet.name()))?;
    debug!(
        "mosaic at {} with selector {}",
        location.data_range, location.selector
    );

    let selector_value = match select {
        Some(k) => k,
        None => stored_selector(worksheet, location.selector),
    };

    let grid = displayed_grid(
        worksheet,
        location.data_range,
        location.selector,
        selector_value,
    )
    .with_context(|| format!("Selector {} does not display a mosaic", selector_value))?;

    if let Some(path) = render {
        let painted = render_sheet(
            worksheet,
            location.data_range,
            &grid,
            cell_size,
            cell_size,
        )?;
        save_preview(&painted, path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
    }

    if json {
        let out = serde_json::json!({
            "selector": selector_value,
            "range": location.data_range.to_string(),
            "grid": grid,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", grid);
    }
    Ok(())
}

/// The selector value saved in the workbook, or 1 when the cell is not a
/// whole number
fn stored_selector(worksheet: &Worksheet, selector: CellAddress) -> i64 {
    match worksheet.value_ref_at(selector.row, selector.col) {
        Some(CellValue::Number(n)) if n.fract() == 0.0 => *n as i64,
        _ => 1,
    }
}
