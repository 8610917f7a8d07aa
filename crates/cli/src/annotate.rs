//! `covmap annotate`: append coverage columns to a control list.

use std::path::{Path, PathBuf};

use clap::Args;
use covmap_io::annotate::{annotate, AnnotatedSheet, AnnotationColumns};
use covmap_io::backup::{annotated_output_path, create_backup, timestamped_backup_path};
use covmap_io::layout::{insert_spacers, strip_spacer_rows};
use covmap_io::{read_sheets, select_sheet, xlsx, Document, Format};
use covmap_recon::run;
use serde::Serialize;

use crate::{print_report, to_json, CliError, Context};

#[derive(Args)]
pub struct AnnotateArgs {
    /// Control list (.csv, .tsv, .xlsx, .xlsm, .xls, .xlsb, .ods)
    file: PathBuf,

    /// Output file (default: <name>_annotated.<ext>)
    #[arg(long, short = 'o', conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Overwrite the input, keeping a timestamped backup unless disabled in settings
    #[arg(long)]
    in_place: bool,

    /// Sheet to annotate (default: the first)
    #[arg(long)]
    sheet: Option<String>,

    /// Do not insert spacer rows between annotated rows
    #[arg(long)]
    no_spacers: bool,

    /// Output JSON to stdout instead of the human summary
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct AnnotateOutput<'a, R: Serialize> {
    output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    backup: Option<String>,
    sheet: &'a str,
    control_column: &'a str,
    spacers: usize,
    result: R,
}

pub fn cmd_annotate(ctx: &Context, args: AnnotateArgs) -> Result<(), CliError> {
    let input_format = Format::from_path(&args.file).map_err(CliError::document)?;
    let output = resolve_output(&args)?;
    let output_format = Format::from_path(&output).map_err(CliError::document)?;

    if output_format == Format::Spreadsheet && !is_xlsx(&output) {
        return Err(CliError::args(format!(
            "cannot write {}: spreadsheets are written as .xlsx",
            output.display()
        ))
        .with_hint("pass -o <name>.xlsx"));
    }

    let mut sheets = read_sheets(&args.file).map_err(CliError::document)?;
    if input_format == Format::Spreadsheet {
        // A summary from an earlier run is regenerated, not annotated
        let summary_name = ctx.settings.output.summary_sheet.as_str();
        sheets.retain(|s| s.name != summary_name);
    }
    let selected = select_sheet(&sheets, args.sheet.as_deref()).map_err(CliError::document)?;
    let columns = AnnotationColumns::from(&ctx.settings.columns);

    let column = sheets[selected].control_column();
    if input_format == Format::Spreadsheet {
        // Spacers from an earlier run read back as blank rows
        strip_spacer_rows(&mut sheets[selected], column, &columns);
    }
    let document = &sheets[selected];

    let control_header = document.header().get(column).map(String::as_str).unwrap_or("");
    let rows = document.control_rows(column);
    log::debug!(
        "sheet '{}': control column {} ('{}'), {} rows",
        document.name,
        column,
        control_header,
        rows.len()
    );

    let catalogue = ctx.catalogue()?;
    let result = run(&catalogue, &rows);

    let mut sheet = annotate(document, &result.rows, &columns);

    let use_spacers = output_format == Format::Spreadsheet
        && ctx.settings.output.spacers
        && !args.no_spacers;
    let spacers = if use_spacers {
        let positions: Vec<usize> = result.rows.iter().map(|o| o.position()).collect();
        insert_spacers(&mut sheet, &positions)
    } else {
        0
    };

    // The CSV delimiter is re-sniffed from the input before it can be overwritten
    let delimiter = output_delimiter(&args.file, input_format, output_format)?;

    let backup = if args.in_place && ctx.settings.output.backup {
        let path = timestamped_backup_path(&args.file, chrono::Local::now().naive_local());
        create_backup(&args.file, &path).map_err(CliError::document)?;
        Some(path)
    } else {
        None
    };

    let report = ctx.report(&catalogue);
    match output_format {
        Format::Csv | Format::Tsv => {
            covmap_io::csv::write(&sheet, &output, delimiter).map_err(CliError::document)?;
        }
        Format::Spreadsheet => {
            let lines = report.lines();
            let summary = xlsx::SummarySheet {
                name: &ctx.settings.output.summary_sheet,
                lines: &lines,
            };
            let workbook = workbook_sheets(&sheets, selected, sheet);
            xlsx::write(&output, Some(summary), &workbook).map_err(CliError::document)?;
        }
    }

    if args.json {
        let out = AnnotateOutput {
            output: output.display().to_string(),
            backup: backup.as_ref().map(|p| p.display().to_string()),
            sheet: &document.name,
            control_column: control_header,
            spacers,
            result: &result,
        };
        println!("{}", to_json(&out)?);
        return Ok(());
    }

    if let Some(path) = &backup {
        eprintln!("backup {}", path.display());
    }
    eprintln!("wrote {}", output.display());

    let s = &result.summary;
    eprintln!(
        "sheet '{}', column '{}': {} rows processed, {} matched, {} not mapped",
        document.name, control_header, s.processed, s.matched, s.unmatched
    );
    eprintln!();
    print_report(&report);
    Ok(())
}

fn resolve_output(args: &AnnotateArgs) -> Result<PathBuf, CliError> {
    if args.in_place {
        return Ok(args.file.clone());
    }
    if let Some(path) = &args.output {
        return Ok(path.clone());
    }

    let mut path = annotated_output_path(&args.file);
    // Any other workbook extension is annotated into a new .xlsx
    if Format::from_path(&args.file).map_err(CliError::document)? == Format::Spreadsheet
        && !is_xlsx(&path)
    {
        path.set_extension("xlsx");
    }
    Ok(path)
}

/// Only `.xlsx` matches the macro-free workbooks the writer produces.
fn is_xlsx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"))
}

fn output_delimiter(input: &Path, input_format: Format, output_format: Format) -> Result<u8, CliError> {
    match (input_format, output_format) {
        (_, Format::Tsv) => Ok(b'\t'),
        (Format::Csv, Format::Csv) => {
            let content = covmap_io::csv::read_file_as_utf8(input).map_err(CliError::document)?;
            Ok(covmap_io::csv::sniff_delimiter(&content))
        }
        _ => Ok(b','),
    }
}

/// Every source sheet in order, the selected one replaced by its annotation.
fn workbook_sheets(
    sheets: &[Document],
    selected: usize,
    annotated: AnnotatedSheet,
) -> Vec<AnnotatedSheet> {
    let mut annotated = Some(annotated);
    sheets
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let replacement = if i == selected { annotated.take() } else { None };
            replacement.unwrap_or_else(|| AnnotatedSheet::plain(doc))
        })
        .collect()
}
