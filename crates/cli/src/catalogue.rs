//! `covmap catalogue`: inspect and validate control catalogues.

use std::path::PathBuf;

use clap::Subcommand;
use covmap_recon::aggregate::aggregate;
use covmap_recon::classify::classify;
use covmap_recon::{Catalogue, ComplianceRecord, ControlId, SeverityTier};
use serde::Serialize;

use crate::{to_json, CliError, Context};

#[derive(Subcommand)]
pub enum CatalogueCommands {
    /// Check a catalogue file without annotating anything
    #[command(after_help = "\
Examples:
  covmap catalogue validate
  covmap catalogue validate custom.toml")]
    Validate {
        /// Catalogue TOML (default: --catalogue, the settings' catalogue, or the embedded one)
        file: Option<PathBuf>,
    },

    /// List every control with its coverage and tier
    #[command(after_help = "\
Examples:
  covmap catalogue list
  covmap catalogue list --json")]
    List {
        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_catalogue(ctx: &Context, cmd: CatalogueCommands) -> Result<(), CliError> {
    match cmd {
        CatalogueCommands::Validate { file } => cmd_validate(ctx, file),
        CatalogueCommands::List { json } => cmd_list(ctx, json),
    }
}

fn cmd_validate(ctx: &Context, file: Option<PathBuf>) -> Result<(), CliError> {
    let (source, catalogue) = match file {
        Some(path) => {
            let catalogue = Catalogue::load(&path).map_err(CliError::coverage)?;
            (path.display().to_string(), catalogue)
        }
        None => {
            let source = ctx
                .catalogue_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "embedded catalogue".to_string());
            (source, ctx.catalogue()?)
        }
    };

    let s = aggregate(&catalogue);
    eprintln!(
        "{source}: ok, {} controls ({} YES, {} PARTIAL, {} NO), coverage {:.1}%",
        s.total, s.yes, s.partial, s.no, s.percentage
    );
    if catalogue.is_empty() {
        log::warn!("{source}: catalogue has no controls");
    }
    Ok(())
}

#[derive(Serialize)]
struct ListEntry<'kb> {
    control: &'kb ControlId,
    tier: SeverityTier,
    #[serde(flatten)]
    record: &'kb ComplianceRecord,
}

fn cmd_list(ctx: &Context, json: bool) -> Result<(), CliError> {
    let catalogue = ctx.catalogue()?;
    let entries: Vec<ListEntry<'_>> = catalogue
        .iter()
        .map(|(control, record)| ListEntry { control, tier: classify(record), record })
        .collect();

    if json {
        println!("{}", to_json(&entries)?);
        return Ok(());
    }

    eprintln!("{:<10} {:<8} {:<9} POLICY", "CONTROL", "COVERAGE", "TIER");
    for entry in &entries {
        eprintln!(
            "{:<10} {:<8} {:<9} {}",
            entry.control.as_str(),
            entry.record.coverage.as_str(),
            entry.tier.to_string(),
            entry.record.policy,
        );
    }
    eprintln!("{} controls", entries.len());
    Ok(())
}
