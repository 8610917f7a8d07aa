//! `covmap effects`: fill blank prod/nonprod effects in a policy parameter CSV.

use std::path::PathBuf;

use clap::Args;
use covmap_io::backup::{create_backup, suffix_backup_path, updated_output_path};
use covmap_recon::effects::{fill_effects, EffectStrategy};

use crate::{to_json, CliError};

#[derive(Args)]
pub struct EffectsArgs {
    /// Parameter CSV with prodEffect, nonprodEffect and allowedEffects columns
    csv: PathBuf,

    /// Output CSV (default: <name>.updated.csv)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Production effect: "same" for the recommendation, or a literal effect
    #[arg(long, default_value = "same", value_name = "STRATEGY")]
    prod: EffectStrategy,

    /// Non-production effect: "same" for the recommendation, or a literal effect
    #[arg(long, default_value = "same", value_name = "STRATEGY")]
    nonprod: EffectStrategy,

    /// Copy the input to <file>.backup first
    #[arg(long)]
    backup: bool,

    /// Output JSON counts to stdout
    #[arg(long)]
    json: bool,
}

pub fn cmd_effects(args: EffectsArgs) -> Result<(), CliError> {
    let content = covmap_io::csv::read_file_as_utf8(&args.csv).map_err(CliError::document)?;
    let outcome =
        fill_effects(&content, &args.prod, &args.nonprod).map_err(CliError::coverage)?;

    // A failed backup is reported but does not stop the update
    if args.backup {
        let backup = suffix_backup_path(&args.csv);
        match create_backup(&args.csv, &backup) {
            Ok(()) => eprintln!("backup {}", backup.display()),
            Err(e) => log::warn!("could not create backup: {e}"),
        }
    }

    let output = args.output.unwrap_or_else(|| updated_output_path(&args.csv));
    std::fs::write(&output, &outcome.csv)
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", output.display())))?;

    if args.json {
        println!("{}", to_json(&outcome)?);
        return Ok(());
    }

    eprintln!("wrote {}", output.display());
    eprintln!(
        "{} rows updated, {} already set",
        outcome.updated, outcome.skipped
    );
    Ok(())
}
