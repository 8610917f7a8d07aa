//! `covmap lookup`: resolve free-text identifiers against the catalogue.

use covmap_io::annotate::NOT_MAPPED;
use covmap_recon::classify::classify;
use covmap_recon::{normalize, Catalogue, ComplianceRecord, ControlId, SeverityTier};
use serde::Serialize;

use crate::{to_json, CliError, Context};

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Lookup<'kb> {
    Matched {
        input: String,
        control: ControlId,
        tier: SeverityTier,
        record: &'kb ComplianceRecord,
    },
    /// An identifier was found but the catalogue has no entry for it.
    NotMapped { input: String, control: ControlId },
    /// No control identifier in the text.
    NoIdentifier { input: String },
}

fn resolve<'kb>(catalogue: &'kb Catalogue, input: &str) -> Lookup<'kb> {
    let input_owned = input.to_string();
    let Some(control) = normalize(input) else {
        return Lookup::NoIdentifier { input: input_owned };
    };
    match catalogue.lookup(&control) {
        Some(record) => Lookup::Matched {
            input: input_owned,
            tier: classify(record),
            control,
            record,
        },
        None => Lookup::NotMapped { input: input_owned, control },
    }
}

pub fn cmd_lookup(ctx: &Context, texts: &[String], json: bool) -> Result<(), CliError> {
    let catalogue = ctx.catalogue()?;
    let results: Vec<Lookup<'_>> = texts.iter().map(|t| resolve(&catalogue, t)).collect();

    if json {
        println!("{}", to_json(&results)?);
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            eprintln!();
        }
        match result {
            Lookup::Matched { control, tier, record, .. } => {
                eprintln!("{control}: {} [{tier}]", record.coverage);
                eprintln!("  policy:         {}", record.policy);
                eprintln!("  platform:       {}", record.platform_coverage);
                eprintln!("  implementation: {}", record.implementation);
                eprintln!("  opportunity:    {}", record.opportunity);
                eprintln!("  priority:       {}", record.priority);
            }
            Lookup::NotMapped { control, .. } => eprintln!("{control}: {NOT_MAPPED}"),
            Lookup::NoIdentifier { input } => {
                eprintln!("{input:?}: {NOT_MAPPED} (no control identifier)")
            }
        }
    }
    Ok(())
}
