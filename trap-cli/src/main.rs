use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use trap_core::batch::{run_batch, ErrorPolicy};
use trap_core::builder::{DownlinkOptions, DEFAULT_MINIMAL_SAMPLE_PERIOD};
use trap_core::types::{is_valid_dev_eui, AdditionalData, Output, PayloadFormat};

#[derive(Parser)]
#[command(
    name = "trap-commissioner",
    about = "Generate LoRaWAN commissioning downlinks for steam-trap monitoring sensors"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an input sheet into grouped downlink payloads
    Convert {
        /// ConfigTable sheet (CSV export)
        #[arg(long)]
        config_table: PathBuf,

        /// ptMap sheet (CSV export)
        #[arg(long)]
        pt_map: PathBuf,

        /// Per-device input sheet (CSV export)
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// JSON indentation width (0 = compact)
        #[arg(long, default_value_t = 4)]
        indent: usize,

        /// Compressed downlink option (1, 2 or 3)
        #[arg(long, default_value_t = 2)]
        compression_level: u8,

        /// Temporary sample period (seconds) used while a long command
        /// queue drains
        #[arg(long, default_value_t = DEFAULT_MINIMAL_SAMPLE_PERIOD)]
        minimal_sample_period: u32,

        /// Payload encoding (HexString, Uint8Array, Base64String)
        #[arg(long, default_value = "HexString")]
        payload_format: String,

        /// Extra key-value fields merged into every downlink, as a
        /// JSON object
        #[arg(long)]
        additional: Option<String>,

        /// Abort the batch on an invalid devEUI instead of continuing
        /// with a placeholder
        #[arg(long)]
        abort_on_invalid_dev_eui: bool,

        /// Abort the batch on a missing devEUI instead of skipping the
        /// row
        #[arg(long)]
        abort_on_missing_dev_eui: bool,

        /// Log and skip rows that fail to encode instead of aborting
        #[arg(long)]
        continue_on_error: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate the input sheet without writing any output
    Check {
        /// ConfigTable sheet (CSV export)
        #[arg(long)]
        config_table: PathBuf,

        /// ptMap sheet (CSV export)
        #[arg(long)]
        pt_map: PathBuf,

        /// Per-device input sheet (CSV export)
        #[arg(short, long)]
        input: PathBuf,

        /// Suppress per-row output
        #[arg(short, long)]
        quiet: bool,
    },
}

fn parse_payload_format(s: &str) -> Result<PayloadFormat> {
    match s {
        "HexString" => Ok(PayloadFormat::HexString),
        "Uint8Array" => Ok(PayloadFormat::Uint8Array),
        "Base64String" => Ok(PayloadFormat::Base64String),
        other => bail!("Unknown payload format: {other}. Use HexString, Uint8Array or Base64String"),
    }
}

fn parse_additional(s: Option<&str>) -> Result<AdditionalData> {
    match s {
        None => Ok(AdditionalData::new()),
        Some(json) => serde_json::from_str(json)
            .context("--additional must be a JSON object of key-value pairs"),
    }
}

/// Render the output mapping with the configured indentation.
fn to_json(output: &Output, indent: usize) -> Result<Vec<u8>> {
    if indent == 0 {
        return Ok(serde_json::to_vec(output)?);
    }
    let indent_str = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent_str.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    output.serialize(&mut serializer)?;
    Ok(buf)
}

#[allow(clippy::fn_params_excessive_bools)]
fn run_convert(
    config_table: &Path,
    pt_map: &Path,
    input: &Path,
    output: &Path,
    indent: usize,
    compression_level: u8,
    minimal_sample_period: u32,
    payload_format: &str,
    additional: Option<&str>,
    abort_on_invalid_dev_eui: bool,
    abort_on_missing_dev_eui: bool,
    continue_on_error: bool,
    verbose: bool,
) -> Result<()> {
    if verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let options = DownlinkOptions {
        payload_format: parse_payload_format(payload_format)?,
        minimal_sample_period,
        compression_level,
        additional: parse_additional(additional)?,
    };
    let policy = ErrorPolicy {
        continue_on_invalid_dev_eui: !abort_on_invalid_dev_eui,
        continue_on_missing_dev_eui: !abort_on_missing_dev_eui,
        continue_on_unexpected_error: continue_on_error,
    };

    let config_rows = trap_sheets::load_config_table(config_table)
        .with_context(|| format!("reading config table from {}", config_table.display()))?;
    let pt_rows = trap_sheets::load_pt_map(pt_map)
        .with_context(|| format!("reading pt map from {}", pt_map.display()))?;
    let records = trap_sheets::load_input(input)
        .with_context(|| format!("reading input sheet from {}", input.display()))?;

    log::info!(
        "loaded {} config rows, {} pt map rows, {} input rows",
        config_rows.len(),
        pt_rows.len(),
        records.len()
    );

    let report = run_batch(&records, &config_rows, &pt_rows, &options, &policy)
        .context("batch aborted")?;

    let json = to_json(&report.output, indent)?;
    std::fs::write(output, json).with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Processed {}/{} successfully, {} failed.",
        report.total - report.failed,
        report.total,
        report.failed
    );
    println!(
        "There were {} missing devEUIs and {} invalid devEUIs of all ({}) failed rows.",
        report.missing_dev_eui, report.invalid_dev_eui, report.failed
    );
    println!(
        "Done, exported generated configuration downlinks as {}",
        output.display()
    );

    Ok(())
}

fn run_check(config_table: &Path, pt_map: &Path, input: &Path, quiet: bool) -> Result<()> {
    let config_rows = trap_sheets::load_config_table(config_table)
        .with_context(|| format!("reading config table from {}", config_table.display()))?;
    let pt_rows = trap_sheets::load_pt_map(pt_map)
        .with_context(|| format!("reading pt map from {}", pt_map.display()))?;
    let records = trap_sheets::load_input(input)
        .with_context(|| format!("reading input sheet from {}", input.display()))?;

    if pt_rows.is_empty() {
        bail!("pt map {} has no rows", pt_map.display());
    }

    let mut identity_errors = 0usize;
    let mut unmatched = 0usize;
    for (index, record) in records.iter().enumerate() {
        let row = index + 1;
        match record.dev_eui.as_deref().map(str::trim) {
            None | Some("") => {
                identity_errors += 1;
                if !quiet {
                    println!("row {row}: missing devEUI");
                }
            }
            Some(raw) if !is_valid_dev_eui(raw) => {
                identity_errors += 1;
                if !quiet {
                    println!("row {row}: invalid devEUI '{raw}'");
                }
            }
            Some(_) => {}
        }
        if trap_core::match_config(record, &config_rows).is_none() {
            unmatched += 1;
            if !quiet {
                println!("row {row}: no matching configuration");
            }
        }
    }

    println!(
        "Checked {} rows: {} without a matching configuration, {} devEUI errors.",
        records.len(),
        unmatched,
        identity_errors
    );
    if identity_errors > 0 {
        bail!(
            "{} devEUI error{} in {}",
            identity_errors,
            if identity_errors == 1 { "" } else { "s" },
            input.display()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            config_table,
            pt_map,
            input,
            output,
            indent,
            compression_level,
            minimal_sample_period,
            payload_format,
            additional,
            abort_on_invalid_dev_eui,
            abort_on_missing_dev_eui,
            continue_on_error,
            verbose,
        } => run_convert(
            &config_table,
            &pt_map,
            &input,
            &output,
            indent,
            compression_level,
            minimal_sample_period,
            &payload_format,
            additional.as_deref(),
            abort_on_invalid_dev_eui,
            abort_on_missing_dev_eui,
            continue_on_error,
            verbose,
        ),

        Command::Check {
            config_table,
            pt_map,
            input,
            quiet,
        } => run_check(&config_table, &pt_map, &input, quiet),
    }
}
