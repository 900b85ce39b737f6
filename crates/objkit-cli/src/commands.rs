use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use objkit_merge::{merge_with, MergeOptions};
use objkit_ops::{
    flatten, omit, pick, validate, OmitOptions, PickOptions, Schema, ValidateOptions,
    ValidationReport,
};
use objkit_types::{Graph, Value};
use serde_json::Value as Json;
use tracing::debug;

use crate::cli::*;
use crate::config::Config;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let format = cli.format;

    match cli.command {
        Command::Merge(args) => {
            let options = merge_options(&args, config.merge);
            print_json(&merge_files(&args.files, &options)?, format)
        }
        Command::Pick(args) => {
            let options = PickOptions {
                strict: config.pick.strict && !args.lenient,
            };
            let record = read_json(&args.file)?;
            print_json(&Json::Object(pick(&record, &args.keys, &options)?), format)
        }
        Command::Omit(args) => {
            let options = OmitOptions {
                strict: config.omit.strict || args.strict,
                deep: config.omit.deep || args.deep,
            };
            let record = read_json(&args.file)?;
            print_json(&Json::Object(omit(&record, &args.keys, &options)?), format)
        }
        Command::Flatten(args) => {
            let record = read_json(&args.file)?;
            print_json(&Json::Object(flatten(&record)?), format)
        }
        Command::Validate(args) => {
            let options = ValidateOptions {
                strict: config.validate.strict || args.strict,
                allow_extra: config.validate.allow_extra && !args.no_extra,
            };
            let report = validate_file(&args.file, &args.schema, &options)?;
            print_report(&report, format)?;
            if !report.is_valid {
                bail!("{} validation error(s)", report.errors.len());
            }
            Ok(())
        }
    }
}

fn merge_options(args: &MergeArgs, base: MergeOptions) -> MergeOptions {
    let mut options = base;
    if args.shallow {
        options.deep = false;
    }
    if args.arrays {
        options.arrays = true;
    }
    if let Some(strategy) = args.strategy {
        options.strategy = strategy;
    }
    options
}

/// Merge the files in order: the first is the target.
fn merge_files(files: &[PathBuf], options: &MergeOptions) -> anyhow::Result<Json> {
    let mut graph = Graph::new();
    let mut values: Vec<Value> = Vec::with_capacity(files.len());
    for file in files {
        values.push(graph.ingest(&read_json(file)?));
    }
    let Some((target, sources)) = values.split_first() else {
        bail!("merge needs at least one file");
    };

    debug!(files = files.len(), "merging files");
    let merged = merge_with(&mut graph, target, sources, options)?;
    Ok(graph.to_json(&merged)?)
}

fn validate_file(
    file: &Path,
    schema: &Path,
    options: &ValidateOptions,
) -> anyhow::Result<ValidationReport> {
    let record = read_json(file)?;
    let schema = Schema::from_json(&read_json(schema)?)
        .with_context(|| format!("loading schema {}", schema.display()))?;
    Ok(validate(&record, &schema, options)?)
}

fn read_json(path: &Path) -> anyhow::Result<Json> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json(value: &Json, format: OutputFormat) -> anyhow::Result<()> {
    let text = match format {
        OutputFormat::Text => serde_json::to_string_pretty(value)?,
        OutputFormat::Json => serde_json::to_string(value)?,
    };
    println!("{text}");
    Ok(())
}

fn print_report(report: &ValidationReport, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    if report.is_valid {
        println!("{} Valid", "✓".green().bold());
        return Ok(());
    }
    println!("{} {} error(s)", "✗".red().bold(), report.errors.len());
    for issue in &report.errors {
        println!("  {} {}", issue.path.yellow(), issue.message);
    }
    Ok(())
}
