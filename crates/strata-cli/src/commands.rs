use std::io::{self, Write};

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::Value;
use strata_store::{Config, Item, SaveOutcome};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::open(&cli.dir)
        .with_context(|| format!("opening configuration at {}", cli.dir.display()))?;
    let stdout = io::stdout();
    execute(cli.command, &mut config, cli.format, &mut stdout.lock())
}

pub fn execute(
    command: Command,
    config: &mut Config,
    format: OutputFormat,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Show => print_value(out, &config.effective(), format),
        Command::Get(args) => cmd_get(args, config, format, out),
        Command::Set(args) => cmd_set(args, config, out),
        Command::Unset(args) => cmd_unset(args, config, out),
        Command::Keys(args) => cmd_keys(args, config, format, out),
        Command::Diff => {
            let overlay = config.overlay();
            if format == OutputFormat::Text && overlay.as_object().is_some_and(|o| o.is_empty()) {
                writeln!(out, "No changes from defaults.")?;
                return Ok(());
            }
            print_value(out, &overlay, format)
        }
    }
}

fn cmd_get(args: GetArgs, config: &mut Config, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let path = split_path(&args.path)?;
    let value = config
        .path(&path)
        .ok()
        .and_then(|item| item.to_value())
        .with_context(|| format!("no config item at '{}'", args.path))?;
    print_value(out, &value, format)
}

fn cmd_set(args: SetArgs, config: &mut Config, out: &mut impl Write) -> anyhow::Result<()> {
    let path = split_path(&args.path)?;
    let value = parse_value(&args.value);
    config
        .set_path(&path, &value)
        .with_context(|| format!("setting '{}'", args.path))?;
    let outcome = config.save().context("saving user configuration")?;
    writeln!(out, "{} Set {} = {}", "✓".green().bold(), args.path.bold(), value)?;
    report_outcome(out, outcome)
}

fn cmd_unset(args: UnsetArgs, config: &mut Config, out: &mut impl Write) -> anyhow::Result<()> {
    let path = split_path(&args.path)?;
    let removed = match path.split_last() {
        Some((last, [])) => config.remove(last),
        Some((last, parents)) => match config.path(parents) {
            Ok(Item::Object(mut view)) => view.remove(last),
            Ok(Item::Value(_)) => bail!("'{}' is not inside an object", args.path),
            Err(e) => Err(e),
        },
        None => unreachable!("split_path never returns an empty path"),
    };
    removed.with_context(|| format!("unsetting '{}'", args.path))?;
    let outcome = config.save().context("saving user configuration")?;
    writeln!(out, "{} Unset {}", "✓".green().bold(), args.path.bold())?;
    report_outcome(out, outcome)
}

fn cmd_keys(args: KeysArgs, config: &mut Config, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let keys = if args.defaults { config.default_keys() } else { config.keys() };
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&keys)?)?,
        OutputFormat::Text => {
            for key in keys {
                writeln!(out, "{key}")?;
            }
        }
    }
    Ok(())
}

fn report_outcome(out: &mut impl Write, outcome: SaveOutcome) -> anyhow::Result<()> {
    match outcome {
        SaveOutcome::Written => writeln!(out, "  user overlay {}", "written".cyan())?,
        SaveOutcome::Removed => writeln!(out, "  user overlay {} (matches defaults)", "removed".yellow())?,
        SaveOutcome::Unchanged => writeln!(out, "  user overlay {}", "unchanged".dimmed())?,
    }
    Ok(())
}

fn print_value(out: &mut impl Write, value: &Value, format: OutputFormat) -> anyhow::Result<()> {
    match (format, value) {
        (OutputFormat::Text, Value::String(s)) => writeln!(out, "{s}")?,
        _ => writeln!(out, "{}", serde_json::to_string_pretty(value)?)?,
    }
    Ok(())
}

/// Split `a.b.c` into its segments, rejecting empty ones.
pub fn split_path(path: &str) -> anyhow::Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        bail!("invalid key path '{path}': segments must not be empty");
    }
    Ok(segments)
}

/// Parse a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}
