use crate::args::{Cli, Command};
use crate::config::{ActionModeSetting, AppConfig};
use anyhow::Context;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use themer::action::{ActionMode, CollectingExecutor, QueuedExecutor};
use themer::platform::SnapshotPlatform;
use themer::theme::{ApplyReport, ThemeValidator, ValidationReport};
use themer::{Themer, ThemerBuilder};

/// Outcome of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// The command ran but its subject was rejected.
    Failure,
}

pub async fn run(cli: &Cli, config: &AppConfig, out: &mut dyn Write) -> anyhow::Result<CommandStatus> {
    let themes_dir = cli
        .themes_dir
        .clone()
        .unwrap_or_else(|| config.themes_dir());
    let platform = SnapshotPlatform::load(&cli.snapshot)
        .with_context(|| format!("loading guild snapshot {}", cli.snapshot.display()))?;

    match &cli.command {
        Command::List => {
            let themer = build(config, &themes_dir, &platform)?;
            list(&themer, out)
        }
        Command::Show { name } => {
            let themer = build(config, &themes_dir, &platform)?;
            let token = themer.theme_token(name)?;
            writeln!(out, "{}", serde_json::to_string_pretty(token)?)?;
            Ok(CommandStatus::Success)
        }
        Command::Validate { file } => validate(&themes_dir, file, &platform, out),
        Command::Apply {
            name,
            dry_run,
            save,
        } => {
            let themer = build(config, &themes_dir, &platform)?;
            let status = apply(&themer, config, name, *dry_run, out).await?;
            if *save && !*dry_run {
                platform
                    .save(&cli.snapshot)
                    .with_context(|| format!("saving guild snapshot {}", cli.snapshot.display()))?;
                writeln!(out, "Snapshot saved to {}", cli.snapshot.display())?;
            }
            Ok(status)
        }
        Command::Capture { name, register } => {
            std::fs::create_dir_all(&themes_dir)
                .with_context(|| format!("creating theme directory {}", themes_dir.display()))?;
            let mut themer = build(config, &themes_dir, &platform)?;
            let path = themer.capture_server(name, *register).await?;
            writeln!(out, "Captured guild into {}", path.display())?;
            Ok(CommandStatus::Success)
        }
    }
}

fn build(config: &AppConfig, themes_dir: &Path, platform: &SnapshotPlatform) -> anyhow::Result<Themer> {
    let themer = ThemerBuilder::new()
        .themes_dir(themes_dir)
        .user_agent(config.user_agent())
        .build(Arc::new(platform.clone()))?;
    Ok(themer)
}

fn list(themer: &Themer, out: &mut dyn Write) -> anyhow::Result<CommandStatus> {
    let names = themer.theme_names();
    if names.is_empty() {
        writeln!(out, "No themes in {}", themer.themes_dir().display())?;
        return Ok(CommandStatus::Success);
    }
    for name in names {
        let token = themer.theme_token(&name)?;
        writeln!(
            out,
            "{name}\t{}\t(Parser: {})",
            token.display_name(),
            token.parser_version()
        )?;
    }
    Ok(CommandStatus::Success)
}

fn validate(
    themes_dir: &Path,
    file: &Path,
    platform: &SnapshotPlatform,
    out: &mut dyn Write,
) -> anyhow::Result<CommandStatus> {
    let report = ThemeValidator::new(themes_dir).validate(file, platform);
    print_report(&report, out)?;
    Ok(if report.is_accepted() {
        CommandStatus::Success
    } else {
        CommandStatus::Failure
    })
}

fn print_report(report: &ValidationReport, out: &mut dyn Write) -> anyhow::Result<()> {
    for diagnostic in report.diagnostics() {
        let label = if diagnostic.is_error() { "error" } else { "warning" };
        writeln!(out, "{label}: {diagnostic}")?;
    }
    let verdict = if report.is_accepted() { "accepted" } else { "rejected" };
    writeln!(out, "{}: {verdict}", report.file().display())?;
    Ok(())
}

async fn apply(
    themer: &Themer,
    config: &AppConfig,
    name: &str,
    dry_run: bool,
    out: &mut dyn Write,
) -> anyhow::Result<CommandStatus> {
    if dry_run {
        let collector = Arc::new(CollectingExecutor::new());
        let report = themer
            .set_server_theme_with(name, &ActionMode::deferred(collector.clone()))
            .await?;
        writeln!(out, "Dry run, nothing was sent:")?;
        print_apply(&report, out)?;
        return Ok(CommandStatus::Success);
    }

    let report = match config.action_mode()? {
        ActionModeSetting::Immediate => themer.set_server_theme(name).await?,
        ActionModeSetting::Queue => {
            let executor = Arc::new(QueuedExecutor::start(config.queue().clone())?);
            let report = themer
                .set_server_theme_with(name, &ActionMode::deferred(executor.clone()))
                .await;
            executor.shutdown().await;
            report?
        }
    };
    print_apply(&report, out)?;
    Ok(CommandStatus::Success)
}

fn print_apply(report: &ApplyReport, out: &mut dyn Write) -> anyhow::Result<()> {
    for kind in &report.issued {
        writeln!(out, "  issued: {kind}")?;
    }
    for skipped in &report.skipped {
        writeln!(out, "  skipped: {} ({})", skipped.step, skipped.reason)?;
    }
    for failure in &report.asset_failures {
        writeln!(out, "  failed: {failure}")?;
    }
    Ok(())
}
