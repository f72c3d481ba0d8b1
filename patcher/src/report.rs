//! Human-readable, color-coded console report.
//!
//! Rendering returns lines instead of printing so the output is testable;
//! `main` writes them to stdout. Colors are dropped when `NO_COLOR` is set or
//! `--no-color` is passed.

use colored::Colorize;

use crate::apply::{RunReport, RunStatus};
use crate::core::types::PatchResult;
use crate::io::locate::Installation;
use crate::status::{TargetState, TargetStatus};
use crate::targets::viewer::WS_FILTER_RULE;

const RULE: &str = "═══════════════════════════════════════════════════════════════";

/// Disable colors globally for this process.
pub fn init_color(no_color_flag: bool) {
    let env_disabled = std::env::var("NO_COLOR")
        .map(|v| !v.is_empty())
        .unwrap_or(false);
    if no_color_flag || env_disabled {
        colored::control::set_override(false);
    }
}

pub fn banner() -> Vec<String> {
    vec![
        String::new(),
        "╔══════════════════════════════════════════════════════════════╗"
            .cyan()
            .to_string(),
        "║           playwright-ws-trace - WebSocket Tracing            ║"
            .cyan()
            .to_string(),
        "╚══════════════════════════════════════════════════════════════╝"
            .cyan()
            .to_string(),
        String::new(),
    ]
}

/// Full report for `ws-patcher apply`.
pub fn render(report: &RunReport) -> Vec<String> {
    let mut lines = banner();
    match report.status() {
        RunStatus::Skipped => {
            lines.push(
                "Not running as postinstall. Use --force to run manually."
                    .yellow()
                    .to_string(),
            );
            lines.push("Example: ws-patcher apply --force".yellow().to_string());
            return lines;
        }
        RunStatus::NotFound => {
            lines.push("⚠️  No Playwright installation found.".yellow().to_string());
            lines.push(
                "   Install @playwright/test first, then reinstall this package."
                    .yellow()
                    .to_string(),
            );
            lines.push(String::new());
            return lines;
        }
        RunStatus::Patched | RunStatus::Failed => {}
    }

    if let Some(installation) = &report.installation {
        lines.push(found_line(installation, report.version.as_deref()).green().to_string());
    }
    lines.push(String::new());
    lines.push("Applying patches...".bold().to_string());
    lines.push(String::new());

    lines.push("1. Patching WebSocket recording...".cyan().to_string());
    if let Some(result) = &report.recorder {
        lines.extend(result_lines(result));
    }
    lines.push("2. Patching trace viewer...".cyan().to_string());
    if let Some(result) = &report.viewer {
        lines.extend(result_lines(result));
    }
    lines.push(String::new());

    if report.status() == RunStatus::Patched {
        lines.push(RULE.green().to_string());
        lines.push("✓ Playwright WebSocket tracing enabled!".green().to_string());
        lines.push(RULE.green().to_string());
        lines.push(String::new());
        lines.push(
            "WebSocket frames will now be recorded in your traces."
                .cyan()
                .to_string(),
        );
        lines.push(String::new());
        if report.viewer_ok() {
            lines.push(
                "ℹ️  Use npx playwright show-trace <trace.zip> to view traces"
                    .cyan()
                    .to_string(),
            );
        } else {
            let filter = if filter_added(report.viewer.as_ref()) {
                "added"
            } else {
                "not added"
            };
            lines.push(
                format!("ℹ️  Trace viewer: WS filter {filter}, but full WebSocket panel requires")
                    .yellow()
                    .to_string(),
            );
            lines.push(
                "   the custom-built viewer. Run: npx playwright-ws-trace view <trace.zip>"
                    .yellow()
                    .to_string(),
            );
        }
    } else {
        lines.push(RULE.red().to_string());
        lines.push("✗ Failed to patch Playwright".red().to_string());
        lines.push(RULE.red().to_string());
        lines.push(String::new());
        lines.push(
            "Your Playwright version may not be compatible."
                .yellow()
                .to_string(),
        );
        lines.push(format!("Tested with: {}", report.tested_with).yellow().to_string());
    }
    lines.push(String::new());
    lines
}

/// Output of `ws-patcher locate`.
pub fn render_location(installation: &Installation, version: Option<&str>) -> Vec<String> {
    vec![found_line(installation, version).green().to_string()]
}

/// Output of `ws-patcher status`.
pub fn render_status(installation: &Installation, statuses: &[TargetStatus]) -> Vec<String> {
    let mut lines = vec![found_line(installation, None).green().to_string()];
    for status in statuses {
        let line = match &status.state {
            TargetState::Patched => format!("  ✓ {} patched", status.target).green(),
            TargetState::Unpatched => format!("  • {} not patched", status.target).yellow(),
            TargetState::Missing(reason) => format!("  ✗ {}: {reason}", status.target).red(),
        };
        lines.push(line.to_string());
    }
    lines
}

fn filter_added(viewer: Option<&PatchResult>) -> bool {
    viewer.is_some_and(|result| result.rules_applied.iter().any(|rule| rule == WS_FILTER_RULE))
}

fn found_line(installation: &Installation, version: Option<&str>) -> String {
    match version {
        Some(version) => format!(
            "Found playwright-core {version}: {}",
            installation.root.display()
        ),
        None => format!("Found playwright-core: {}", installation.root.display()),
    }
}

fn result_lines(result: &PatchResult) -> Vec<String> {
    let mut lines = Vec::new();
    if result.already_patched {
        lines.push(format!("  {} already patched ✓", result.target).cyan().to_string());
        return lines;
    }
    if result.applied {
        if result.rules_applied.is_empty() {
            lines.push(format!("  ✓ Installed custom {}", result.target).green().to_string());
        } else {
            for rule in &result.rules_applied {
                lines.push(format!("  ✓ Added {rule} to {}", result.target).green().to_string());
            }
        }
    }
    for rule in &result.rules_skipped {
        lines.push(format!("  {rule} not added to {}", result.target).yellow().to_string());
    }
    if let Some(reason) = &result.reason {
        lines.push(format!("  {}: {reason}", result.target).red().to_string());
    }
    lines
}
