//! Colored terminal rendering of planned changes.

use calmirror_core::diff::DiffKind;
use calmirror_core::sync::{SyncPlan, SyncStats};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        colorize(*self, &self.to_string())
    }
}

fn colorize(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Insert => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

/// Above this many changes, print counts instead of individual events
const COMPACT_THRESHOLD: usize = 10;

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

pub fn render_plan(plan: &SyncPlan, verbose: bool) -> String {
    let changes = plan.diff.changes();
    let mut lines = Vec::new();

    if changes.is_empty() {
        lines.push("   No changes".dimmed().to_string());
    } else if verbose || changes.len() <= COMPACT_THRESHOLD {
        for (kind, id, summary) in &changes {
            let mut line = format!("   {} {}", kind.render(), colorize(*kind, summary));
            if verbose {
                line.push_str(&format!(" {}", id.dimmed()));
            }
            lines.push(line);
        }
    } else {
        let counts = [
            (DiffKind::Delete, plan.diff.to_delete.len(), "deleted"),
            (DiffKind::Update, plan.diff.to_update.len(), "changed"),
            (DiffKind::Insert, plan.diff.to_insert.len(), "new"),
        ];
        for (kind, count, label) in counts {
            if count > 0 {
                let text = format!("({} {} {})", count, label, pluralize("event", count));
                lines.push(format!("   {} {}", kind.render(), colorize(kind, &text)));
            }
        }
    }

    let series = plan.with_exceptions().count();
    if series > 0 {
        let text = format!(
            "   {} recurring {} with removed occurrences to check",
            series,
            pluralize("event", series)
        );
        lines.push(text.dimmed().to_string());
    }

    lines.join("\n")
}

pub fn render_stats(stats: &SyncStats) -> String {
    format!(
        "{} deleted, {} updated, {} inserted, {} exceptions cancelled",
        stats.deleted, stats.updated, stats.inserted, stats.exceptions.cancelled
    )
}
