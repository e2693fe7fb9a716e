// ABOUTME: Replays a JSON-lines script of UI events against a roster.
// ABOUTME: Domain errors are reported per line and skipped; malformed lines abort the replay.

use std::io::{BufRead, Write};

use anyhow::Context;
use rollbook_core::{Outcome, Roster, StorageProvider, Ui, UiEvent};

/// Counts of how each scripted event ended.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub declined: usize,
    pub failed: usize,
}

/// Dispatch every event in `script`. Blank lines and lines starting with
/// `#` are skipped. Rejected events are written to `errors` and counted.
pub fn replay<S, R>(
    roster: &mut Roster<S>,
    ui: &mut dyn Ui,
    script: R,
    errors: &mut dyn Write,
) -> anyhow::Result<ReplaySummary>
where
    S: StorageProvider,
    R: BufRead,
{
    let mut summary = ReplaySummary::default();

    for (number, line) in script.lines().enumerate() {
        let number = number + 1;
        let line = line.with_context(|| format!("failed to read line {}", number))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event: UiEvent = serde_json::from_str(line)
            .with_context(|| format!("line {} is not a valid event", number))?;

        match roster.dispatch(event, ui) {
            Ok(Outcome::Declined) => summary.declined += 1,
            Ok(_) => summary.applied += 1,
            Err(e) => {
                summary.failed += 1;
                writeln!(errors, "line {}: {}", number, e)?;
            }
        }
    }

    tracing::info!(
        "replayed script: {} applied, {} declined, {} failed",
        summary.applied,
        summary.declined,
        summary.failed
    );
    Ok(summary)
}
