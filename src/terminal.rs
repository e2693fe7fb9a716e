// ABOUTME: Terminal implementation of the roster UI: prints the view as a table and prompts on stdin.
// ABOUTME: Generic over its reader and writer so tests can drive it with in-memory buffers.

use std::io::{BufRead, Write};

use rollbook_core::{StoreView, Ui};

const HEADERS: [&str; 5] = ["Roll", "Name", "Department", "Semester", "CGPA"];

pub struct TerminalUi<R, W> {
    input: R,
    out: W,
    assume_yes: bool,
}

impl<R: BufRead, W: Write> TerminalUi<R, W> {
    pub fn new(input: R, out: W, assume_yes: bool) -> Self {
        Self {
            input,
            out,
            assume_yes,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn write_table(&mut self, rows: &[[String; 5]]) -> std::io::Result<()> {
        if rows.is_empty() {
            return writeln!(self.out, "No records.");
        }

        let mut widths = HEADERS.map(str::len);
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header = HEADERS.map(str::to_string);
        for line in std::iter::once(&header).chain(rows) {
            let cells: Vec<String> = line
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect();
            writeln!(self.out, "{}", cells.join("  ").trim_end())?;
        }
        writeln!(self.out, "{} record(s)", rows.len())
    }
}

impl<R: BufRead, W: Write> Ui for TerminalUi<R, W> {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        if write!(self.out, "{} [y/N] ", message)
            .and_then(|_| self.out.flush())
            .is_err()
        {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!("failed to read confirmation: {}", e);
                false
            }
        }
    }

    fn render(&mut self, view: StoreView<'_>) {
        let rows: Vec<[String; 5]> = view
            .map(|row| {
                let record = row.record;
                [
                    record.roll.clone(),
                    record.name.clone(),
                    record.department.clone(),
                    record.semester.clone(),
                    record.cgpa.map(|c| c.to_string()).unwrap_or_default(),
                ]
            })
            .collect();

        if let Err(e) = self.write_table(&rows) {
            tracing::warn!("failed to render table: {}", e);
        }
    }
}
