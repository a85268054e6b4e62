//! Interactive console
//!
//! Line-oriented prompts for the target and the operation menu. Generic over
//! the reader and writer so prompts can be driven from memory in tests.

use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use tracing::warn;

use quickosint_core::{InvestigationReport, InvestigationTarget, Operation, OperationSet};

const MENU: &[&str] = &[
    "Select investigation type:",
    "  1. Web-based investigation (DNS + Geolocation)",
    "  2. Non-web investigation (Social Media Search)",
    "  3. Run all operations",
    "  4. Custom selection",
];

/// Prompt reader plus report writer
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Ask for a target until one classifies
    pub fn prompt_target(&mut self) -> Result<InvestigationTarget> {
        loop {
            let line = self.read_line("Enter target (domain, hostname, IP address or username): ")?;
            match InvestigationTarget::parse(&line) {
                Ok(target) => return Ok(target),
                Err(e) => writeln!(self.output, "{}. Please try again.", e)?,
            }
        }
    }

    /// Show the operation menu until a non-empty selection is made
    pub fn prompt_operations(&mut self) -> Result<OperationSet> {
        loop {
            writeln!(self.output)?;
            for line in MENU {
                writeln!(self.output, "{}", line)?;
            }

            let choice = self.read_line("Choice [1-4]: ")?;
            match choice.as_str() {
                "1" => return Ok(OperationSet::web()),
                "2" => return Ok(OperationSet::empty().with(Operation::Social)),
                "3" => return Ok(OperationSet::all()),
                "4" => {
                    if let Some(selection) = self.prompt_custom()? {
                        return Ok(selection);
                    }
                }
                other => writeln!(self.output, "Invalid choice: {:?}", other)?,
            }
        }
    }

    /// Write the rendered report
    pub fn print_report(&mut self, report: &InvestigationReport) -> Result<()> {
        write!(self.output, "{}", report.render())?;
        self.output.flush()?;
        Ok(())
    }

    fn prompt_custom(&mut self) -> Result<Option<OperationSet>> {
        let line = self.read_line("Operations (comma-separated: dns, geo, social, whois, all): ")?;
        let (selection, unknown) = OperationSet::parse_list(&line);

        for entry in &unknown {
            warn!("Skipping unknown operation: {}", entry);
            writeln!(self.output, "Skipping unknown operation: {}", entry)?;
        }
        if selection.is_empty() {
            writeln!(self.output, "No valid operations selected.")?;
            return Ok(None);
        }

        let answer = self.read_line(&format!("Run {}? [y/N]: ", selection))?;
        if matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes") {
            Ok(Some(selection))
        } else {
            writeln!(self.output, "Selection cancelled.")?;
            Ok(None)
        }
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from input")?;
        if read == 0 {
            bail!("Input ended before a selection was made");
        }
        Ok(line.trim().to_string())
    }
}
