use std::fmt;

/// Outcome tallies for one run. Only lives as long as the process.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunReport {
    pub processed: usize,
    pub replaced: usize,
    pub not_found: Vec<String>,
    pub conflicts: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "- processed: {}", self.processed)?;
        writeln!(f, "- replaced with casks: {}", self.replaced)?;
        if !self.skipped.is_empty() {
            writeln!(f, "- skipped: {}", self.skipped.len())?;
        }
        if !self.failed.is_empty() {
            writeln!(f, "- could not remove: {}", self.failed.join(", "))?;
        }
        if !self.not_found.is_empty() {
            writeln!(f, "- no cask found for:")?;
            for n in &self.not_found { writeln!(f, "    {n}")?; }
        }
        if !self.conflicts.is_empty() {
            writeln!(f, "- install failed after removal (reinstall manually):")?;
            for n in &self.conflicts { writeln!(f, "    {n}")?; }
        }
        Ok(())
    }
}
