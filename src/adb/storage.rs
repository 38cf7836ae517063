use serde::{Deserialize, Serialize};

use crate::common::errors::CleanerError;

/// Disk usage of one partition, as reported by `df -h`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub total: String,
    pub used: String,
    pub available: String,
    pub use_percent: String,
}

impl Default for StorageInfo {
    fn default() -> Self {
        let na = || "N/A".to_string();
        Self {
            total: na(),
            used: na(),
            available: na(),
            use_percent: na(),
        }
    }
}

impl StorageInfo {
    /// Parse a `df` table, falling back to all-"N/A" on unexpected output
    pub fn from_df_output(output: &str) -> Self {
        Self::parse_df(output).unwrap_or_default()
    }

    /// Strict variant of [`StorageInfo::from_df_output`].
    ///
    /// Reads the first data row after the header. `df` wraps the row when the
    /// filesystem name is long, so a short row is joined with the next line.
    pub fn parse_df(output: &str) -> Result<Self, CleanerError> {
        let failure = || CleanerError::ParseFailure {
            what: "df output",
            input: output.to_string(),
        };

        let mut rows = output.lines().map(str::trim).filter(|l| !l.is_empty()).skip(1);
        let mut fields: Vec<&str> = rows.next().ok_or_else(failure)?.split_whitespace().collect();
        if fields.len() == 1 {
            if let Some(rest) = rows.next() {
                fields.extend(rest.split_whitespace());
            }
        }
        if fields.len() < 5 {
            return Err(failure());
        }

        Ok(Self {
            total: fields[1].to_string(),
            used: fields[2].to_string(),
            available: fields[3].to_string(),
            use_percent: fields[4].to_string(),
        })
    }

    pub fn is_known(&self) -> bool {
        self.total != "N/A"
    }
}
