use std::path::Path;

use serde::Deserialize;

use crate::error::{ReportError, Result};

/// Knobs for the join. The status export is read by column position, so
/// its layout lives here rather than in the join logic.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    /// Column holding the loan identifier in the status export (sheet column A).
    pub status_id_column: usize,
    /// Column holding the recovery status code (sheet column BF).
    pub status_code_column: usize,
    pub bad_debt_status: String,
    pub open_case_code: String,
    pub missing_status: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            status_id_column: 0,
            status_code_column: 57,
            bad_debt_status: "Bad Debt".to_string(),
            open_case_code: "defaulted".to_string(),
            missing_status: "N/A".to_string(),
        }
    }
}

impl ReportSettings {
    pub fn from_toml(input: &str) -> Result<Self> {
        let settings: ReportSettings =
            toml::from_str(input).map_err(|e| ReportError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReportError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<()> {
        if self.status_id_column == self.status_code_column {
            return Err(ReportError::Config(format!(
                "status_id_column and status_code_column must differ (both {})",
                self.status_id_column
            )));
        }
        if self.bad_debt_status.is_empty() || self.open_case_code.is_empty() {
            return Err(ReportError::Config(
                "bad_debt_status and open_case_code must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let s = ReportSettings::from_toml("").unwrap();
        assert_eq!(s.status_id_column, 0);
        assert_eq!(s.status_code_column, 57);
        assert_eq!(s.bad_debt_status, "Bad Debt");
        assert_eq!(s.open_case_code, "defaulted");
        assert_eq!(s.missing_status, "N/A");
    }

    #[test]
    fn partial_override() {
        let s = ReportSettings::from_toml("status_code_column = 12\n").unwrap();
        assert_eq!(s.status_code_column, 12);
        assert_eq!(s.status_id_column, 0);
    }

    #[test]
    fn reject_same_columns() {
        let err = ReportSettings::from_toml("status_code_column = 0\n").unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn reject_unknown_field() {
        assert!(ReportSettings::from_toml("status_colum = 3\n").is_err());
    }

    #[test]
    fn reject_missing_file() {
        let err = ReportSettings::from_path(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }
}
