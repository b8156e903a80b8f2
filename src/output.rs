use crate::types::{BadDebtReport, ReportDisplayRow, ReportRow, ReportTotals, Summary, SummaryExport};
use crate::util::{format_currency, format_int};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table};

pub const REPORT_CSV: &str = "bad_debt_report.csv";
pub const SUMMARY_JSON: &str = "bad_debt_summary.json";

/// User-facing label for a recovery status code. Unknown codes pass through.
pub fn status_label<'a>(code: &'a str, open_case_code: &str) -> &'a str {
    if code == open_case_code {
        return "Open Case";
    }
    match code {
        "closed_case" => "Closed Case",
        other => other,
    }
}

pub fn display_row(row: &ReportRow, open_case_code: &str) -> ReportDisplayRow {
    ReportDisplayRow {
        loan_id: row.loan_id.clone().unwrap_or_default(),
        principal_at_default: format_currency(row.principal_at_default),
        recovery_status: status_label(&row.recovery_status, open_case_code).to_string(),
        principal_recovered: format_currency(row.principal_recovered),
        interest_recovered: format_currency(row.interest_recovered),
        outstanding_balance: format_currency(row.outstanding_balance),
    }
}

pub fn totals_row(totals: &ReportTotals) -> ReportDisplayRow {
    ReportDisplayRow {
        loan_id: "Totals".to_string(),
        principal_at_default: format_currency(totals.principal_at_default),
        recovery_status: String::new(),
        principal_recovered: format_currency(totals.principal_recovered),
        interest_recovered: format_currency(totals.interest_recovered),
        outstanding_balance: format_currency(totals.outstanding_balance),
    }
}

/// Display rows followed by the totals line, or nothing when the report is empty.
pub fn display_table(report: &BadDebtReport, open_case_code: &str) -> Vec<ReportDisplayRow> {
    if report.rows.is_empty() {
        return Vec::new();
    }
    let mut rows: Vec<ReportDisplayRow> = report
        .rows
        .iter()
        .map(|row| display_row(row, open_case_code))
        .collect();
    rows.push(totals_row(&report.totals));
    rows
}

pub fn render_summary(summary: &Summary) -> String {
    format!(
        "Defaulted (Open) Cases: {}\nTotal Outstanding for Open Cases: {}",
        format_int(summary.defaulted_count),
        format_currency(summary.total_outstanding_for_defaulted)
    )
}

pub fn render_table(report: &BadDebtReport, open_case_code: &str) -> String {
    let rows = display_table(report, open_case_code);
    if rows.is_empty() {
        return "No bad debt loans found in the provided file.".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

pub fn print_report(report: &BadDebtReport, open_case_code: &str) {
    println!("Bad Debt Report\n");
    println!("{}\n", render_summary(&report.summary));
    println!("{}\n", render_table(report, open_case_code));
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write the table and the summary into `dir`.
pub fn export_report(
    report: &BadDebtReport,
    open_case_code: &str,
    dir: &Path,
) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    write_csv(&dir.join(REPORT_CSV), &display_table(report, open_case_code))?;
    let summary = SummaryExport {
        generated_at: chrono::Local::now().to_rfc3339(),
        report_rows: report.rows.len(),
        summary: &report.summary,
        totals: &report.totals,
    };
    write_json(&dir.join(SUMMARY_JSON), &summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: &str = "defaulted";

    fn sample_report() -> BadDebtReport {
        let rows = vec![
            ReportRow {
                loan_id: Some("L1".into()),
                principal_at_default: 1000.0,
                recovery_status: "defaulted".into(),
                principal_recovered: 0.0,
                interest_recovered: 0.0,
                outstanding_balance: 1000.0,
            },
            ReportRow {
                loan_id: Some("L2".into()),
                principal_at_default: 100.0,
                recovery_status: "closed_case".into(),
                principal_recovered: 120.0,
                interest_recovered: 5.5,
                outstanding_balance: -25.5,
            },
        ];
        BadDebtReport {
            summary: Summary {
                defaulted_count: 1,
                total_outstanding_for_defaulted: 1000.0,
            },
            totals: ReportTotals {
                principal_at_default: 1100.0,
                principal_recovered: 120.0,
                interest_recovered: 5.5,
                outstanding_balance: 974.5,
            },
            rows,
        }
    }

    #[test]
    fn labels_are_remapped() {
        assert_eq!(status_label("defaulted", OPEN), "Open Case");
        assert_eq!(status_label("closed_case", OPEN), "Closed Case");
        assert_eq!(status_label("N/A", OPEN), "N/A");
        assert_eq!(status_label("Defaulted", OPEN), "Defaulted");
    }

    #[test]
    fn configured_open_code_is_labelled_open() {
        assert_eq!(status_label("in_recovery", "in_recovery"), "Open Case");
        assert_eq!(status_label("defaulted", "in_recovery"), "defaulted");

        let mut report = sample_report();
        report.rows[0].recovery_status = "in_recovery".into();
        let rows = display_table(&report, "in_recovery");
        assert_eq!(rows[0].recovery_status, "Open Case");
    }

    #[test]
    fn display_table_formats_money_and_appends_totals() {
        let rows = display_table(&sample_report(), OPEN);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].recovery_status, "Open Case");
        assert_eq!(rows[0].principal_at_default, "£1,000.00");
        assert_eq!(rows[1].outstanding_balance, "-£25.50");
        assert_eq!(rows[2].loan_id, "Totals");
        assert_eq!(rows[2].recovery_status, "");
        assert_eq!(rows[2].outstanding_balance, "£974.50");
    }

    #[test]
    fn empty_report_renders_placeholder() {
        let report = BadDebtReport {
            summary: Summary::default(),
            rows: Vec::new(),
            totals: ReportTotals::default(),
        };
        assert!(display_table(&report, OPEN).is_empty());
        assert_eq!(
            render_table(&report, OPEN),
            "No bad debt loans found in the provided file."
        );
    }

    #[test]
    fn summary_text() {
        let text = render_summary(&sample_report().summary);
        assert!(text.contains("Defaulted (Open) Cases: 1"));
        assert!(text.contains("£1,000.00"));
    }

    #[test]
    fn table_has_headers() {
        let table = render_table(&sample_report(), OPEN);
        assert!(table.contains("Principal at Default"));
        assert!(table.contains("Closed Case"));
    }

    #[test]
    fn export_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        export_report(&sample_report(), OPEN, dir.path()).unwrap();

        let csv = std::fs::read_to_string(dir.path().join(REPORT_CSV)).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Loan ID,Principal at Default,Recovery Status,Principal Recovered,Interest Recovered,Outstanding Balance")
        );
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.contains("Totals"));

        let json = std::fs::read_to_string(dir.path().join(SUMMARY_JSON)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["report_rows"], 2);
        assert_eq!(value["summary"]["defaulted_count"], 1);
        assert_eq!(value["totals"]["outstanding_balance"], 974.5);
    }
}
