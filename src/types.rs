use serde::Serialize;
use tabled::Tabled;

/// One row of the loans export. Every field is optional because the
/// spreadsheet exports leave cells blank or drop trailing columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanRecord {
    pub loan_id: Option<String>,
    pub loan_status: Option<String>,
    pub principal_remaining: Option<String>,
}

impl LoanRecord {
    /// Build from the `Loan ID`, `Loan status`, `Principal remaining` cells.
    pub fn from_cells([loan_id, loan_status, principal_remaining]: [Option<String>; 3]) -> Self {
        Self {
            loan_id,
            loan_status,
            principal_remaining,
        }
    }
}

/// One row of the recoveries export, keyed by `Auction Id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoveryRecord {
    pub auction_id: Option<String>,
    pub recovered_principal: Option<String>,
    pub recovered_interest: Option<String>,
}

impl RecoveryRecord {
    /// Build from the `Auction Id`, `Recovered Principal`, `Recovered Interest` cells.
    pub fn from_cells(
        [auction_id, recovered_principal, recovered_interest]: [Option<String>; 3],
    ) -> Self {
        Self {
            auction_id,
            recovered_principal,
            recovered_interest,
        }
    }
}

/// A positional row of the status export. Row 0 is the sheet's header and
/// is kept as data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusRecord {
    pub fields: Vec<String>,
}

impl StatusRecord {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Recovery {
    pub principal: f64,
    pub interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub loan_id: Option<String>,
    pub principal_at_default: f64,
    pub recovery_status: String,
    pub principal_recovered: f64,
    pub interest_recovered: f64,
    pub outstanding_balance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReportTotals {
    pub principal_at_default: f64,
    pub principal_recovered: f64,
    pub interest_recovered: f64,
    pub outstanding_balance: f64,
}

impl ReportTotals {
    pub fn add(&mut self, row: &ReportRow) {
        self.principal_at_default += row.principal_at_default;
        self.principal_recovered += row.principal_recovered;
        self.interest_recovered += row.interest_recovered;
        self.outstanding_balance += row.outstanding_balance;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub defaulted_count: usize,
    pub total_outstanding_for_defaulted: f64,
}

/// Everything the presentation layer needs from one generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadDebtReport {
    pub summary: Summary,
    pub rows: Vec<ReportRow>,
    pub totals: ReportTotals,
}

/// Display form of a report row: labels remapped, money formatted.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ReportDisplayRow {
    #[serde(rename = "Loan ID")]
    #[tabled(rename = "Loan ID")]
    pub loan_id: String,
    #[serde(rename = "Principal at Default")]
    #[tabled(rename = "Principal at Default")]
    pub principal_at_default: String,
    #[serde(rename = "Recovery Status")]
    #[tabled(rename = "Recovery Status")]
    pub recovery_status: String,
    #[serde(rename = "Principal Recovered")]
    #[tabled(rename = "Principal Recovered")]
    pub principal_recovered: String,
    #[serde(rename = "Interest Recovered")]
    #[tabled(rename = "Interest Recovered")]
    pub interest_recovered: String,
    #[serde(rename = "Outstanding Balance")]
    #[tabled(rename = "Outstanding Balance")]
    pub outstanding_balance: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryExport<'a> {
    pub generated_at: String,
    pub report_rows: usize,
    pub summary: &'a Summary,
    pub totals: &'a ReportTotals,
}
