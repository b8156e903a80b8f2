use crate::config::ReportSettings;
use crate::error::Result;
use crate::loader::{load_datasets, Datasets, InputFiles};
use crate::types::{
    BadDebtReport, LoanRecord, Recovery, RecoveryRecord, ReportRow, ReportTotals, StatusRecord,
    Summary,
};
use crate::util::{clean_id, normalize_amount};
use std::collections::HashMap;
use tracing::{debug, info};

pub type StatusLookup = HashMap<String, String>;
pub type RecoveryLookup = HashMap<String, Recovery>;

/// Map loan id to recovery status code.
///
/// Row 0 is the sheet header and is always skipped. Rows with a blank id
/// are dropped; a blank or missing status cell becomes `missing_status`.
/// Later rows overwrite earlier ones for the same id.
pub fn build_status_lookup(rows: &[StatusRecord], settings: &ReportSettings) -> StatusLookup {
    let mut lookup = StatusLookup::new();
    let mut skipped = 0usize;
    for row in rows.iter().skip(1) {
        let Some(id) = clean_id(row.get(settings.status_id_column)) else {
            skipped += 1;
            continue;
        };
        let status = clean_id(row.get(settings.status_code_column))
            .unwrap_or_else(|| settings.missing_status.clone());
        lookup.insert(id, status);
    }
    debug!(entries = lookup.len(), skipped, "built status lookup");
    lookup
}

/// Map `Auction Id` to the recovered principal and interest.
pub fn build_recovery_lookup(rows: &[RecoveryRecord]) -> RecoveryLookup {
    let mut lookup = RecoveryLookup::new();
    for row in rows {
        let Some(id) = clean_id(row.auction_id.as_deref()) else {
            continue;
        };
        lookup.insert(
            id,
            Recovery {
                principal: normalize_amount(row.recovered_principal.as_deref()),
                interest: normalize_amount(row.recovered_interest.as_deref()),
            },
        );
    }
    debug!(entries = lookup.len(), "built recovery lookup");
    lookup
}

/// Join every "Bad Debt" loan against both lookups.
///
/// Rows come back in loan file order. Totals cover every produced row,
/// whatever its recovery status.
pub fn join_bad_debts(
    loans: &[LoanRecord],
    statuses: &StatusLookup,
    recoveries: &RecoveryLookup,
    settings: &ReportSettings,
) -> (Vec<ReportRow>, ReportTotals) {
    let mut totals = ReportTotals::default();
    let rows: Vec<ReportRow> = loans
        .iter()
        .filter(|loan| loan.loan_status.as_deref() == Some(settings.bad_debt_status.as_str()))
        .map(|loan| {
            let loan_id = clean_id(loan.loan_id.as_deref());
            let recovery_status = loan_id
                .as_ref()
                .and_then(|id| statuses.get(id))
                .cloned()
                .unwrap_or_else(|| settings.missing_status.clone());
            let recovery = loan_id
                .as_ref()
                .and_then(|id| recoveries.get(id))
                .copied()
                .unwrap_or_default();
            let principal_at_default = normalize_amount(loan.principal_remaining.as_deref());
            let row = ReportRow {
                loan_id,
                principal_at_default,
                recovery_status,
                principal_recovered: recovery.principal,
                interest_recovered: recovery.interest,
                outstanding_balance: principal_at_default - recovery.principal - recovery.interest,
            };
            totals.add(&row);
            row
        })
        .collect();
    (rows, totals)
}

/// Move open cases to the front. `sort_by_key` is a stable sort, so each
/// partition keeps its original order.
pub fn sort_open_cases_first(rows: &mut [ReportRow], open_case_code: &str) {
    rows.sort_by_key(|row| row.recovery_status != open_case_code);
}

pub fn summarize(rows: &[ReportRow], open_case_code: &str) -> Summary {
    rows.iter()
        .filter(|row| row.recovery_status == open_case_code)
        .fold(Summary::default(), |mut acc, row| {
            acc.defaulted_count += 1;
            acc.total_outstanding_for_defaulted += row.outstanding_balance;
            acc
        })
}

/// Run the whole pipeline over already-parsed datasets.
pub fn generate_report(data: &Datasets, settings: &ReportSettings) -> BadDebtReport {
    let statuses = build_status_lookup(&data.status, settings);
    let recoveries = build_recovery_lookup(&data.recoveries);
    let (mut rows, totals) = join_bad_debts(&data.loans, &statuses, &recoveries, settings);
    sort_open_cases_first(&mut rows, &settings.open_case_code);
    let summary = summarize(&rows, &settings.open_case_code);
    info!(
        rows = rows.len(),
        open_cases = summary.defaulted_count,
        "generated bad debt report"
    );
    BadDebtReport {
        summary,
        rows,
        totals,
    }
}

/// Load the three selected files and build the report. Any failure aborts
/// the run; no partial report is returned.
pub fn build_report(files: &InputFiles, settings: &ReportSettings) -> Result<BadDebtReport> {
    let data = load_datasets(files)?;
    Ok(generate_report(&data, settings))
}
