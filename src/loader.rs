use crate::error::{ReportError, Result};
use crate::types::{LoanRecord, RecoveryRecord, StatusRecord};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info};

pub const LOANS: &str = "loans";
pub const STATUS: &str = "status";
pub const RECOVERIES: &str = "recoveries";

const LOAN_COLUMNS: [&str; 3] = ["Loan ID", "Loan status", "Principal remaining"];
const RECOVERY_COLUMNS: [&str; 3] = ["Auction Id", "Recovered Principal", "Recovered Interest"];

/// The three files picked by the user. Any of them may still be unset.
#[derive(Debug, Clone, Default)]
pub struct InputFiles {
    pub loans: Option<PathBuf>,
    pub status: Option<PathBuf>,
    pub recoveries: Option<PathBuf>,
}

impl InputFiles {
    /// Names of the datasets that have no file yet, in dataset order.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (LOANS, &self.loans),
            (STATUS, &self.status),
            (RECOVERIES, &self.recoveries),
        ]
        .into_iter()
        .filter(|(_, p)| p.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub loans: Vec<LoanRecord>,
    pub status: Vec<StatusRecord>,
    pub recoveries: Vec<RecoveryRecord>,
}

fn decode(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

/// Parse a header-keyed export into typed records.
///
/// Headers are trimmed and every column in `columns` must be present; when
/// a header repeats, the first occurrence wins. Cells are decoded lossily,
/// so stray non-UTF-8 bytes never fail the file. Short rows and blank cells
/// come through as `None`.
fn parse_keyed<T>(
    dataset: &'static str,
    content: &[u8],
    columns: &[&'static str; 3],
    build: fn([Option<String>; 3]) -> T,
) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers: Vec<String> = rdr
        .byte_headers()
        .map_err(|source| ReportError::Parse { dataset, source })?
        .iter()
        .map(|h| decode(h).trim().to_string())
        .collect();

    let mut indices = [0usize; 3];
    for (slot, &column) in indices.iter_mut().zip(columns) {
        *slot = headers
            .iter()
            .position(|h| h.as_str() == column)
            .ok_or(ReportError::MissingColumn { dataset, column })?;
    }

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result.map_err(|source| ReportError::Parse { dataset, source })?;
        let cells = indices.map(|idx| {
            record
                .get(idx)
                .filter(|cell| !cell.is_empty())
                .map(decode)
        });
        rows.push(build(cells));
    }
    Ok(rows)
}

pub fn parse_loans(content: &[u8]) -> Result<Vec<LoanRecord>> {
    parse_keyed(LOANS, content, &LOAN_COLUMNS, LoanRecord::from_cells)
}

pub fn parse_recoveries(content: &[u8]) -> Result<Vec<RecoveryRecord>> {
    parse_keyed(RECOVERIES, content, &RECOVERY_COLUMNS, RecoveryRecord::from_cells)
}

/// Parse the status export by position. The header line is not consumed:
/// it comes back as row 0 like any other row.
pub fn parse_status(content: &[u8]) -> Result<Vec<StatusRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content);
    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result.map_err(|source| ReportError::Parse {
            dataset: STATUS,
            source,
        })?;
        rows.push(StatusRecord::new(record.iter().map(decode)));
    }
    Ok(rows)
}

fn read_file(dataset: &'static str, path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| ReportError::Io {
        dataset,
        path: path.to_path_buf(),
        source,
    })
}

fn load_one<T>(
    dataset: &'static str,
    path: &Path,
    parse: fn(&[u8]) -> Result<Vec<T>>,
) -> Result<Vec<T>> {
    let content = read_file(dataset, path)?;
    let rows = parse(&content)?;
    info!(dataset, path = %path.display(), rows = rows.len(), "parsed dataset");
    Ok(rows)
}

fn join_worker<T>(
    dataset: &'static str,
    handle: thread::ScopedJoinHandle<'_, Result<Vec<T>>>,
) -> Result<Vec<T>> {
    handle
        .join()
        .map_err(|_| ReportError::Worker { dataset })?
}

/// Read and parse all three files.
///
/// Missing selections are reported before any file is touched. The three
/// parses then run on their own threads and are all joined before the
/// first failure (in dataset order) is returned.
pub fn load_datasets(files: &InputFiles) -> Result<Datasets> {
    let (Some(loans), Some(status), Some(recoveries)) =
        (&files.loans, &files.status, &files.recoveries)
    else {
        return Err(ReportError::MissingInput(files.missing()));
    };

    debug!("parsing datasets concurrently");
    let (loans, status, recoveries) = thread::scope(|s| {
        let loans = s.spawn(|| load_one(LOANS, loans, parse_loans));
        let status = s.spawn(|| load_one(STATUS, status, parse_status));
        let recoveries = s.spawn(|| load_one(RECOVERIES, recoveries, parse_recoveries));
        (
            join_worker(LOANS, loans),
            join_worker(STATUS, status),
            join_worker(RECOVERIES, recoveries),
        )
    });

    Ok(Datasets {
        loans: loans?,
        status: status?,
        recoveries: recoveries?,
    })
}
