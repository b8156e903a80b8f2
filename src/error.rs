use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// One or more of the three input files was not supplied.
    #[error("missing input file(s): {}", .0.join(", "))]
    MissingInput(Vec<&'static str>),

    #[error("cannot read {dataset} file {}: {source}", path.display())]
    Io {
        dataset: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{dataset}: malformed CSV: {source}")]
    Parse {
        dataset: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{dataset}: missing column '{column}'")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },

    /// A parser thread panicked before producing rows.
    #[error("{dataset}: parser thread panicked")]
    Worker { dataset: &'static str },

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
