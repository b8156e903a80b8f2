// Entry point and high-level CLI flow.
//
// With all three files passed as flags the report is generated once and
// the process exits. Otherwise an interactive menu runs:
// - Option [1] selects the loans, status and recoveries files.
// - Option [2] generates the bad debt report and exports it.
// - After generating, the user can go back to the menu or exit.
mod config;
mod error;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use clap::Parser;
use config::ReportSettings;
use error::ReportError;
use loader::InputFiles;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const GENERIC_FAILURE: &str =
    "An error occurred while processing the files. Check the log output for details.";

// Files picked in the interactive menu. Only the menu touches this; the
// report pipeline takes its inputs as arguments.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    files: InputFiles,
}

#[derive(Parser, Debug)]
#[command(version, about = "Reconcile loans, recovery status and recoveries into a bad debt report")]
struct Cli {
    /// Loans export (header row with `Loan ID`, `Loan status`, `Principal remaining`).
    #[arg(long)]
    loans: Option<PathBuf>,
    /// Recovery status export, read by column position.
    #[arg(long)]
    status: Option<PathBuf>,
    /// Recoveries export (header row with `Auction Id`, `Recovered Principal`, `Recovered Interest`).
    #[arg(long)]
    recoveries: Option<PathBuf>,
    /// TOML file overriding the report settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for the exported CSV and JSON.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Print the report without writing any files.
    #[arg(long)]
    no_export: bool,
}

/// Read one line from stdin after printing `prompt`.
///
/// Returns `None` once stdin is closed.
fn prompt_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask the user whether to go back to the menu after generating.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = prompt_line("Back to Report Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn prompt_path(label: &str, current: &Option<PathBuf>) -> Option<PathBuf> {
    let shown = current
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "not selected".to_string());
    let input = prompt_line(&format!("{} file [{}]: ", label, shown))?;
    if input.is_empty() {
        current.clone()
    } else {
        Some(PathBuf::from(input))
    }
}

/// Handle option [1]: pick the three input files. An empty answer keeps
/// the current selection.
fn handle_select_files() {
    let mut state = match APP_STATE.lock() {
        Ok(state) => state,
        Err(poisoned) => poisoned.into_inner(),
    };
    state.files.loans = prompt_path("Loans", &state.files.loans);
    state.files.status = prompt_path("Status", &state.files.status);
    state.files.recoveries = prompt_path("Recoveries", &state.files.recoveries);
    println!("");
}

/// How one generation attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Report printed, and exported when an output directory was given.
    Shown,
    /// Report printed but the export files could not be written.
    ExportFailed,
    /// Not all three files were selected; nothing was parsed.
    MissingInput,
    /// Reading or parsing failed; nothing was shown.
    Failed,
}

impl Outcome {
    fn succeeded(self) -> bool {
        self == Outcome::Shown
    }

    fn exit_code(self) -> ExitCode {
        if self.succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// The single line shown to the user when generation fails.
fn failure_message(err: &ReportError) -> String {
    match err {
        ReportError::MissingInput(missing) => format!(
            "Please provide all three CSV files (missing: {}).",
            missing.join(", ")
        ),
        _ => GENERIC_FAILURE.to_string(),
    }
}

/// Generate, print and optionally export one report.
fn generate(files: &InputFiles, settings: &ReportSettings, out_dir: Option<&Path>) -> Outcome {
    let report = match reports::build_report(files, settings) {
        Ok(report) => report,
        Err(e) => {
            let message = failure_message(&e);
            if let ReportError::MissingInput(missing) = &e {
                warn!(?missing, "report requested without all input files");
                println!("{}\n", message);
                return Outcome::MissingInput;
            }
            error!(error = %e, "error generating report");
            eprintln!("{}\n", message);
            return Outcome::Failed;
        }
    };

    output::print_report(&report, &settings.open_case_code);

    let Some(dir) = out_dir else {
        return Outcome::Shown;
    };
    match output::export_report(&report, &settings.open_case_code, dir) {
        Ok(()) => {
            info!(dir = %dir.display(), "exported report");
            println!(
                "(Full table exported to {} and {})\n",
                dir.join(output::REPORT_CSV).display(),
                dir.join(output::SUMMARY_JSON).display()
            );
            Outcome::Shown
        }
        Err(e) => {
            error!(error = %e, dir = %dir.display(), "export failed");
            eprintln!("Write error: {}", e);
            Outcome::ExportFailed
        }
    }
}

/// Handle option [2]: generate from the files selected so far.
fn handle_generate_report(settings: &ReportSettings, out_dir: Option<&Path>) {
    let files = match APP_STATE.lock() {
        Ok(state) => state.files.clone(),
        Err(poisoned) => poisoned.into_inner().files.clone(),
    };
    println!("Generating report...\n");
    generate(&files, settings, out_dir);
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match cli.config.as_deref().map(ReportSettings::from_path) {
        None => ReportSettings::default(),
        Some(Ok(settings)) => settings,
        Some(Err(e)) => {
            error!(error = %e, "cannot load settings");
            return ExitCode::FAILURE;
        }
    };
    let out_dir = (!cli.no_export).then_some(cli.out_dir.as_path());

    let files = InputFiles {
        loans: cli.loans.clone(),
        status: cli.status.clone(),
        recoveries: cli.recoveries.clone(),
    };
    if files.missing().is_empty() {
        return generate(&files, &settings, out_dir).exit_code();
    }

    if let Ok(mut state) = APP_STATE.lock() {
        state.files = files;
    }

    loop {
        println!("Bad Debt Report:");
        println!("[1] Select the files");
        println!("[2] Generate Report\n");
        let Some(choice) = prompt_line("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => {
                handle_select_files();
            }
            "2" => {
                println!("");
                handle_generate_report(&settings, out_dir);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    struct Fixture {
        loans: NamedTempFile,
        status: NamedTempFile,
        recoveries: NamedTempFile,
    }

    impl Fixture {
        fn new(loans: &str) -> Self {
            Self {
                loans: temp_csv(loans),
                status: temp_csv("Id,Status\nL1,defaulted\n"),
                recoveries: temp_csv("Auction Id,Recovered Principal,Recovered Interest\nL1,10,1\n"),
            }
        }

        fn files(&self) -> InputFiles {
            InputFiles {
                loans: Some(self.loans.path().to_path_buf()),
                status: Some(self.status.path().to_path_buf()),
                recoveries: Some(self.recoveries.path().to_path_buf()),
            }
        }
    }

    const GOOD_LOANS: &str = "Loan ID,Loan status,Principal remaining\nL1,Bad Debt,100\n";

    #[test]
    fn parse_failure_shows_generic_message() {
        let err = ReportError::MissingColumn {
            dataset: "loans",
            column: "Loan ID",
        };
        assert_eq!(failure_message(&err), GENERIC_FAILURE);
        assert_eq!(
            failure_message(&ReportError::Worker { dataset: "status" }),
            GENERIC_FAILURE
        );
    }

    #[test]
    fn missing_input_names_the_files() {
        let msg = failure_message(&ReportError::MissingInput(vec!["loans", "recoveries"]));
        assert_eq!(msg, "Please provide all three CSV files (missing: loans, recoveries).");
    }

    #[test]
    fn malformed_loans_file_fails_the_run() {
        let fixture = Fixture::new("Loan ID,Principal remaining\nL1,100\n");
        let outcome = generate(&fixture.files(), &ReportSettings::default(), None);
        assert_eq!(outcome, Outcome::Failed);
        assert!(!outcome.succeeded());
    }

    #[test]
    fn missing_files_stop_before_parsing() {
        let outcome = generate(&InputFiles::default(), &ReportSettings::default(), None);
        assert_eq!(outcome, Outcome::MissingInput);
    }

    #[test]
    fn good_files_are_shown() {
        let fixture = Fixture::new(GOOD_LOANS);
        let dir = tempfile::tempdir().unwrap();
        let outcome = generate(&fixture.files(), &ReportSettings::default(), Some(dir.path()));
        assert_eq!(outcome, Outcome::Shown);
        assert!(outcome.succeeded());
        assert!(dir.path().join(output::REPORT_CSV).exists());
    }

    #[test]
    fn export_failure_is_not_success() {
        let fixture = Fixture::new(GOOD_LOANS);
        // A plain file cannot be used as the export directory.
        let blocker = temp_csv("");
        let outcome = generate(&fixture.files(), &ReportSettings::default(), Some(blocker.path()));
        assert_eq!(outcome, Outcome::ExportFailed);
        assert!(!outcome.succeeded());
    }
}
