#![forbid(unsafe_code)]

//! Single-case and full-suite orchestration.
//!
//! Cases run strictly sequentially: both phases hand their results over
//! through fixed single-name files, so interleaving two cases would corrupt
//! both. No error escapes the per-case boundary — every failure mode
//! resolves to a [`CaseVerdict`] and the suite always proceeds to the next
//! index.

use crate::phase::PhaseExecutor;
use convdiff_core::compare::{compare_files, CompareOutcome, Mismatch};
use convdiff_core::fixture::FixtureStore;
use convdiff_core::params::ConvParams;
use convdiff_core::HarnessSettings;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("test index must be between 1 and {max}, got {index}")]
    IndexOutOfRange { index: usize, max: usize },
    #[error("run report write failed for {path}: {source}")]
    ReportIo { path: PathBuf, source: io::Error },
    #[error("run report serialization failed: {0}")]
    ReportSerialize(#[from] serde_json::Error),
}

/// Why one case failed. At most one cause is recorded per case — the
/// first detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseFailure {
    /// The fixture store could not materialize or stage the input.
    Fixture { message: String },
    /// The native phase left no result file behind.
    MissingExpectedOutput,
    /// The simulated phase left no result file behind.
    MissingActualOutput,
    /// Both phases produced output but the comparator rejected it.
    Mismatch(Mismatch),
}

impl fmt::Display for CaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixture { message } => write!(f, "fixture error: {message}"),
            Self::MissingExpectedOutput => write!(f, "native phase produced no output file"),
            Self::MissingActualOutput => write!(f, "simulated phase produced no output file"),
            Self::Mismatch(mismatch) => mismatch.fmt(f),
        }
    }
}

/// Verdict for one 1-based test index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseVerdict {
    pub index: usize,
    pub passed: bool,
    /// Parameters in play, when the input fixture was usable.
    pub params: Option<ConvParams>,
    /// blake3 hex of the input fixture consumed, for regression triage.
    pub input_blake3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<CaseFailure>,
}

/// Aggregated run summary: pass count and the failed indices in the order
/// they were executed (ascending).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed_indices: Vec<usize>,
    pub verdicts: Vec<CaseVerdict>,
    pub generated_unix_ms: u128,
}

impl SuiteSummary {
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Drives materialize → native phase → relocate → simulated phase →
/// relocate → compare for each index, aggregating verdicts.
pub struct Orchestrator<'a, P: PhaseExecutor> {
    settings: &'a HarnessSettings,
    store: FixtureStore,
    phases: P,
    rng: StdRng,
}

impl<'a, P: PhaseExecutor> Orchestrator<'a, P> {
    pub fn new(settings: &'a HarnessSettings, workdir: PathBuf, phases: P, rng: StdRng) -> Self {
        Self {
            settings,
            store: FixtureStore::new(workdir),
            phases,
            rng,
        }
    }

    #[must_use]
    pub fn store(&self) -> &FixtureStore {
        &self.store
    }

    /// Run one case verbosely: print its parameters, PASS/FAIL, and on
    /// failure dump the input/expected/actual fixture contents. An
    /// out-of-range index is reported without executing anything and
    /// affects no counts.
    pub fn run_single(&mut self, index: usize) -> Result<CaseVerdict, OrchestratorError> {
        let max = self.settings.num_tests();
        if index < 1 || index > max {
            return Err(OrchestratorError::IndexOutOfRange { index, max });
        }

        let verdict = self.run_case(index, true);
        if verdict.passed {
            println!("test {index}: PASS");
        } else {
            println!("test {index}: FAIL");
            self.dump_case_files(index);
        }
        Ok(verdict)
    }

    /// Run indices `1..=num_tests` sequentially, printing index markers
    /// only, then the percentage summary and the failed-index list.
    pub fn run_all(&mut self) -> SuiteSummary {
        let total = self.settings.num_tests();
        let mut verdicts = Vec::with_capacity(total);
        let mut failed_indices = Vec::new();

        for index in 1..=total {
            print!("{index} ");
            let _ = io::stdout().flush();
            let verdict = self.run_case(index, false);
            if !verdict.passed {
                failed_indices.push(index);
            }
            verdicts.push(verdict);
        }

        let passed = total - failed_indices.len();
        let summary = SuiteSummary {
            total,
            passed,
            failed_indices,
            verdicts,
            generated_unix_ms: now_unix_ms(),
        };

        println!(
            "\n\nResults: {}/{} tests passed ({:.1}%)",
            summary.passed,
            summary.total,
            summary.pass_rate()
        );
        if !summary.failed_indices.is_empty() {
            let rendered: Vec<String> = summary
                .failed_indices
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("Failed test cases: {}", rendered.join(", "));
        }
        summary
    }

    /// Write the suite summary as a pretty-printed JSON artifact next to
    /// the fixture directories.
    pub fn write_run_report(&self, summary: &SuiteSummary) -> Result<PathBuf, OrchestratorError> {
        let path = self.store.root().join("run_report.json");
        let bytes = serde_json::to_vec_pretty(summary)?;
        fs::write(&path, bytes).map_err(|source| OrchestratorError::ReportIo {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn run_case(&mut self, index: usize, verbose: bool) -> CaseVerdict {
        if let Err(error) = self.store.ensure_directories() {
            return self.fail(index, None, CaseFailure::Fixture {
                message: error.to_string(),
            });
        }

        let force = self.settings.regenerate_input();
        let materialized = match self.store.materialize_input(index, force, &mut self.rng) {
            Ok(materialized) => materialized,
            Err(error) => {
                return self.fail(index, None, CaseFailure::Fixture {
                    message: error.to_string(),
                });
            }
        };
        if verbose {
            let tag = if materialized.regenerated {
                "generated"
            } else {
                "reusing"
            };
            println!("test {index}: {tag} input with params {}", materialized.params);
        }
        let params = Some(materialized.params);

        self.phases.run_native(self.settings);
        let expected_path = self.store.expected_path(index);
        match self.store.collect_phase_output(&expected_path) {
            Ok(true) => {}
            Ok(false) => return self.fail(index, params, CaseFailure::MissingExpectedOutput),
            Err(error) => {
                return self.fail(index, params, CaseFailure::Fixture {
                    message: error.to_string(),
                });
            }
        }

        self.phases.run_simulated(self.settings);
        let actual_path = self.store.output_path(index);
        match self.store.collect_phase_output(&actual_path) {
            Ok(true) => {}
            Ok(false) => return self.fail(index, params, CaseFailure::MissingActualOutput),
            Err(error) => {
                return self.fail(index, params, CaseFailure::Fixture {
                    message: error.to_string(),
                });
            }
        }

        match compare_files(&expected_path, &actual_path, self.settings.epsilon()) {
            CompareOutcome::Pass => CaseVerdict {
                index,
                passed: true,
                params,
                input_blake3: self.input_hash(index),
                failure: None,
            },
            CompareOutcome::Fail(mismatch) => {
                self.fail(index, params, CaseFailure::Mismatch(mismatch))
            }
        }
    }

    fn fail(&self, index: usize, params: Option<ConvParams>, failure: CaseFailure) -> CaseVerdict {
        println!("\n{failure}");
        CaseVerdict {
            index,
            passed: false,
            params,
            input_blake3: self.input_hash(index),
            failure: Some(failure),
        }
    }

    fn input_hash(&self, index: usize) -> Option<String> {
        fs::read(self.store.input_path(index))
            .ok()
            .map(|bytes| blake3::hash(&bytes).to_hex().to_string())
    }

    fn dump_case_files(&self, index: usize) {
        dump_file("Input content", &self.store.input_path(index));
        dump_file("Expected output", &self.store.expected_path(index));
        dump_file("Actual output", &self.store.output_path(index));
    }
}

fn dump_file(label: &str, path: &Path) {
    match fs::read_to_string(path) {
        Ok(contents) => println!("{label}:\n{contents}"),
        Err(_) => println!("{label}: <unavailable: {}>", path.display()),
    }
}

fn now_unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis())
}
