#![forbid(unsafe_code)]

//! External phase collaborators.
//!
//! Both phases read `input_matrix.txt` from the working directory and write
//! `output_matrix.txt` there. Invocations are blocking synchronous calls
//! with no timeout: a hung compiler or simulator stalls the whole suite.
//! That is an accepted limitation of the collaborator contract, not a
//! supported scenario.
//!
//! Build and run failures are swallowed on purpose — the collaborator
//! contract surfaces them only as a missing `output_matrix.txt`, which the
//! orchestrator short-circuits to a failed verdict.

use convdiff_core::HarnessSettings;
use std::path::PathBuf;
use std::process::Command;

/// Seam between the orchestrator and the external implementations. The
/// production impl spawns processes; tests substitute stubs that write the
/// shared output file directly.
pub trait PhaseExecutor {
    /// Build and run the reference native implementation.
    fn run_native(&mut self, settings: &HarnessSettings);
    /// Run the candidate implementation under the instruction-set simulator.
    fn run_simulated(&mut self, settings: &HarnessSettings);
}

/// Process-spawning phases: `g++` + the produced executable for the native
/// phase, `java -jar <mars_jar> <asm_file>` for the simulated phase.
#[derive(Debug, Clone)]
pub struct CommandPhases {
    workdir: PathBuf,
}

impl CommandPhases {
    #[must_use]
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }
}

impl PhaseExecutor for CommandPhases {
    fn run_native(&mut self, settings: &HarnessSettings) {
        let _ = Command::new("g++")
            .current_dir(&self.workdir)
            .arg(settings.cpp_file())
            .arg("-o")
            .arg(settings.exe_name())
            .output();
        let _ = Command::new(self.workdir.join(settings.exe_name()))
            .current_dir(&self.workdir)
            .output();
    }

    fn run_simulated(&mut self, settings: &HarnessSettings) {
        let _ = Command::new("java")
            .current_dir(&self.workdir)
            .arg("-jar")
            .arg(settings.mars_jar())
            .arg(settings.asm_file())
            .output();
    }
}
