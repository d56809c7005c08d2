#![forbid(unsafe_code)]

//! convdiff-harness: drives the two external convolution implementations
//! over shared fixtures and aggregates comparison verdicts.
//!
//! | Module  | Contents                                                      |
//! |---------|---------------------------------------------------------------|
//! | `phase` | [`PhaseExecutor`] collaborator boundary, [`CommandPhases`]    |
//! | `suite` | [`Orchestrator`] single-case / full-suite execution, reports  |

pub mod phase;
pub mod suite;

pub use phase::{CommandPhases, PhaseExecutor};
pub use suite::{CaseFailure, CaseVerdict, Orchestrator, OrchestratorError, SuiteSummary};
