#![forbid(unsafe_code)]

//! convdiff-core: test-case lifecycle and comparison engine for the
//! convolution differential harness.
//!
//! ## Module layout
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | `config`  | [`HarnessSettings`] key/value settings with typed coercion |
//! | `params`  | [`ConvParams`] sampler and validity invariant              |
//! | `fixture` | [`FixtureStore`] per-index fixture files + shared hand-off |
//! | `compare` | [`compare_files`] tolerance-aware output comparison        |

pub mod compare;
pub mod config;
pub mod fixture;
pub mod params;

pub use compare::{compare_files, CompareOutcome, Mismatch};
pub use config::{ConfigValue, HarnessSettings};
pub use fixture::{FixtureError, FixtureStore, MaterializedInput};
pub use params::{ConvParams, ParamHeaderError};
