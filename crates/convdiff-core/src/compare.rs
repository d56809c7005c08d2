#![forbid(unsafe_code)]

//! Tolerance-aware or exact-match comparison between two result files.
//!
//! Mode selection is decided by the *expected* file alone: when its content
//! contains no digit the comparison is exact case-insensitive text and no
//! numeric parsing happens for either file. The asymmetry is load-bearing —
//! callers use non-numeric expected fixtures for error-message outputs, and
//! an actual file that fails to look numeric against a numeric expectation
//! is a failure in its own right, not a mode switch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// First-detected cause of a comparison failure. Rendered via [`Display`]
/// as the single diagnostic line for the case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum Mismatch {
    /// Exact-text mode failed. Carries no positional payload.
    Text,
    /// Expected is numeric but the actual content holds no digit at all.
    NonNumericActual,
    /// The two numeric sequences differ in element count.
    Length { expected: usize, actual: usize },
    /// First element pair whose absolute difference exceeds epsilon.
    Value {
        position: usize,
        expected: f64,
        actual: f64,
        diff: f64,
    },
    /// A file could not be read or a token could not be parsed.
    Unreadable { path: String, reason: String },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "textual outputs differ"),
            Self::NonNumericActual => write!(f, "actual output contains no numeric data"),
            Self::Length { expected, actual } => {
                write!(f, "length mismatch: expected {expected}, got {actual}")
            }
            Self::Value {
                position,
                expected,
                actual,
                diff,
            } => write!(
                f,
                "mismatch at position {position}: expected {expected}, got {actual}, diff {diff}"
            ),
            Self::Unreadable { path, reason } => write!(f, "error reading {path}: {reason}"),
        }
    }
}

/// Verdict of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum CompareOutcome {
    Pass,
    Fail(Mismatch),
}

impl CompareOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self, Self::Pass)
    }

    #[must_use]
    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::Pass => None,
            Self::Fail(mismatch) => Some(mismatch),
        }
    }
}

/// Compare two result files within an absolute tolerance. Never propagates
/// an error: unreadable files and malformed tokens resolve to a failing
/// outcome naming the offending file.
#[must_use]
pub fn compare_files(expected_path: &Path, actual_path: &Path, epsilon: f64) -> CompareOutcome {
    let expected_content = match read_trimmed(expected_path) {
        Ok(content) => content,
        Err(mismatch) => return CompareOutcome::Fail(mismatch),
    };

    if !contains_digit(&expected_content) {
        let actual_content = match read_trimmed(actual_path) {
            Ok(content) => content,
            Err(mismatch) => return CompareOutcome::Fail(mismatch),
        };
        return if expected_content.eq_ignore_ascii_case(&actual_content) {
            CompareOutcome::Pass
        } else {
            CompareOutcome::Fail(Mismatch::Text)
        };
    }

    let expected = match parse_floats(&expected_content, expected_path) {
        Ok(values) => values,
        Err(mismatch) => return CompareOutcome::Fail(mismatch),
    };

    let actual_content = match read_trimmed(actual_path) {
        Ok(content) => content,
        Err(mismatch) => return CompareOutcome::Fail(mismatch),
    };
    if !contains_digit(&actual_content) {
        return CompareOutcome::Fail(Mismatch::NonNumericActual);
    }
    let actual = match parse_floats(&actual_content, actual_path) {
        Ok(values) => values,
        Err(mismatch) => return CompareOutcome::Fail(mismatch),
    };

    if expected.len() != actual.len() {
        return CompareOutcome::Fail(Mismatch::Length {
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    for (position, (e, a)) in expected.iter().zip(actual.iter()).enumerate() {
        let diff = (e - a).abs();
        if diff > epsilon {
            return CompareOutcome::Fail(Mismatch::Value {
                position,
                expected: *e,
                actual: *a,
                diff,
            });
        }
    }

    CompareOutcome::Pass
}

fn read_trimmed(path: &Path) -> Result<String, Mismatch> {
    fs::read_to_string(path)
        .map(|raw| raw.trim().to_owned())
        .map_err(|source| Mismatch::Unreadable {
            path: path.display().to_string(),
            reason: source.to_string(),
        })
}

fn contains_digit(content: &str) -> bool {
    content.bytes().any(|b| b.is_ascii_digit())
}

fn parse_floats(content: &str, path: &Path) -> Result<Vec<f64>, Mismatch> {
    content
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| Mismatch::Unreadable {
                path: path.display().to_string(),
                reason: format!("could not parse `{token}` as a float"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{compare_files, CompareOutcome, Mismatch};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn pair(name: &str, expected: &str, actual: &str) -> (PathBuf, PathBuf) {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos());
        let dir = std::env::temp_dir().join(format!(
            "convdiff_compare_{name}_{}_{nonce}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        let expected_path = dir.join("expected.txt");
        let actual_path = dir.join("actual.txt");
        fs::write(&expected_path, expected).expect("write expected");
        fs::write(&actual_path, actual).expect("write actual");
        (expected_path, actual_path)
    }

    #[test]
    fn textual_mode_is_case_insensitive() {
        let (e, a) = pair("text_same", "abc", "abc");
        assert!(compare_files(&e, &a, 1e-4).passed());

        let (e, a) = pair("text_case", "abc", "ABC");
        assert!(compare_files(&e, &a, 1e-4).passed());

        let (e, a) = pair("text_diff", "abc", "xyz");
        assert_eq!(
            compare_files(&e, &a, 1e-4),
            CompareOutcome::Fail(Mismatch::Text)
        );
    }

    #[test]
    fn numeric_expected_rejects_non_numeric_actual() {
        // Asymmetric by design: the reverse pairing stays textual.
        let (e, a) = pair("asym", "1.0 2.0", "no numbers here");
        assert_eq!(
            compare_files(&e, &a, 1e-4),
            CompareOutcome::Fail(Mismatch::NonNumericActual)
        );
    }

    #[test]
    fn borderline_epsilon_behavior() {
        let (e, a) = pair("borderline", "1.0 2.0 3.0", "1.0 2.0001 3.0");
        // |2.0 - 2.0001| is just over 1e-4 in binary floating point.
        let outcome = compare_files(&e, &a, 1e-4);
        assert!(matches!(
            outcome,
            CompareOutcome::Fail(Mismatch::Value { position: 1, .. })
        ));
        assert!(compare_files(&e, &a, 1e-3).passed());
    }

    #[test]
    fn length_mismatch_fails_regardless_of_epsilon() {
        let (e, a) = pair("length", "1.0 2.0", "1.0");
        assert_eq!(
            compare_files(&e, &a, f64::INFINITY),
            CompareOutcome::Fail(Mismatch::Length {
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn missing_file_names_the_file() {
        let (e, _) = pair("missing", "1.0", "1.0");
        let absent = PathBuf::from("/nonexistent/actual.txt");
        let outcome = compare_files(&e, &absent, 1e-4);
        match outcome.mismatch() {
            Some(Mismatch::Unreadable { path, .. }) => {
                assert!(path.contains("actual.txt"));
            }
            other => panic!("expected Unreadable, got {other:?}"),
        }
    }

    #[test]
    fn malformed_token_names_the_file() {
        let (e, a) = pair("malformed", "1.0 2.0", "1.0 2.x0");
        let outcome = compare_files(&e, &a, 1e-4);
        match outcome.mismatch() {
            Some(Mismatch::Unreadable { path, reason }) => {
                assert!(path.contains("actual.txt"));
                assert!(reason.contains("2.x0"));
            }
            other => panic!("expected Unreadable, got {other:?}"),
        }
    }

    #[test]
    fn whitespace_and_newlines_are_insignificant_separators() {
        let (e, a) = pair("ws", "1.0 2.0\n3.0", "1.0\n2.0 3.0\n");
        assert!(compare_files(&e, &a, 1e-9).passed());
    }

    #[test]
    fn diagnostic_rendering_matches_taxonomy() {
        let value = Mismatch::Value {
            position: 4,
            expected: 1.5,
            actual: 2.5,
            diff: 1.0,
        };
        assert_eq!(
            value.to_string(),
            "mismatch at position 4: expected 1.5, got 2.5, diff 1"
        );
        let length = Mismatch::Length {
            expected: 9,
            actual: 4,
        };
        assert_eq!(length.to_string(), "length mismatch: expected 9, got 4");
    }
}
