#![forbid(unsafe_code)]

//! Random convolution parameter sampling subject to the output-size
//! invariant `floor((N + 2p - M) / s) + 1 >= 1`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

pub const INPUT_SIDE_RANGE: RangeInclusive<u32> = 3..=7;
pub const KERNEL_SIDE_RANGE: RangeInclusive<u32> = 2..=4;
pub const PADDING_RANGE: RangeInclusive<u32> = 0..=4;
pub const STRIDE_RANGE: RangeInclusive<u32> = 1..=3;

/// One sampled convolution configuration: input side N, kernel side M,
/// padding p, stride s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvParams {
    pub input_side: u32,
    pub kernel_side: u32,
    pub padding: u32,
    pub stride: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamHeaderError {
    #[error("parameter header must hold four integers, got {count}: `{line}`")]
    FieldCount { line: String, count: usize },
    #[error("parameter header field `{field}` is not an integer in `{line}`")]
    NonInteger { line: String, field: String },
}

impl ConvParams {
    /// Derived output side length. N + 2p - M can be negative (e.g. N=3,
    /// M=4, p=0), so the division must round toward negative infinity to
    /// match the validity predicate.
    #[must_use]
    pub fn output_side(self) -> i64 {
        let span = i64::from(self.input_side) + 2 * i64::from(self.padding)
            - i64::from(self.kernel_side);
        span.div_euclid(i64::from(self.stride)) + 1
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.output_side() >= 1
    }

    /// Draw uniformly from the configured ranges until the output-size
    /// invariant holds. All four parameters are redrawn on violation, not
    /// just the failing one. Termination is bounded only by chance but the
    /// ranges make an invalid draw rare.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        loop {
            let candidate = Self {
                input_side: rng.random_range(INPUT_SIDE_RANGE),
                kernel_side: rng.random_range(KERNEL_SIDE_RANGE),
                padding: rng.random_range(PADDING_RANGE),
                stride: rng.random_range(STRIDE_RANGE),
            };
            if candidate.is_valid() {
                return candidate;
            }
        }
    }

    /// Parse the `"N M p s"` header line of an input fixture.
    pub fn parse_header(line: &str) -> Result<Self, ParamHeaderError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(ParamHeaderError::FieldCount {
                line: line.to_owned(),
                count: fields.len(),
            });
        }
        let mut parsed = [0u32; 4];
        for (slot, field) in parsed.iter_mut().zip(&fields) {
            *slot = field
                .parse::<u32>()
                .map_err(|_| ParamHeaderError::NonInteger {
                    line: line.to_owned(),
                    field: (*field).to_owned(),
                })?;
        }
        Ok(Self {
            input_side: parsed[0],
            kernel_side: parsed[1],
            padding: parsed[2],
            stride: parsed[3],
        })
    }
}

impl fmt::Display for ConvParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.input_side, self.kernel_side, self.padding, self.stride
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{ConvParams, ParamHeaderError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn negative_span_uses_floor_division() {
        // N=3, M=4, p=0, s=2: span = -1, floor(-1/2) = -1, output 0.
        let params = ConvParams {
            input_side: 3,
            kernel_side: 4,
            padding: 0,
            stride: 2,
        };
        assert_eq!(params.output_side(), 0);
        assert!(!params.is_valid());

        // Same span with stride 1 gives output 0 as well.
        let params = ConvParams {
            stride: 1,
            ..params
        };
        assert_eq!(params.output_side(), 0);
    }

    #[test]
    fn sample_stays_within_ranges_and_valid() {
        let mut rng = StdRng::seed_from_u64(0xC0DE);
        for _ in 0..500 {
            let params = ConvParams::sample(&mut rng);
            assert!(super::INPUT_SIDE_RANGE.contains(&params.input_side));
            assert!(super::KERNEL_SIDE_RANGE.contains(&params.kernel_side));
            assert!(super::PADDING_RANGE.contains(&params.padding));
            assert!(super::STRIDE_RANGE.contains(&params.stride));
            assert!(params.is_valid(), "sampled invalid params: {params}");
        }
    }

    #[test]
    fn header_round_trips() {
        let params = ConvParams {
            input_side: 4,
            kernel_side: 2,
            padding: 0,
            stride: 1,
        };
        let rendered = params.to_string();
        assert_eq!(rendered, "4 2 0 1");
        assert_eq!(ConvParams::parse_header(&rendered), Ok(params));
    }

    #[test]
    fn header_parse_errors_are_typed() {
        assert_eq!(
            ConvParams::parse_header("4 2 0"),
            Err(ParamHeaderError::FieldCount {
                line: "4 2 0".to_owned(),
                count: 3,
            })
        );
        assert!(matches!(
            ConvParams::parse_header("4 2 0 x"),
            Err(ParamHeaderError::NonInteger { .. })
        ));
    }
}
