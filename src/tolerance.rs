/*
 * SPDX-License-Identifier: MIT
 *
 * Permission is hereby granted, free of charge, to any person obtaining a
 * copy of this software and associated documentation files (the "Software"),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
 * THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::IrmcError;

/// Tolerance applied to capacities when no policy is configured, in bytes.
pub const DEFAULT_CAPACITY_TOLERANCE_BYTES: u64 = 500_000_000;

const BASIS_POINTS_PER_UNIT: u128 = 10_000;

/// How far apart a desired and an observed quantity may be and still be
/// treated as the same value.
///
/// Identical values are equivalent under every policy. Every policy is
/// symmetric in its two arguments.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Tolerance {
    /// Equivalent when the absolute difference is strictly below `bytes`.
    Absolute { bytes: u64 },
    /// Equivalent when the difference is strictly below `basis_points`
    /// ten-thousandths of the larger magnitude.
    Relative { basis_points: u32 },
    /// Equivalent when both values fall into the same `block_size` block.
    BlockAligned { block_size: u64 },
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Absolute {
            bytes: DEFAULT_CAPACITY_TOLERANCE_BYTES,
        }
    }
}

impl Tolerance {
    pub fn validate(&self) -> Result<(), IrmcError> {
        match *self {
            Tolerance::Absolute { bytes: 0 } => Err(IrmcError::InvalidConfig(
                "absolute tolerance must be greater than zero".to_string(),
            )),
            Tolerance::Relative { basis_points: 0 } => Err(IrmcError::InvalidConfig(
                "relative tolerance must be greater than zero basis points".to_string(),
            )),
            Tolerance::BlockAligned { block_size: 0 } => Err(IrmcError::InvalidConfig(
                "block size must be greater than zero".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Largest difference allowed between `a` and `b`, exclusive. For
    /// `BlockAligned` this is the block size.
    pub fn limit(&self, a: i64, b: i64) -> u64 {
        match *self {
            Tolerance::Absolute { bytes } => bytes,
            Tolerance::Relative { basis_points } => {
                let magnitude = a.unsigned_abs().max(b.unsigned_abs()) as u128;
                // above 100% the limit can exceed u64
                u64::try_from(magnitude * basis_points as u128 / BASIS_POINTS_PER_UNIT)
                    .unwrap_or(u64::MAX)
            }
            Tolerance::BlockAligned { block_size } => block_size,
        }
    }

    pub fn allows(&self, a: i64, b: i64) -> bool {
        if a == b {
            return true;
        }
        match *self {
            Tolerance::BlockAligned { block_size } => {
                let Ok(block) = i64::try_from(block_size) else {
                    // a block larger than i64::MAX covers every non-negative value
                    return (a >= 0) == (b >= 0);
                };
                block > 0 && a.div_euclid(block) == b.div_euclid(block)
            }
            _ => a.abs_diff(b) < self.limit(a, b),
        }
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tolerance::Absolute { bytes } => write!(f, "{bytes}"),
            Tolerance::Relative { basis_points } => write!(f, "{basis_points} basis points"),
            Tolerance::BlockAligned { block_size } => write!(f, "{block_size}-byte blocks"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_half_a_gigabyte() {
        assert_eq!(
            Tolerance::default(),
            Tolerance::Absolute {
                bytes: 500_000_000
            }
        );
    }

    #[test]
    fn test_absolute_is_strict() {
        let t = Tolerance::default();
        assert!(t.allows(0, 499_999_999));
        assert!(!t.allows(0, 500_000_000));
        assert!(!t.allows(500_000_000, 0));
    }

    #[test]
    fn test_absolute_does_not_overflow() {
        let t = Tolerance::default();
        assert!(!t.allows(i64::MIN, i64::MAX));
        assert!(t.allows(i64::MAX, i64::MAX - 1));
    }

    #[test]
    fn test_relative_scales_with_magnitude() {
        // 1%
        let t = Tolerance::Relative { basis_points: 100 };
        assert!(t.allows(1_000_000_000_000, 1_009_000_000_000));
        assert!(!t.allows(1_000_000_000, 1_020_000_000));
        assert_eq!(t.limit(200, 100), 2);
        assert!(t.allows(0, 0));
    }

    #[test]
    fn test_relative_limit_saturates() {
        let t = Tolerance::Relative {
            basis_points: u32::MAX,
        };
        assert_eq!(t.limit(i64::MAX, 0), u64::MAX);
        assert!(t.allows(i64::MAX, 0));
        assert!(t.allows(i64::MIN, i64::MAX - 1));
        // 100% of the larger magnitude is still exclusive
        let t = Tolerance::Relative {
            basis_points: 10_000,
        };
        assert_eq!(t.limit(i64::MAX, 0), i64::MAX as u64);
        assert!(!t.allows(i64::MAX, 0));
    }

    #[test]
    fn test_block_aligned() {
        let t = Tolerance::BlockAligned {
            block_size: 1 << 20,
        };
        assert!(t.allows(1 << 20, (2 << 20) - 1));
        assert!(!t.allows((1 << 20) - 1, 1 << 20));
        assert!(!t.allows(-1, 0));
        assert!(t.allows(-5, -1));
    }

    #[test]
    fn test_zero_tolerances_are_rejected() {
        assert!(Tolerance::Absolute { bytes: 0 }.validate().is_err());
        assert!(Tolerance::Relative { basis_points: 0 }.validate().is_err());
        assert!(Tolerance::BlockAligned { block_size: 0 }.validate().is_err());
        assert!(Tolerance::default().validate().is_ok());
    }

    #[test]
    fn test_tolerance_from_json() {
        let t: Tolerance =
            serde_json::from_str(r#"{"policy": "block_aligned", "block_size": 4096}"#).unwrap();
        assert_eq!(t, Tolerance::BlockAligned { block_size: 4096 });
    }
}
