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
use std::{any::Any, fmt};

use serde::Serialize;

use crate::{tolerance::Tolerance, IrmcError};

/// Outcome of comparing a desired value with an observed one.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum Equivalence {
    Equal,
    Drift(DriftDiagnostic),
}

impl Equivalence {
    pub fn is_equal(&self) -> bool {
        matches!(self, Equivalence::Equal)
    }

    pub fn diagnostic(&self) -> Option<&DriftDiagnostic> {
        match self {
            Equivalence::Equal => None,
            Equivalence::Drift(d) => Some(d),
        }
    }
}

/// Explains to an operator why a desired value was not accepted as equal
/// to the observed one.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum DriftDiagnostic {
    /// Two quantities further apart than the tolerance allows.
    Quantity {
        desired: i64,
        observed: i64,
        difference: u64,
        tolerance: Tolerance,
    },
    /// Two values compared for exact equality.
    Mismatch {
        desired: String,
        observed: Option<String>,
    },
}

impl DriftDiagnostic {
    /// Absolute difference between two quantities.
    pub fn difference(&self) -> Option<u64> {
        match self {
            DriftDiagnostic::Quantity { difference, .. } => Some(*difference),
            DriftDiagnostic::Mismatch { .. } => None,
        }
    }
}

impl fmt::Display for DriftDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriftDiagnostic::Quantity {
                desired,
                observed,
                difference,
                tolerance: Tolerance::BlockAligned { block_size },
            } => write!(
                f,
                "values {desired} and {observed} differ by {difference} and do not share a {block_size}-byte block"
            ),
            DriftDiagnostic::Quantity {
                desired,
                observed,
                difference,
                tolerance,
            } => write!(
                f,
                "values {desired} and {observed} differ by {difference}, allowed tolerance is {}",
                tolerance.limit(*desired, *observed)
            ),
            DriftDiagnostic::Mismatch {
                desired,
                observed: Some(observed),
            } => write!(f, "requested {desired}, found {observed}"),
            DriftDiagnostic::Mismatch {
                desired,
                observed: None,
            } => write!(f, "requested {desired}, found nothing"),
        }
    }
}

/// A value that knows how to compare itself with another value of the
/// same concrete type when only trait objects are at hand.
///
/// Comparing two different concrete types is a caller bug and yields
/// `IrmcError::TypeMismatch`, never a drift.
pub trait SemanticValue: fmt::Debug + Send + Sync + 'static {
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn semantic_equals_dyn(
        &self,
        other: &dyn SemanticValue,
        tolerance: &Tolerance,
    ) -> Result<Equivalence, IrmcError>;
}

/// Downcasts `other` to `T`, or reports which type was found instead.
pub fn expect_same_type<'a, T: SemanticValue>(
    expected: &T,
    other: &'a dyn SemanticValue,
) -> Result<&'a T, IrmcError> {
    other.as_any().downcast_ref::<T>().ok_or_else(|| {
        tracing::warn!(
            expected = expected.type_name(),
            actual = other.type_name(),
            "semantic comparison across types"
        );
        IrmcError::TypeMismatch {
            expected: expected.type_name().to_string(),
            actual: other.type_name().to_string(),
        }
    })
}
