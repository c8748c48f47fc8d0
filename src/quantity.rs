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

use serde::{Deserialize, Serialize};

use crate::{
    semantic::{expect_same_type, DriftDiagnostic, Equivalence, SemanticValue},
    tolerance::Tolerance,
    IrmcError,
};

/// A byte quantity, typically a volume capacity, that compares equal to
/// another one when both are within a tolerance of each other.
///
/// RAID controllers round requested capacities to stripe or block
/// boundaries, so the capacity read back from the BMC rarely matches the
/// requested one to the byte.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ApproximateQuantity(i64);

impl ApproximateQuantity {
    /// Negative values are accepted as is.
    pub const fn from_raw(value: i64) -> Self {
        ApproximateQuantity(value)
    }

    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Exact equality of the raw values, ignoring any tolerance.
    pub fn structural_equals(&self, other: &ApproximateQuantity) -> bool {
        self.0 == other.0
    }

    /// Compares with the default tolerance of 500,000,000 bytes.
    pub fn semantic_equals(&self, other: &ApproximateQuantity) -> Equivalence {
        self.semantic_equals_with(other, &Tolerance::default())
    }

    pub fn semantic_equals_with(
        &self,
        other: &ApproximateQuantity,
        tolerance: &Tolerance,
    ) -> Equivalence {
        if tolerance.allows(self.0, other.0) {
            return Equivalence::Equal;
        }
        Equivalence::Drift(DriftDiagnostic::Quantity {
            desired: self.0,
            observed: other.0,
            difference: self.0.abs_diff(other.0),
            tolerance: *tolerance,
        })
    }
}

impl From<i64> for ApproximateQuantity {
    fn from(value: i64) -> Self {
        ApproximateQuantity::from_raw(value)
    }
}

impl fmt::Display for ApproximateQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SemanticValue for ApproximateQuantity {
    fn type_name(&self) -> &'static str {
        "ApproximateQuantity"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn semantic_equals_dyn(
        &self,
        other: &dyn SemanticValue,
        tolerance: &Tolerance,
    ) -> Result<Equivalence, IrmcError> {
        let other = expect_same_type(self, other)?;
        Ok(self.semantic_equals_with(other, tolerance))
    }
}
