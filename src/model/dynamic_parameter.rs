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
use std::any::Any;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    semantic::{expect_same_type, DriftDiagnostic, Equivalence, SemanticValue},
    tolerance::Tolerance,
    IrmcError,
};

/// A setting the operator asks for, paired with the value the BMC actually
/// applied. Volume cache modes are the typical case: the controller may
/// refuse `WriteBack` without a battery and fall back to `WriteThrough`.
///
/// In configuration documents it is written either as a plain string (the
/// requested value) or as `{"requested": ..., "actual": ...}`.
#[serde_with::skip_serializing_none]
#[derive(Debug, Default, Serialize, Clone, PartialEq, Eq, Hash)]
pub struct DynamicParameter {
    pub requested: Option<String>,
    // Read-only, filled in from the observed state
    pub actual: Option<String>,
}

impl DynamicParameter {
    pub fn requested(value: &str) -> Self {
        DynamicParameter {
            requested: Some(value.to_string()),
            actual: None,
        }
    }

    /// Copy of this parameter with the observed value attached.
    pub fn with_actual(&self, actual: Option<&str>) -> Self {
        DynamicParameter {
            requested: self.requested.clone(),
            actual: actual.map(str::to_string),
        }
    }

    /// True when nothing was requested, or the BMC applied exactly what was.
    pub fn is_satisfied(&self) -> bool {
        match &self.requested {
            None => true,
            Some(r) => self.actual.as_ref() == Some(r),
        }
    }

    pub fn equivalence(&self) -> Equivalence {
        match &self.requested {
            Some(r) if !self.is_satisfied() => Equivalence::Drift(DriftDiagnostic::Mismatch {
                desired: r.clone(),
                observed: self.actual.clone(),
            }),
            _ => Equivalence::Equal,
        }
    }
}

impl<'de> Deserialize<'de> for DynamicParameter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Requested(String),
            Pair {
                requested: Option<String>,
                actual: Option<String>,
            },
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Requested(requested) => DynamicParameter {
                requested: Some(requested),
                actual: None,
            },
            Repr::Pair { requested, actual } => DynamicParameter { requested, actual },
        })
    }
}

impl SemanticValue for DynamicParameter {
    fn type_name(&self) -> &'static str {
        "DynamicParameter"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    // self is the desired side, other the observed side
    fn semantic_equals_dyn(
        &self,
        other: &dyn SemanticValue,
        _tolerance: &Tolerance,
    ) -> Result<Equivalence, IrmcError> {
        let other = expect_same_type(self, other)?;
        Ok(self.with_actual(other.actual.as_deref()).equivalence())
    }
}
