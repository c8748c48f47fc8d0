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
use tracing::debug;

use crate::{
    model::DynamicParameter,
    semantic::{Equivalence, SemanticValue},
    ApproximateQuantity, IrmcError, Tolerance,
};

/// One field whose observed value does not satisfy the desired one.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FieldDrift {
    pub field: String,
    pub desired: String,
    pub observed: Option<String>,
    pub detail: Option<String>,
}

impl fmt::Display for FieldDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: desired {}, observed {}",
            self.field,
            self.desired,
            self.observed.as_deref().unwrap_or("<absent>")
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// Every drift found while reconciling one resource.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DriftReport {
    pub resource: String,
    pub drifts: Vec<FieldDrift>,
}

impl DriftReport {
    pub fn new(resource: &str) -> Self {
        DriftReport {
            resource: resource.to_string(),
            drifts: Vec::new(),
        }
    }

    pub fn is_in_sync(&self) -> bool {
        self.drifts.is_empty()
    }

    pub fn drifted_fields(&self) -> Vec<&str> {
        self.drifts.iter().map(|d| d.field.as_str()).collect()
    }

    pub fn push(&mut self, drift: FieldDrift) {
        debug!(
            resource = %self.resource,
            field = %drift.field,
            desired = %drift.desired,
            observed = drift.observed.as_deref().unwrap_or("<absent>"),
            "drift detected"
        );
        self.drifts.push(drift);
    }
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_in_sync() {
            return write!(f, "{}: in sync", self.resource);
        }
        for (i, d) in self.drifts.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {d}", self.resource)?;
        }
        Ok(())
    }
}

/// Implemented by desired-state records that can be checked against the
/// state read back from the BMC.
pub trait Reconcile {
    type Observed;

    fn reconcile(
        &self,
        observed: &Self::Observed,
        reconciler: &Reconciler,
    ) -> Result<DriftReport, IrmcError>;
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReconcilerConfig {
    pub capacity_tolerance: Tolerance,
}

#[derive(Debug)]
pub struct ReconcilerBuilder {
    capacity_tolerance: Tolerance,
}

impl ReconcilerBuilder {
    /// Overwrites the tolerance used for volume capacities
    pub fn capacity_tolerance(mut self, tolerance: Tolerance) -> ReconcilerBuilder {
        self.capacity_tolerance = tolerance;
        self
    }

    pub fn build(&self) -> Result<Reconciler, IrmcError> {
        self.capacity_tolerance.validate()?;
        Ok(Reconciler {
            capacity_tolerance: self.capacity_tolerance,
        })
    }
}

/// Compares desired values with observed ones. Holds no mutable state, so
/// one instance can be shared by any number of threads.
#[derive(Debug, Default, Clone)]
pub struct Reconciler {
    capacity_tolerance: Tolerance,
}

impl Reconciler {
    pub fn builder() -> ReconcilerBuilder {
        ReconcilerBuilder {
            capacity_tolerance: Tolerance::default(),
        }
    }

    pub fn from_config(config: &ReconcilerConfig) -> Result<Reconciler, IrmcError> {
        Reconciler::builder()
            .capacity_tolerance(config.capacity_tolerance)
            .build()
    }

    pub fn capacity_tolerance(&self) -> &Tolerance {
        &self.capacity_tolerance
    }

    pub fn compare_quantity(
        &self,
        report: &mut DriftReport,
        field: &str,
        desired: Option<ApproximateQuantity>,
        observed: Option<ApproximateQuantity>,
    ) {
        let Some(desired) = desired else {
            return;
        };
        match observed {
            None => report.push(FieldDrift {
                field: field.to_string(),
                desired: desired.to_string(),
                observed: None,
                detail: None,
            }),
            Some(observed) => {
                if let Equivalence::Drift(d) =
                    desired.semantic_equals_with(&observed, &self.capacity_tolerance)
                {
                    report.push(FieldDrift {
                        field: field.to_string(),
                        desired: desired.to_string(),
                        observed: Some(observed.to_string()),
                        detail: Some(d.to_string()),
                    });
                }
            }
        }
    }

    pub fn compare_exact<T>(
        &self,
        report: &mut DriftReport,
        field: &str,
        desired: Option<&T>,
        observed: Option<&T>,
    ) where
        T: PartialEq + fmt::Display + ?Sized,
    {
        let Some(desired) = desired else {
            return;
        };
        if observed != Some(desired) {
            report.push(FieldDrift {
                field: field.to_string(),
                desired: desired.to_string(),
                observed: observed.map(|o| o.to_string()),
                detail: None,
            });
        }
    }

    /// `param.actual` must already hold the observed value.
    pub fn compare_dynamic(&self, report: &mut DriftReport, field: &str, param: &DynamicParameter) {
        if let Equivalence::Drift(d) = param.equivalence() {
            report.push(FieldDrift {
                field: field.to_string(),
                desired: param.requested.clone().unwrap_or_default(),
                observed: param.actual.clone(),
                detail: Some(d.to_string()),
            });
        }
    }

    /// Comparison for callers that only hold trait objects. Fails with
    /// `TypeMismatch` when the two sides are not the same type.
    pub fn compare_values(
        &self,
        report: &mut DriftReport,
        field: &str,
        desired: &dyn SemanticValue,
        observed: &dyn SemanticValue,
    ) -> Result<(), IrmcError> {
        if let Equivalence::Drift(d) =
            desired.semantic_equals_dyn(observed, &self.capacity_tolerance)?
        {
            report.push(FieldDrift {
                field: field.to_string(),
                desired: format!("{desired:?}"),
                observed: Some(format!("{observed:?}")),
                detail: Some(d.to_string()),
            });
        }
        Ok(())
    }
}
