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
//! Desired and observed state of Fujitsu iRMC servers managed over Redfish.
//!
//! Each resource (volume, boot order, BIOS attributes, ...) has a desired
//! configuration record, read from an operator's configuration, and an
//! observed record, deserialized from what the BMC reports. A [`Reconciler`]
//! compares the two and returns a [`DriftReport`].
//!
//! Capacities are compared with a tolerance, see [`ApproximateQuantity`].

pub mod drift;
pub mod jsonmap;
pub mod model;
pub mod quantity;
pub mod semantic;
pub mod tolerance;

mod error;

pub use drift::{
    DriftReport, FieldDrift, Reconcile, Reconciler, ReconcilerBuilder, ReconcilerConfig,
};
pub use error::IrmcError;
pub use model::DynamicParameter;
pub use quantity::ApproximateQuantity;
pub use semantic::{DriftDiagnostic, Equivalence, SemanticValue};
pub use tolerance::{Tolerance, DEFAULT_CAPACITY_TOLERANCE_BYTES};

/// Resource kinds that can be reconciled. Names match the keys used in
/// combined configuration documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Volume,
    BootOrder,
    BootSourceOverride,
    Power,
    Bios,
    VirtualMedia,
    UserAccount,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Volume,
        ResourceKind::BootOrder,
        ResourceKind::BootSourceOverride,
        ResourceKind::Power,
        ResourceKind::Bios,
        ResourceKind::VirtualMedia,
        ResourceKind::UserAccount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Volume => "volume",
            ResourceKind::BootOrder => "boot_order",
            ResourceKind::BootSourceOverride => "boot_source_override",
            ResourceKind::Power => "power",
            ResourceKind::Bios => "bios",
            ResourceKind::VirtualMedia => "virtual_media",
            ResourceKind::UserAccount => "user_account",
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = model::InvalidValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| model::InvalidValueError(format!("Invalid resource kind: {s}")))
    }
}

fn parse<T: serde::de::DeserializeOwned>(
    what: &str,
    value: serde_json::Value,
) -> Result<T, IrmcError> {
    serde_json::from_value(value.clone()).map_err(|source| IrmcError::JsonDeserializeError {
        what: what.to_string(),
        body: value.to_string(),
        source,
    })
}

fn reconcile_as<D>(
    kind: ResourceKind,
    desired: serde_json::Value,
    observed: serde_json::Value,
    reconciler: &Reconciler,
) -> Result<DriftReport, IrmcError>
where
    D: Reconcile + serde::de::DeserializeOwned,
    D::Observed: serde::de::DeserializeOwned,
{
    let desired: D = parse(&format!("desired {}", kind.name()), desired)?;
    let observed: D::Observed = parse(&format!("observed {}", kind.name()), observed)?;
    desired.reconcile(&observed, reconciler)
}

/// Reconciles untyped JSON documents of the given kind. For callers, like
/// the command line client, that learn the kind at runtime.
pub fn reconcile_json(
    kind: ResourceKind,
    desired: serde_json::Value,
    observed: serde_json::Value,
    reconciler: &Reconciler,
) -> Result<DriftReport, IrmcError> {
    use model::*;
    match kind {
        ResourceKind::Volume => reconcile_as::<VolumeConfig>(kind, desired, observed, reconciler),
        ResourceKind::BootOrder => {
            reconcile_as::<BootOrderConfig>(kind, desired, observed, reconciler)
        }
        ResourceKind::BootSourceOverride => {
            reconcile_as::<BootSourceOverrideConfig>(kind, desired, observed, reconciler)
        }
        ResourceKind::Power => reconcile_as::<PowerConfig>(kind, desired, observed, reconciler),
        ResourceKind::Bios => reconcile_as::<BiosConfig>(kind, desired, observed, reconciler),
        ResourceKind::VirtualMedia => {
            reconcile_as::<VirtualMediaConfig>(kind, desired, observed, reconciler)
        }
        ResourceKind::UserAccount => {
            reconcile_as::<UserAccountConfig>(kind, desired, observed, reconciler)
        }
    }
}
