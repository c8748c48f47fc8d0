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
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    drift::{DriftReport, FieldDrift, Reconcile, Reconciler},
    jsonmap,
    model::{default_job_timeout, ResetType, ServerConnection},
    IrmcError,
};

/// https://redfish.dmtf.org/schemas/v1/Bios.v1_2_0.json
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct Bios {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    pub id: String,
    pub attribute_registry: Option<String>,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// BIOS attributes to set. Values are written as strings, numeric and
/// boolean attributes included.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BiosConfig {
    pub id: Option<String>,
    pub server: ServerConnection,
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub system_reset_type: ResetType,
    #[serde(default = "default_job_timeout")]
    pub job_timeout: u64,
}

impl BiosConfig {
    pub fn validate(&self) -> Result<(), IrmcError> {
        self.server.validate()?;
        if self.attributes.is_empty() {
            return Err(IrmcError::invalid_value("attributes", "must not be empty"));
        }
        if let Some(name) = self.attributes.keys().find(|k| k.trim().is_empty()) {
            return Err(IrmcError::invalid_value(
                "attributes",
                format!("attribute name {name:?} is blank"),
            ));
        }
        if self.job_timeout == 0 {
            return Err(IrmcError::invalid_value("job_timeout", "must be positive"));
        }
        Ok(())
    }
}

impl Reconcile for BiosConfig {
    type Observed = Bios;

    fn reconcile(
        &self,
        observed: &Bios,
        reconciler: &Reconciler,
    ) -> Result<DriftReport, IrmcError> {
        self.validate()?;
        let mut report = DriftReport::new("bios");
        for (name, desired) in &self.attributes {
            let field = format!("attributes.{name}");
            match jsonmap::get_scalar_string(&observed.attributes, name, &observed.odata_id) {
                Ok(actual) => {
                    reconciler.compare_exact(&mut report, &field, Some(desired), Some(&actual));
                }
                Err(IrmcError::MissingKey { .. }) => report.push(FieldDrift {
                    field,
                    desired: desired.clone(),
                    observed: None,
                    detail: Some("attribute not reported by the BMC".to_string()),
                }),
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }
}
