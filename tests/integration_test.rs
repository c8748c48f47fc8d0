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
//! Scenario tests over combined documents in tests/fixtures. Each document
//! holds a resource kind, a desired configuration and the Redfish JSON a BMC
//! returned for it.
use std::{path::PathBuf, sync::Arc, thread};

use anyhow::{anyhow, Context};
use libirmc::{
    jsonmap, reconcile_json, ApproximateQuantity, DriftReport, IrmcError, Reconciler,
    ReconcilerConfig, ResourceKind, Tolerance,
};

const ROOT_DIR: &str = env!("CARGO_MANIFEST_DIR");

fn load_fixture(name: &str) -> Result<serde_json::Map<String, serde_json::Value>, anyhow::Error> {
    let path = PathBuf::from(ROOT_DIR).join("tests/fixtures").join(name);
    let text = std::fs::read_to_string(&path).with_context(|| format!("{}", path.display()))?;
    match serde_json::from_str(&text)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(anyhow!("{name} is not a JSON object")),
    }
}

fn run_fixture(name: &str, reconciler: &Reconciler) -> Result<DriftReport, anyhow::Error> {
    let mut doc = load_fixture(name)?;
    let kind: ResourceKind = jsonmap::get_str(&doc, "kind", name)?.parse()?;
    let desired: serde_json::Value = jsonmap::extract(&mut doc, "desired", name)?;
    let observed: serde_json::Value = jsonmap::extract(&mut doc, "observed", name)?;
    Ok(reconcile_json(kind, desired, observed, reconciler)?)
}

#[test]
fn test_volume_rounded_by_controller_is_in_sync() -> Result<(), anyhow::Error> {
    let report = run_fixture("volume-in-sync.json", &Reconciler::default())?;
    assert!(report.is_in_sync(), "{report}");
    Ok(())
}

#[test]
fn test_volume_with_tight_tolerance_drifts() -> Result<(), anyhow::Error> {
    let reconciler = Reconciler::builder()
        .capacity_tolerance(Tolerance::Absolute { bytes: 1 << 16 })
        .build()?;
    let report = run_fixture("volume-in-sync.json", &reconciler)?;
    assert_eq!(report.drifted_fields(), vec!["capacity_bytes"]);
    let detail = report.drifts[0].detail.clone().unwrap_or_default();
    assert!(detail.contains("262144"), "{detail}");
    Ok(())
}

#[test]
fn test_volume_with_block_policy() -> Result<(), anyhow::Error> {
    let config: ReconcilerConfig = serde_json::from_str(
        r#"{"capacity_tolerance": {"policy": "block_aligned", "block_size": 1000000000}}"#,
    )?;
    let report = run_fixture("volume-in-sync.json", &Reconciler::from_config(&config)?)?;
    // 999999737856 sits one block below 1000000000000
    assert_eq!(report.drifted_fields(), vec!["capacity_bytes"]);
    Ok(())
}

#[test]
fn test_bios_drift() -> Result<(), anyhow::Error> {
    let report = run_fixture("bios-drift.json", &Reconciler::default())?;
    assert_eq!(
        report.drifted_fields(),
        vec!["attributes.PowerTechnology", "attributes.QuietBoot"]
    );
    assert_eq!(
        report.drifts[1].to_string(),
        "attributes.QuietBoot: desired false, observed true"
    );
    Ok(())
}

#[test]
fn test_capacity_document() -> Result<(), anyhow::Error> {
    let doc = load_fixture("capacity.json")?;
    let desired = jsonmap::get_quantity(&doc, "desired", "capacity.json")?;
    let observed = jsonmap::get_quantity(&doc, "observed", "capacity.json")?;
    let diag = desired.semantic_equals(&observed);
    let msg = diag.diagnostic().map(|d| d.to_string()).unwrap_or_default();
    assert!(msg.contains("600000000") && msg.contains("500000000"), "{msg}");
    Ok(())
}

#[test]
fn test_invalid_desired_document_is_rejected() -> Result<(), anyhow::Error> {
    let mut doc = load_fixture("volume-in-sync.json")?;
    let mut desired: serde_json::Value = jsonmap::extract(&mut doc, "desired", "volume")?;
    desired["physical_drives"] = serde_json::json!(["0"]);
    let observed: serde_json::Value = jsonmap::extract(&mut doc, "observed", "volume")?;
    let err = reconcile_json(ResourceKind::Volume, desired, observed, &Reconciler::default())
        .err()
        .ok_or_else(|| anyhow!("expected a validation error"))?;
    assert!(matches!(err, IrmcError::InvalidValue { ref field, .. } if field == "physical_drives"));
    Ok(())
}

#[test]
fn test_reconciler_shared_across_threads() -> Result<(), anyhow::Error> {
    let reconciler = Arc::new(Reconciler::default());
    let handles: Vec<_> = (0..8_i64)
        .map(|i| {
            let reconciler = Arc::clone(&reconciler);
            thread::spawn(move || {
                let desired = ApproximateQuantity::from_raw(i * 100_000_000);
                let observed = ApproximateQuantity::from_raw(0);
                let mut report = DriftReport::new("capacity");
                reconciler.compare_quantity(
                    &mut report,
                    "capacity_bytes",
                    Some(desired),
                    Some(observed),
                );
                report.is_in_sync()
            })
        })
        .collect();
    let results: Vec<bool> = handles
        .into_iter()
        .map(|h| h.join().map_err(|_| anyhow!("thread panicked")))
        .collect::<Result<_, _>>()?;
    assert_eq!(
        results,
        vec![true, true, true, true, true, false, false, false]
    );
    Ok(())
}
