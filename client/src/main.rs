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

/* iRMC drift checker
 * Compares a desired resource configuration with the state read from a BMC.
 *
 * USAGE: ./irmc-client -k volume -d desired.json -o observed.json
 *        ./irmc-client -f combined.json
 * A combined document has the keys "kind", "desired" and "observed".
 * Run with no params for help.
 * Run with `-v` for more output.
 */

use std::{fs, process::ExitCode};

use anyhow::{anyhow, Context};
use libirmc::{
    jsonmap, ApproximateQuantity, DriftReport, Reconciler, ReconcilerConfig, ResourceKind, Tolerance,
};
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;

fn read_json(path: &str) -> Result<serde_json::Value, anyhow::Error> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
}

// "capacity" is not a resource: desired and observed are bare byte counts
fn compare_capacity(
    map: &serde_json::Map<String, serde_json::Value>,
    reconciler: &Reconciler,
    location: &str,
) -> Result<DriftReport, anyhow::Error> {
    let desired = jsonmap::get_quantity(map, "desired", location)?;
    let observed: ApproximateQuantity = jsonmap::get_quantity(map, "observed", location)?;
    let mut report = DriftReport::new("capacity");
    reconciler.compare_quantity(&mut report, "capacity_bytes", Some(desired), Some(observed));
    Ok(report)
}

fn main() -> Result<ExitCode, anyhow::Error> {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = getopts::Options::new();

    opts.optflag("h", "help", "Print this help");
    opts.optflag("v", "verbose", "Log at DEBUG level to stderr. Default is INFO");
    opts.optopt(
        "k",
        "kind",
        "Resource kind:
                volume
                boot_order
                boot_source_override
                power
                bios
                virtual_media
                user_account
                capacity (with -f only)",
        "KIND",
    );
    opts.optopt("d", "desired", "Desired configuration JSON file", "FILE");
    opts.optopt("o", "observed", "Observed Redfish JSON file", "FILE");
    opts.optopt(
        "f",
        "file",
        "Combined document with kind, desired and observed",
        "FILE",
    );
    opts.optopt(
        "t",
        "tolerance",
        "Capacity tolerance in bytes. Default 500000000",
        "BYTES",
    );
    opts.optopt("c", "config", "Reconciler configuration JSON file", "FILE");

    let args_given = opts.parse(&args[1..])?;
    let have_separate = args_given.opt_present("d") && args_given.opt_present("o");
    if args_given.opt_present("h") || !(have_separate || args_given.opt_present("f")) {
        eprintln!(
            "{}",
            opts.usage("irmc-client -k kind -d desired.json -o observed.json | -f combined.json")
        );
        eprintln!(
            "Prints one line per drifted field, or the in-sync report, to stdout.\n\
             Exit status is 0 when in sync and 2 on drift. Logs go to stderr."
        );
        return Ok(ExitCode::SUCCESS);
    }

    let log_level = if args_given.opt_present("v") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(log_level.into());
    tracing_subscriber::registry()
        .with(Layer::default().compact().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    let mut config = match args_given.opt_str("c") {
        Some(path) => serde_json::from_value::<ReconcilerConfig>(read_json(&path)?)
            .with_context(|| format!("parsing reconciler config {path}"))?,
        None => ReconcilerConfig::default(),
    };
    if let Some(bytes) = args_given.opt_str("t") {
        let bytes: u64 = bytes
            .parse()
            .with_context(|| format!("invalid tolerance {bytes}"))?;
        config.capacity_tolerance = Tolerance::Absolute { bytes };
    }
    let reconciler = Reconciler::from_config(&config)?;

    let report = if let Some(path) = args_given.opt_str("f") {
        let mut doc = match read_json(&path)? {
            serde_json::Value::Object(map) => map,
            _ => return Err(anyhow!("{path} is not a JSON object")),
        };
        let kind = jsonmap::get_str(&doc, "kind", &path)?.to_string();
        if kind == "capacity" {
            compare_capacity(&doc, &reconciler, &path)?
        } else {
            let kind: ResourceKind = kind.parse()?;
            let desired: serde_json::Value = jsonmap::extract(&mut doc, "desired", &path)?;
            let observed: serde_json::Value = jsonmap::extract(&mut doc, "observed", &path)?;
            libirmc::reconcile_json(kind, desired, observed, &reconciler)?
        }
    } else {
        let kind: ResourceKind = args_given
            .opt_str("k")
            .ok_or_else(|| anyhow!("-k is required with -d and -o"))?
            .parse()?;
        let desired = read_json(&args_given.opt_str("d").unwrap_or_default())?;
        let observed = read_json(&args_given.opt_str("o").unwrap_or_default())?;
        libirmc::reconcile_json(kind, desired, observed, &reconciler)?
    };

    // The report goes to stdout whatever RUST_LOG says.
    println!("{report}");
    if report.is_in_sync() {
        info!(resource = %report.resource, "in sync");
        return Ok(ExitCode::SUCCESS);
    }
    error!(resource = %report.resource, drifts = report.drifts.len(), "drift detected");
    Ok(ExitCode::from(2))
}
