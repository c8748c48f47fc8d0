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
use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    drift::{DriftReport, Reconcile, Reconciler},
    model::{
        default_job_timeout, DynamicParameter, ODataId, ResourceStatus, ServerConnection,
    },
    ApproximateQuantity, IrmcError,
};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RaidType {
    RAID0,
    RAID1,
    RAID1E,
    RAID5,
    RAID6,
    RAID10,
    RAID50,
    RAID60,
}

impl RaidType {
    /// Smallest number of physical drives the controller accepts for this level.
    pub fn min_drives(self) -> usize {
        match self {
            RaidType::RAID0 => 1,
            RaidType::RAID1 => 2,
            RaidType::RAID1E | RaidType::RAID5 => 3,
            RaidType::RAID6 | RaidType::RAID10 => 4,
            RaidType::RAID50 => 6,
            RaidType::RAID60 => 8,
        }
    }
}

impl fmt::Display for RaidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum InitMode {
    None,
    Fast,
    Normal,
}

impl fmt::Display for InitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Fujitsu specific part of a Volume
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase", default)]
pub struct FujitsuVolumeOem {
    pub drive_cache_mode: Option<String>,
    pub read_mode: Option<String>,
    pub write_mode: Option<String>,
    pub init_mode: Option<InitMode>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct VolumeOem {
    #[serde(rename = "ts_fujitsu")]
    pub fujitsu: Option<FujitsuVolumeOem>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase", default)]
pub struct VolumeLinks {
    pub drives: Vec<ODataId>,
}

/// https://redfish.dmtf.org/schemas/v1/Volume.v1_9_0.json
/// A volume as reported by the storage controller.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct Volume {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    pub id: String,
    pub name: Option<String>,
    pub capacity_bytes: Option<ApproximateQuantity>,
    #[serde(rename = "RAIDType")]
    pub raid_type: Option<RaidType>,
    #[serde(rename = "OptimumIOSizeBytes")]
    pub optimum_io_size_bytes: Option<i64>,
    pub status: Option<ResourceStatus>,
    #[serde(default)]
    pub links: VolumeLinks,
    #[serde(default)]
    pub oem: VolumeOem,
}

impl Volume {
    fn fujitsu(&self) -> Option<&FujitsuVolumeOem> {
        self.oem.fujitsu.as_ref()
    }

    pub fn read_mode(&self) -> Option<&str> {
        self.fujitsu().and_then(|o| o.read_mode.as_deref())
    }

    pub fn write_mode(&self) -> Option<&str> {
        self.fujitsu().and_then(|o| o.write_mode.as_deref())
    }

    pub fn drive_cache_mode(&self) -> Option<&str> {
        self.fujitsu().and_then(|o| o.drive_cache_mode.as_deref())
    }
}

/// A volume an operator wants to exist on a storage controller.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VolumeConfig {
    pub id: Option<String>,
    pub server: ServerConnection,
    pub storage_controller_serial_number: String,
    pub raid_type: RaidType,
    // Controllers round to stripe boundaries, see ApproximateQuantity
    pub capacity_bytes: Option<ApproximateQuantity>,
    pub volume_name: Option<String>,
    pub init_mode: Option<InitMode>,
    /// Slot references of the member drives, e.g. "0", "1"
    pub physical_drives: Vec<String>,
    pub optimum_io_size_bytes: Option<i64>,
    #[serde(default)]
    pub read_mode: DynamicParameter,
    #[serde(default)]
    pub write_mode: DynamicParameter,
    #[serde(default)]
    pub drive_cache_mode: DynamicParameter,
    #[serde(default = "default_job_timeout")]
    pub job_timeout: u64,
}

impl VolumeConfig {
    pub fn validate(&self) -> Result<(), IrmcError> {
        self.server.validate()?;
        if self.storage_controller_serial_number.trim().is_empty() {
            return Err(IrmcError::invalid_value(
                "storage_controller_serial_number",
                "must not be empty",
            ));
        }
        let unique: HashSet<&String> = self.physical_drives.iter().collect();
        if unique.len() != self.physical_drives.len() {
            return Err(IrmcError::invalid_value(
                "physical_drives",
                "drives must not be listed twice",
            ));
        }
        if self.physical_drives.len() < self.raid_type.min_drives() {
            return Err(IrmcError::invalid_value(
                "physical_drives",
                format!(
                    "{} needs at least {} drives, got {}",
                    self.raid_type,
                    self.raid_type.min_drives(),
                    self.physical_drives.len()
                ),
            ));
        }
        if self.job_timeout == 0 {
            return Err(IrmcError::invalid_value("job_timeout", "must be positive"));
        }
        Ok(())
    }
}

impl Reconcile for VolumeConfig {
    type Observed = Volume;

    fn reconcile(
        &self,
        observed: &Volume,
        reconciler: &Reconciler,
    ) -> Result<DriftReport, IrmcError> {
        self.validate()?;
        let mut report = DriftReport::new(&format!("volume {}", observed.id));
        reconciler.compare_exact(
            &mut report,
            "volume_name",
            self.volume_name.as_deref(),
            observed.name.as_deref(),
        );
        reconciler.compare_exact(
            &mut report,
            "raid_type",
            Some(&self.raid_type),
            observed.raid_type.as_ref(),
        );
        reconciler.compare_quantity(
            &mut report,
            "capacity_bytes",
            self.capacity_bytes,
            observed.capacity_bytes,
        );
        reconciler.compare_exact(
            &mut report,
            "optimum_io_size_bytes",
            self.optimum_io_size_bytes.as_ref(),
            observed.optimum_io_size_bytes.as_ref(),
        );
        reconciler.compare_dynamic(
            &mut report,
            "read_mode",
            &self.read_mode.with_actual(observed.read_mode()),
        );
        reconciler.compare_dynamic(
            &mut report,
            "write_mode",
            &self.write_mode.with_actual(observed.write_mode()),
        );
        reconciler.compare_dynamic(
            &mut report,
            "drive_cache_mode",
            &self.drive_cache_mode.with_actual(observed.drive_cache_mode()),
        );
        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::server::test_server;

    fn config() -> VolumeConfig {
        VolumeConfig {
            id: None,
            server: test_server(),
            storage_controller_serial_number: "SKC4909720".to_string(),
            raid_type: RaidType::RAID1,
            capacity_bytes: Some(ApproximateQuantity::from_raw(1_000_000_000_000)),
            volume_name: Some("data".to_string()),
            init_mode: Some(InitMode::Fast),
            physical_drives: vec!["0".to_string(), "1".to_string()],
            optimum_io_size_bytes: None,
            read_mode: DynamicParameter::requested("ReadAhead"),
            write_mode: DynamicParameter::requested("WriteBack"),
            drive_cache_mode: DynamicParameter::default(),
            job_timeout: 600,
        }
    }

    #[test]
    fn test_volume_parser() {
        let test_data = include_str!("testdata/volume.json");
        let result: Volume = serde_json::from_str(test_data).unwrap();
        assert_eq!(result.raid_type, Some(RaidType::RAID1));
        assert_eq!(
            result.capacity_bytes,
            Some(ApproximateQuantity::from_raw(1_000_000_000_400))
        );
        assert_eq!(result.write_mode(), Some("WriteThrough"));
        assert_eq!(result.links.drives[1].last_segment(), "1");
    }

    #[test]
    fn test_volume_config_parser() {
        let test_data = include_str!("testdata/volume-config.json");
        let result: VolumeConfig = serde_json::from_str(test_data).unwrap();
        assert_eq!(result.job_timeout, 600);
        assert_eq!(result.write_mode, DynamicParameter::requested("WriteBack"));
        assert!(result.drive_cache_mode.requested.is_none());
        result.validate().unwrap();
    }

    #[test]
    fn test_reconcile_reports_write_mode_fallback() {
        let observed: Volume = serde_json::from_str(include_str!("testdata/volume.json")).unwrap();
        let report = config().reconcile(&observed, &Reconciler::default()).unwrap();
        assert_eq!(report.drifted_fields(), vec!["write_mode"]);
    }

    #[test]
    fn test_reconcile_capacity_beyond_tolerance() {
        let mut observed: Volume =
            serde_json::from_str(include_str!("testdata/volume.json")).unwrap();
        observed.capacity_bytes = Some(ApproximateQuantity::from_raw(1_000_600_000_000));
        let mut desired = config();
        desired.write_mode = DynamicParameter::default();
        let report = desired.reconcile(&observed, &Reconciler::default()).unwrap();
        assert_eq!(report.drifted_fields(), vec!["capacity_bytes"]);
        let detail = report.drifts[0].detail.as_deref().unwrap();
        assert!(detail.contains("600000000"));
        assert!(detail.contains("500000000"));
    }

    #[test]
    fn test_validate_drive_count() {
        let mut c = config();
        c.raid_type = RaidType::RAID5;
        assert!(matches!(
            c.validate(),
            Err(IrmcError::InvalidValue { ref field, .. }) if field == "physical_drives"
        ));
        c.physical_drives = vec!["0".to_string(), "0".to_string(), "1".to_string()];
        assert!(c.validate().is_err());
        c.physical_drives.push("2".to_string());
        c.physical_drives.remove(0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_negative_capacity_is_accepted() {
        let mut c = config();
        c.capacity_bytes = Some(ApproximateQuantity::from_raw(-1));
        assert!(c.validate().is_ok());
    }
}
