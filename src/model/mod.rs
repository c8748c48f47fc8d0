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
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod account;
pub mod bios;
pub mod boot;
pub mod certificate;
pub mod dynamic_parameter;
pub mod power;
pub mod server;
pub mod storage;
pub mod update;
pub mod virtual_media;

pub use account::{AccountRole, ManagerAccount, UserAccountConfig};
pub use bios::{Bios, BiosConfig};
pub use boot::{
    Boot, BootOrderConfig, BootSourceOverrideConfig, BootSourceOverrideEnabled,
    BootSourceOverrideMode, BootSourceOverrideTarget,
};
pub use certificate::{Certificate, CertificateConfig, CertificateType};
pub use dynamic_parameter::DynamicParameter;
pub use power::{HostPowerAction, PowerConfig, PowerState};
pub use server::ServerConnection;
pub use storage::{InitMode, RaidType, Volume, VolumeConfig};
pub use update::{OperationApplyTime, SimpleUpdateConfig, Task, TaskState, UpdateService};
pub use virtual_media::{TransferMethod, TransferProtocolType, VirtualMedia, VirtualMediaConfig};

/// Seconds to wait for a BMC job (BIOS apply, volume creation, ...) to finish.
pub const DEFAULT_JOB_TIMEOUT: u64 = 600;

pub(crate) fn default_job_timeout() -> u64 {
    DEFAULT_JOB_TIMEOUT
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ODataId {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

impl From<&str> for ODataId {
    fn from(item: &str) -> Self {
        ODataId {
            odata_id: item.to_string(),
        }
    }
}

impl ODataId {
    // Last path segment, e.g. "0" for /redfish/v1/Systems/0/Storage/0/Drives/0
    pub fn last_segment(&self) -> &str {
        self.odata_id
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

/// How the system is restarted so that pending BIOS, boot or storage
/// settings take effect.
#[derive(Debug, Default, Serialize, Deserialize, Copy, Clone, Eq, PartialEq)]
pub enum ResetType {
    #[default]
    ForceRestart,
    GracefulRestart,
    PowerCycle,
}

impl fmt::Display for ResetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for ResetType {
    type Err = InvalidValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ForceRestart" => Ok(Self::ForceRestart),
            "GracefulRestart" => Ok(Self::GracefulRestart),
            "PowerCycle" => Ok(Self::PowerCycle),
            x => Err(InvalidValueError(format!("Invalid ResetType value: {x}"))),
        }
    }
}

#[derive(Debug)]
pub struct InvalidValueError(pub String);

impl std::error::Error for InvalidValueError {}

impl fmt::Display for InvalidValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Default, Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceStatus {
    pub health: Option<ResourceHealth>,
    pub health_rollup: Option<ResourceHealth>,
    pub state: Option<ResourceState>,
}

/// Health of a volume, drive, task, etc
/// Defined in Resource_v1.xml
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Default, PartialEq, Eq)]
pub enum ResourceHealth {
    #[serde(rename = "OK")]
    #[default]
    Ok,
    Warning,
    Critical,
}

impl fmt::Display for ResourceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// Defined in Resource_v1.xml
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum ResourceState {
    Enabled,
    Disabled,
    Degraded,
    Standby,
    StandbyOffline,
    InTest,
    Starting,
    Absent,
    UnavailableOffline,
    Deferring,
    Quiesced,
    Updating,
    Unknown,
    #[serde(other)]
    Other,
}

/// https://redfish.dmtf.org/schemas/v1/Message.v1_1_2.json
/// The message that the Redfish service returns.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub message: String,
    #[serde(default)]
    pub message_args: Vec<String>,
    pub message_id: String,
    pub resolution: Option<String>,
    pub severity: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_odata_id_last_segment() {
        let id = ODataId::from("/redfish/v1/Systems/0/Storage/0/Volumes/2");
        assert_eq!(id.last_segment(), "2");
        let id = ODataId::from("/redfish/v1/Systems/0/");
        assert_eq!(id.last_segment(), "0");
    }

    #[test]
    fn test_reset_type_parse() {
        assert_eq!("PowerCycle".parse::<ResetType>().unwrap(), ResetType::PowerCycle);
        assert!("Reboot".parse::<ResetType>().is_err());
        assert_eq!(ResetType::default().to_string(), "ForceRestart");
    }

    #[test]
    fn test_resource_state_other() {
        let s: ResourceStatus =
            serde_json::from_str(r#"{"Health": "OK", "State": "Qualified"}"#).unwrap();
        assert_eq!(s.state, Some(ResourceState::Other));
        assert_eq!(s.health, Some(ResourceHealth::Ok));
    }
}
