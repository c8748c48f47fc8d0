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

use crate::{
    model::{Message, ResourceHealth, ServerConnection, TransferProtocolType},
    IrmcError,
};

/// Seconds to wait for a firmware update task to finish.
pub const DEFAULT_UPDATE_TIMEOUT: u64 = 1800;

fn default_update_timeout() -> u64 {
    DEFAULT_UPDATE_TIMEOUT
}

/// https://redfish.dmtf.org/schemas/v1/UpdateService.v1_14_0.json
/// Service for Software Update
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateService {
    pub http_push_uri: Option<String>,
    pub max_image_size_bytes: Option<i64>,
    pub service_enabled: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum OperationApplyTime {
    #[default]
    Immediate,
    OnReset,
}

/// A firmware image for UpdateService.SimpleUpdate.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SimpleUpdateConfig {
    pub id: Option<String>,
    pub server: ServerConnection,
    pub update_image: String,
    pub transfer_protocol: TransferProtocolType,
    #[serde(default)]
    pub operation_apply_time: OperationApplyTime,
    #[serde(default = "default_update_timeout")]
    pub update_timeout: u64,
}

impl SimpleUpdateConfig {
    pub fn validate(&self) -> Result<(), IrmcError> {
        self.server.validate()?;
        if self.update_image.trim().is_empty() {
            return Err(IrmcError::invalid_value("update_image", "must not be empty"));
        }
        if let Some(implied) = TransferProtocolType::from_url(&self.update_image) {
            if implied != self.transfer_protocol {
                return Err(IrmcError::invalid_value(
                    "transfer_protocol",
                    format!(
                        "{} does not match image URL scheme ({implied})",
                        self.transfer_protocol
                    ),
                ));
            }
        }
        if self.update_timeout == 0 {
            return Err(IrmcError::invalid_value("update_timeout", "must be positive"));
        }
        Ok(())
    }

    /// Checks the update can be submitted to this service at all.
    pub fn validate_for(&self, service: &UpdateService) -> Result<(), IrmcError> {
        self.validate()?;
        if service.service_enabled == Some(false) {
            return Err(IrmcError::invalid_value(
                "update_image",
                "update service is disabled on the BMC",
            ));
        }
        Ok(())
    }
}

/// https://redfish.dmtf.org/schemas/v1/Task.v1_7_1.json
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    New,
    Starting,
    Running,
    Suspended,
    Interrupted,
    Pending,
    Stopping,
    Completed,
    Killed,
    Exception,
    Service,
    Cancelling,
    Cancelled,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    pub id: String,
    pub task_state: TaskState,
    pub task_status: Option<ResourceHealth>,
    pub percent_complete: Option<u32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Task {
    pub fn is_finished(&self) -> bool {
        matches!(
            self.task_state,
            TaskState::Completed | TaskState::Killed | TaskState::Exception | TaskState::Cancelled
        )
    }

    pub fn succeeded(&self) -> bool {
        self.task_state == TaskState::Completed
            && self.task_status != Some(ResourceHealth::Critical)
    }

    /// Message texts, newest last. Used to explain a failed update.
    pub fn message_summary(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::server::test_server;

    fn config(image: &str, protocol: TransferProtocolType) -> SimpleUpdateConfig {
        SimpleUpdateConfig {
            id: None,
            server: test_server(),
            update_image: image.to_string(),
            transfer_protocol: protocol,
            operation_apply_time: OperationApplyTime::Immediate,
            update_timeout: DEFAULT_UPDATE_TIMEOUT,
        }
    }

    #[test]
    fn test_task_parser() {
        let test_data = include_str!("testdata/task.json");
        let result: Task = serde_json::from_str(test_data).unwrap();
        assert!(result.is_finished());
        assert!(!result.succeeded());
        assert_eq!(result.message_summary(), "Task started; Image verification failed");
    }

    #[test]
    fn test_running_task() {
        let t: Task = serde_json::from_str(
            r#"{"@odata.id": "/redfish/v1/TaskService/Tasks/3", "Id": "3",
                "TaskState": "Running", "PercentComplete": 40}"#,
        )
        .unwrap();
        assert!(!t.is_finished());
        assert_eq!(t.percent_complete, Some(40));
    }

    #[test]
    fn test_update_validation() {
        assert!(config("tftp://10.0.0.2/irmc.bin", TransferProtocolType::TFTP)
            .validate()
            .is_ok());
        assert!(config("https://10.0.0.2/irmc.bin", TransferProtocolType::HTTP)
            .validate()
            .is_err());
        let disabled = UpdateService {
            service_enabled: Some(false),
            ..Default::default()
        };
        assert!(config("https://10.0.0.2/irmc.bin", TransferProtocolType::HTTPS)
            .validate_for(&disabled)
            .is_err());
    }
}
