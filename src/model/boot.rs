use std::{collections::HashSet, fmt, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    drift::{DriftReport, FieldDrift, Reconcile, Reconciler},
    model::{default_job_timeout, ResetType, ServerConnection},
    IrmcError,
};

/// https://redfish.dmtf.org/schemas/v1/ComputerSystem.v1_20_1.json
/// The boot information for this resource.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Boot {
    pub boot_next: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub boot_order: Vec<String>,
    pub boot_source_override_enabled: Option<BootSourceOverrideEnabled>,
    pub boot_source_override_target: Option<BootSourceOverrideTarget>,
    pub boot_source_override_mode: Option<BootSourceOverrideMode>,
    pub uefi_target_boot_source_override: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum BootSourceOverrideEnabled {
    Once,
    Continuous,
    Disabled,
    #[serde(other)]
    InvalidValue,
}

impl fmt::Display for BootSourceOverrideEnabled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// http://redfish.dmtf.org/schemas/v1/ComputerSystem.json#/definitions/BootSource
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum BootSourceOverrideTarget {
    None,
    Pxe,
    Floppy,
    Cd,
    Usb,
    Hdd,
    BiosSetup,
    Utilities,
    Diags,
    UefiShell,
    UefiTarget,
    SDCard,
    UefiHttp,
    RemoteDrive,
    #[serde(other)]
    InvalidValue,
}

impl fmt::Display for BootSourceOverrideTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum BootSourceOverrideMode {
    UEFI,
    Legacy,
    #[serde(other)]
    InvalidValue,
}

impl fmt::Display for BootSourceOverrideMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// UEFI boot option references, Boot0000 to BootFFFF
fn boot_reference_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^boot[0-9a-f]{4}$").unwrap())
}

/// Persistent boot order of a system. Applied on the next reset.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BootOrderConfig {
    pub id: Option<String>,
    pub server: ServerConnection,
    /// Leading entries of the boot order, most preferred first. Entries not
    /// listed keep their relative order behind these.
    pub boot_order: Vec<String>,
    #[serde(default)]
    pub system_reset_type: ResetType,
    #[serde(default = "default_job_timeout")]
    pub job_timeout: u64,
}

impl BootOrderConfig {
    pub fn validate(&self) -> Result<(), IrmcError> {
        self.server.validate()?;
        if self.boot_order.is_empty() {
            return Err(IrmcError::invalid_value("boot_order", "must not be empty"));
        }
        let mut seen = HashSet::new();
        for entry in &self.boot_order {
            if !boot_reference_pattern().is_match(entry) {
                return Err(IrmcError::invalid_value(
                    "boot_order",
                    format!("{entry} is not a boot option reference like Boot0001"),
                ));
            }
            if !seen.insert(entry.to_ascii_uppercase()) {
                return Err(IrmcError::invalid_value(
                    "boot_order",
                    format!("{entry} is listed twice"),
                ));
            }
        }
        if self.job_timeout == 0 {
            return Err(IrmcError::invalid_value("job_timeout", "must be positive"));
        }
        Ok(())
    }
}

impl Reconcile for BootOrderConfig {
    type Observed = Boot;

    fn reconcile(
        &self,
        observed: &Boot,
        _reconciler: &Reconciler,
    ) -> Result<DriftReport, IrmcError> {
        self.validate()?;
        let mut report = DriftReport::new("boot order");
        let matches = observed.boot_order.len() >= self.boot_order.len()
            && self
                .boot_order
                .iter()
                .zip(&observed.boot_order)
                .all(|(d, o)| d.eq_ignore_ascii_case(o));
        if !matches {
            report.push(FieldDrift {
                field: "boot_order".to_string(),
                desired: self.boot_order.join(","),
                observed: Some(observed.boot_order.join(",")),
                detail: Some("observed order does not start with the desired entries".to_string()),
            });
        }
        Ok(report)
    }
}

/// One-time or continuous override of the boot device.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BootSourceOverrideConfig {
    pub id: Option<String>,
    pub server: ServerConnection,
    pub boot_source_override_target: BootSourceOverrideTarget,
    pub boot_source_override_enabled: BootSourceOverrideEnabled,
    pub boot_source_override_mode: Option<BootSourceOverrideMode>,
    #[serde(default)]
    pub system_reset_type: ResetType,
    #[serde(default = "default_job_timeout")]
    pub job_timeout: u64,
}

impl BootSourceOverrideConfig {
    pub fn validate(&self) -> Result<(), IrmcError> {
        self.server.validate()?;
        if self.boot_source_override_target == BootSourceOverrideTarget::InvalidValue {
            return Err(IrmcError::invalid_value(
                "boot_source_override_target",
                "unknown boot source",
            ));
        }
        if self.boot_source_override_enabled == BootSourceOverrideEnabled::InvalidValue {
            return Err(IrmcError::invalid_value(
                "boot_source_override_enabled",
                "must be Once, Continuous or Disabled",
            ));
        }
        if self.boot_source_override_mode == Some(BootSourceOverrideMode::InvalidValue) {
            return Err(IrmcError::invalid_value(
                "boot_source_override_mode",
                "must be UEFI or Legacy",
            ));
        }
        if self.job_timeout == 0 {
            return Err(IrmcError::invalid_value("job_timeout", "must be positive"));
        }
        Ok(())
    }
}

impl Reconcile for BootSourceOverrideConfig {
    type Observed = Boot;

    fn reconcile(
        &self,
        observed: &Boot,
        reconciler: &Reconciler,
    ) -> Result<DriftReport, IrmcError> {
        self.validate()?;
        let mut report = DriftReport::new("boot source override");
        reconciler.compare_exact(
            &mut report,
            "boot_source_override_target",
            Some(&self.boot_source_override_target),
            observed.boot_source_override_target.as_ref(),
        );
        reconciler.compare_exact(
            &mut report,
            "boot_source_override_enabled",
            Some(&self.boot_source_override_enabled),
            observed.boot_source_override_enabled.as_ref(),
        );
        reconciler.compare_exact(
            &mut report,
            "boot_source_override_mode",
            self.boot_source_override_mode.as_ref(),
            observed.boot_source_override_mode.as_ref(),
        );
        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::server::test_server;

    fn observed() -> Boot {
        serde_json::from_str(include_str!("testdata/boot.json")).unwrap()
    }

    fn boot_order(entries: &[&str]) -> BootOrderConfig {
        BootOrderConfig {
            id: None,
            server: test_server(),
            boot_order: entries.iter().map(|e| e.to_string()).collect(),
            system_reset_type: ResetType::default(),
            job_timeout: 600,
        }
    }

    #[test]
    fn test_boot_parser() {
        let boot = observed();
        assert_eq!(boot.boot_order, vec!["Boot0003", "Boot0001", "Boot0002"]);
        assert_eq!(
            boot.boot_source_override_target,
            Some(BootSourceOverrideTarget::Pxe)
        );
        assert_eq!(
            boot.boot_source_override_mode,
            Some(BootSourceOverrideMode::UEFI)
        );
    }

    #[test]
    fn test_unknown_target_is_invalid_value() {
        let boot: Boot =
            serde_json::from_str(r#"{"BootSourceOverrideTarget": "Tape"}"#).unwrap();
        assert_eq!(
            boot.boot_source_override_target,
            Some(BootSourceOverrideTarget::InvalidValue)
        );
    }

    #[test]
    fn test_boot_order_prefix() {
        let r = Reconciler::default();
        let report = boot_order(&["Boot0003", "boot0001"]).reconcile(&observed(), &r).unwrap();
        assert!(report.is_in_sync());
        let report = boot_order(&["Boot0001"]).reconcile(&observed(), &r).unwrap();
        assert_eq!(report.drifted_fields(), vec!["boot_order"]);
        assert_eq!(report.drifts[0].observed.as_deref(), Some("Boot0003,Boot0001,Boot0002"));
    }

    #[test]
    fn test_boot_order_validation() {
        assert!(boot_order(&[]).validate().is_err());
        assert!(boot_order(&["Pxe"]).validate().is_err());
        assert!(boot_order(&["Boot000A", "boot000a"]).validate().is_err());
        assert!(boot_order(&["Boot000A", "Boot0001"]).validate().is_ok());
    }

    #[test]
    fn test_boot_source_override() {
        let config = BootSourceOverrideConfig {
            id: None,
            server: test_server(),
            boot_source_override_target: BootSourceOverrideTarget::Pxe,
            boot_source_override_enabled: BootSourceOverrideEnabled::Continuous,
            boot_source_override_mode: Some(BootSourceOverrideMode::UEFI),
            system_reset_type: ResetType::GracefulRestart,
            job_timeout: 600,
        };
        let report = config.reconcile(&observed(), &Reconciler::default()).unwrap();
        assert_eq!(report.drifted_fields(), vec!["boot_source_override_enabled"]);
        assert_eq!(report.drifts[0].desired, "Continuous");
        assert_eq!(report.drifts[0].observed.as_deref(), Some("Once"));
    }

    #[test]
    fn test_boot_source_override_zero_timeout() {
        let mut config = BootSourceOverrideConfig {
            id: None,
            server: test_server(),
            boot_source_override_target: BootSourceOverrideTarget::Hdd,
            boot_source_override_enabled: BootSourceOverrideEnabled::Once,
            boot_source_override_mode: None,
            system_reset_type: ResetType::ForceRestart,
            job_timeout: 0,
        };
        match config.validate() {
            Err(IrmcError::InvalidValue { field, .. }) => assert_eq!(field, "job_timeout"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
        config.job_timeout = 1;
        assert!(config.validate().is_ok());
    }
}
