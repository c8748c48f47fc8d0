use std::{cmp::Ordering, fmt, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    drift::{DriftReport, Reconcile, Reconciler},
    model::ServerConnection,
    IrmcError,
};

#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerAccount {
    pub id: Option<String>,

    #[serde(rename = "UserName")]
    pub username: String,

    // A RoleId converted to string
    pub role_id: String,

    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub locked: Option<bool>,
}

impl Ord for ManagerAccount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl PartialOrd for ManagerAccount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ManagerAccount {
    fn eq(&self, other: &ManagerAccount) -> bool {
        self.id == other.id
    }
}

/// Predefined iRMC roles. Anything else is passed through as `Oem`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum AccountRole {
    Administrator,
    Operator,
    ReadOnly,
    #[serde(untagged)]
    Oem(String),
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRole::Oem(role) => f.write_str(role),
            _ => fmt::Debug::fmt(self, f),
        }
    }
}

fn username_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.\-]{1,16}$").unwrap())
}

/// A local iRMC user.
#[derive(Serialize, Deserialize, Clone)]
pub struct UserAccountConfig {
    pub id: Option<String>,
    pub server: ServerConnection,
    pub username: String,
    // Write-only. The BMC never returns it, so it takes no part in drift.
    pub password: String,
    pub role_id: AccountRole,
    /// Left unset, the account state on the BMC is not checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl fmt::Debug for UserAccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAccountConfig")
            .field("id", &self.id)
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role_id", &self.role_id)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl UserAccountConfig {
    pub fn validate(&self) -> Result<(), IrmcError> {
        self.server.validate()?;
        if !username_pattern().is_match(&self.username) {
            return Err(IrmcError::invalid_value(
                "username",
                "1 to 16 characters out of letters, digits, '_', '.' and '-'",
            ));
        }
        if self.password.is_empty() {
            return Err(IrmcError::invalid_value("password", "must not be empty"));
        }
        Ok(())
    }
}

impl Reconcile for UserAccountConfig {
    type Observed = ManagerAccount;

    fn reconcile(
        &self,
        observed: &ManagerAccount,
        reconciler: &Reconciler,
    ) -> Result<DriftReport, IrmcError> {
        self.validate()?;
        let mut report = DriftReport::new(&format!(
            "account {}",
            observed.id.as_deref().unwrap_or(&observed.username)
        ));
        reconciler.compare_exact(
            &mut report,
            "username",
            Some(self.username.as_str()),
            Some(observed.username.as_str()),
        );
        let role = self.role_id.to_string();
        reconciler.compare_exact(
            &mut report,
            "role_id",
            Some(role.as_str()),
            Some(observed.role_id.as_str()),
        );
        reconciler.compare_exact(
            &mut report,
            "enabled",
            self.enabled.as_ref(),
            observed.enabled.as_ref(),
        );
        Ok(report)
    }
}
