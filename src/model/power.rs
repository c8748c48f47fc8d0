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
    drift::{DriftReport, Reconcile, Reconciler},
    model::ServerConnection,
    IrmcError,
};

/// Seconds to wait for the host to reach the requested power state.
pub const DEFAULT_MAX_WAIT_TIME: u64 = 120;

fn default_max_wait_time() -> u64 {
    DEFAULT_MAX_WAIT_TIME
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Off,
    On,
    PoweringOff,
    PoweringOn,
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Reset types accepted by ComputerSystem.Reset on iRMC.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum HostPowerAction {
    On,
    ForceOn,
    ForceOff,
    GracefulShutdown,
    GracefulRestart,
    ForceRestart,
    PowerCycle,
    PushPowerButton,
    Nmi,
}

impl HostPowerAction {
    /// The state the host settles in once the action completes. `None` when
    /// it depends on the state the host was in.
    pub fn resulting_state(self) -> Option<PowerState> {
        match self {
            HostPowerAction::On
            | HostPowerAction::ForceOn
            | HostPowerAction::GracefulRestart
            | HostPowerAction::ForceRestart
            | HostPowerAction::PowerCycle => Some(PowerState::On),
            HostPowerAction::ForceOff | HostPowerAction::GracefulShutdown => Some(PowerState::Off),
            HostPowerAction::PushPowerButton | HostPowerAction::Nmi => None,
        }
    }
}

impl fmt::Display for HostPowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PowerConfig {
    pub id: Option<String>,
    pub server: ServerConnection,
    pub host_power_action: HostPowerAction,
    #[serde(default = "default_max_wait_time")]
    pub max_wait_time: u64,
}

impl PowerConfig {
    pub fn validate(&self) -> Result<(), IrmcError> {
        self.server.validate()?;
        if self.max_wait_time == 0 {
            return Err(IrmcError::invalid_value("max_wait_time", "must be positive"));
        }
        Ok(())
    }
}

impl Reconcile for PowerConfig {
    type Observed = PowerState;

    fn reconcile(
        &self,
        observed: &PowerState,
        reconciler: &Reconciler,
    ) -> Result<DriftReport, IrmcError> {
        self.validate()?;
        let mut report = DriftReport::new("power");
        // Transitional states count as drift until they settle
        reconciler.compare_exact(
            &mut report,
            "power_state",
            self.host_power_action.resulting_state().as_ref(),
            Some(observed),
        );
        Ok(report)
    }
}
