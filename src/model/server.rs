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
use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::IrmcError;

fn endpoint_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // host name, IPv4 or bracketed IPv6 literal, optional port
    RE.get_or_init(|| {
        Regex::new(r"^https?://([^/\s:\[\]]+|\[[0-9A-Fa-f:.]+\])(:\d{1,5})?/?$").unwrap()
    })
}

/// The iRMC a resource lives on.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConnection {
    /// Base URL of the iRMC, e.g. https://10.172.201.10
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Accept self signed certificates. BMCs usually ship with one.
    #[serde(default)]
    pub ssl_insecure: bool,
}

impl ServerConnection {
    pub fn validate(&self) -> Result<(), IrmcError> {
        if !endpoint_pattern().is_match(&self.endpoint) {
            return Err(IrmcError::invalid_value(
                "endpoint",
                format!("{} is not an http(s) URL of a BMC", self.endpoint),
            ));
        }
        if self.username.is_empty() {
            return Err(IrmcError::invalid_value("username", "must not be empty"));
        }
        Ok(())
    }
}

// Never print the password
impl fmt::Debug for ServerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConnection")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("ssl_insecure", &self.ssl_insecure)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_server() -> ServerConnection {
    ServerConnection {
        endpoint: "https://10.172.201.10".to_string(),
        username: "admin".to_string(),
        password: "admin".to_string(),
        ssl_insecure: true,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_endpoint_validation() {
        let mut s = test_server();
        assert!(s.validate().is_ok());
        s.endpoint = "https://irmc.example.com:8443/".to_string();
        assert!(s.validate().is_ok());
        s.endpoint = "10.172.201.10".to_string();
        assert!(matches!(
            s.validate(),
            Err(IrmcError::InvalidValue { ref field, .. }) if field == "endpoint"
        ));
        s.endpoint = "ftp://10.172.201.10".to_string();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_ipv6_endpoint() {
        let mut s = test_server();
        for endpoint in [
            "https://[fd00::10]",
            "https://[fd00::10]:443/",
            "http://[::ffff:10.172.201.10]",
        ] {
            s.endpoint = endpoint.to_string();
            assert!(s.validate().is_ok(), "{endpoint}");
        }
        // unbracketed literals are ambiguous with the port
        s.endpoint = "https://fd00::10".to_string();
        assert!(s.validate().is_err());
        s.endpoint = "https://[fd00::10".to_string();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let mut s = test_server();
        s.password = "hunter2".to_string();
        let out = format!("{s:?}");
        assert!(!out.contains("hunter2"));
        assert!(out.contains("<redacted>"));
    }

    #[test]
    fn test_ssl_insecure_defaults_to_false() {
        let s: ServerConnection = serde_json::from_str(
            r#"{"endpoint": "https://10.0.0.1", "username": "admin", "password": "x"}"#,
        )
        .unwrap();
        assert!(!s.ssl_insecure);
    }
}
