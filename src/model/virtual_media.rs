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

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TransferProtocolType {
    CIFS,
    FTP,
    SFTP,
    HTTP,
    HTTPS,
    NFS,
    SCP,
    TFTP,
    OEM,
}

impl TransferProtocolType {
    /// Protocol implied by the scheme of an image URL.
    pub fn from_url(url: &str) -> Option<TransferProtocolType> {
        let (scheme, _) = url.split_once("://")?;
        match scheme.to_ascii_lowercase().as_str() {
            "cifs" | "smb" => Some(TransferProtocolType::CIFS),
            "ftp" => Some(TransferProtocolType::FTP),
            "sftp" => Some(TransferProtocolType::SFTP),
            "http" => Some(TransferProtocolType::HTTP),
            "https" => Some(TransferProtocolType::HTTPS),
            "nfs" => Some(TransferProtocolType::NFS),
            "scp" => Some(TransferProtocolType::SCP),
            "tftp" => Some(TransferProtocolType::TFTP),
            _ => None,
        }
    }
}

impl fmt::Display for TransferProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TransferMethod {
    #[default]
    Stream,
    Upload,
}

impl fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// https://redfish.dmtf.org/schemas/v1/VirtualMedia.v1_6_0.json
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct VirtualMedia {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    pub id: String,
    pub image: Option<String>,
    pub inserted: Option<bool>,
    #[serde(default)]
    pub media_types: Vec<String>,
    pub transfer_method: Option<TransferMethod>,
    pub transfer_protocol_type: Option<TransferProtocolType>,
    pub write_protected: Option<bool>,
}

/// An image to mount on one of the iRMC virtual media slots.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VirtualMediaConfig {
    /// Slot, e.g. "CD" or "HD"
    pub id: Option<String>,
    pub server: ServerConnection,
    pub image: String,
    /// Left unset, whatever method the BMC picks is accepted
    pub transfer_method: Option<TransferMethod>,
    /// Inferred from the image URL when not given
    pub transfer_protocol_type: Option<TransferProtocolType>,
    #[serde(default = "default_write_protected")]
    pub write_protected: bool,
}

fn default_write_protected() -> bool {
    true
}

impl VirtualMediaConfig {
    pub fn effective_protocol(&self) -> Result<TransferProtocolType, IrmcError> {
        let from_url = TransferProtocolType::from_url(&self.image);
        match (self.transfer_protocol_type, from_url) {
            (Some(explicit), Some(implied)) if explicit != implied => Err(IrmcError::invalid_value(
                "transfer_protocol_type",
                format!("{explicit} does not match image URL scheme ({implied})"),
            )),
            (Some(explicit), _) => Ok(explicit),
            (None, Some(implied)) => Ok(implied),
            (None, None) => Err(IrmcError::invalid_value(
                "transfer_protocol_type",
                format!("cannot infer protocol from {}", self.image),
            )),
        }
    }

    pub fn validate(&self) -> Result<(), IrmcError> {
        self.server.validate()?;
        if self.image.trim().is_empty() {
            return Err(IrmcError::invalid_value("image", "must not be empty"));
        }
        self.effective_protocol()?;
        Ok(())
    }
}

impl Reconcile for VirtualMediaConfig {
    type Observed = VirtualMedia;

    fn reconcile(
        &self,
        observed: &VirtualMedia,
        reconciler: &Reconciler,
    ) -> Result<DriftReport, IrmcError> {
        self.validate()?;
        let mut report = DriftReport::new(&format!("virtual media {}", observed.id));
        reconciler.compare_exact(
            &mut report,
            "image",
            Some(self.image.as_str()),
            observed.image.as_deref(),
        );
        reconciler.compare_exact(&mut report, "inserted", Some(&true), observed.inserted.as_ref());
        reconciler.compare_exact(
            &mut report,
            "write_protected",
            Some(&self.write_protected),
            observed.write_protected.as_ref(),
        );
        reconciler.compare_exact(
            &mut report,
            "transfer_method",
            self.transfer_method.as_ref(),
            observed.transfer_method.as_ref(),
        );
        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::server::test_server;

    fn config(image: &str, protocol: Option<TransferProtocolType>) -> VirtualMediaConfig {
        VirtualMediaConfig {
            id: Some("CD".to_string()),
            server: test_server(),
            image: image.to_string(),
            transfer_method: Some(TransferMethod::Stream),
            transfer_protocol_type: protocol,
            write_protected: true,
        }
    }

    #[test]
    fn test_virtual_media_parser() {
        let test_data = include_str!("testdata/virtual-media.json");
        let result: VirtualMedia = serde_json::from_str(test_data).unwrap();
        assert_eq!(result.inserted, Some(true));
        assert_eq!(result.transfer_protocol_type, Some(TransferProtocolType::HTTP));
    }

    #[test]
    fn test_protocol_inference() {
        let c = config("nfs://10.0.0.2/images/rhel9.iso", None);
        assert_eq!(c.effective_protocol().unwrap(), TransferProtocolType::NFS);
        let c = config("http://10.0.0.2/rhel9.iso", Some(TransferProtocolType::HTTPS));
        assert!(c.validate().is_err());
        let c = config("\\\\fileserver\\isos\\rhel9.iso", None);
        assert!(c.validate().is_err());
        let c = config("\\\\fileserver\\isos\\rhel9.iso", Some(TransferProtocolType::CIFS));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_write_protected_defaults_to_true() {
        let c: VirtualMediaConfig = serde_json::from_str(
            r#"{
                "server": {"endpoint": "https://10.0.0.1", "username": "admin", "password": "x"},
                "image": "https://10.0.0.2/rhel9.iso"
            }"#,
        )
        .unwrap();
        assert!(c.write_protected);
        assert!(c.transfer_method.is_none());
    }

    #[test]
    fn test_virtual_media_reconcile() {
        let observed: VirtualMedia =
            serde_json::from_str(include_str!("testdata/virtual-media.json")).unwrap();
        let r = Reconciler::default();
        let report = config("http://10.172.181.125/rhel9.iso", None)
            .reconcile(&observed, &r)
            .unwrap();
        assert!(report.is_in_sync(), "{report}");
        let report = config("http://10.172.181.125/sles15.iso", None)
            .reconcile(&observed, &r)
            .unwrap();
        assert_eq!(report.drifted_fields(), vec!["image"]);
    }

    #[test]
    fn test_unset_transfer_method_ignores_older_bmc() {
        // VirtualMedia before v1_3 has no TransferMethod
        let observed: VirtualMedia = serde_json::from_str(
            r#"{"@odata.id": "/redfish/v1/Managers/iRMC/VirtualMedia/0", "Id": "0",
                "Image": "http://10.0.0.2/a.iso", "Inserted": true, "WriteProtected": true}"#,
        )
        .unwrap();
        let r = Reconciler::default();
        let mut c = config("http://10.0.0.2/a.iso", None);
        c.transfer_method = None;
        let report = c.reconcile(&observed, &r).unwrap();
        assert!(report.is_in_sync(), "{report}");

        c.transfer_method = Some(TransferMethod::Upload);
        let report = c.reconcile(&observed, &r).unwrap();
        assert_eq!(report.drifted_fields(), vec!["transfer_method"]);
    }
}
