//! Device inventory view
//!
//! Holds the device list, the add-device form validation, and the
//! delete-confirmation handshake. Creation first asks the backend to
//! validate connectivity; when the backend rejects that with a 400 the
//! device is added once more without validation and the operator is
//! warned.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};
use weaver_models::{Device, DeviceCreate};

use crate::errors::ConsoleError;
use crate::http::ConsoleApi;
use crate::notify::Notifier;

/// Operator input for a new device
pub struct NewDeviceForm {
    pub name: String,
    pub ip_address: String,
    pub username: String,
    pub password: SecretString,
    pub api_port: u16,
    pub snmp_community: String,
}

impl Default for NewDeviceForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            ip_address: String::new(),
            username: String::new(),
            password: SecretString::from(String::new()),
            api_port: 8728,
            snmp_community: "public".to_string(),
        }
    }
}

/// Strict dotted-quad validation: four octets, each 0..=255, no leading
/// zeros.
pub fn validate_ip(input: &str) -> Result<(), ConsoleError> {
    let invalid = || {
        ConsoleError::ValidationError(format!("'{}' is not a valid IPv4 address", input.trim()))
    };

    let octets: Vec<&str> = input.trim().split('.').collect();
    if octets.len() != 4 {
        return Err(invalid());
    }
    for octet in octets {
        if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if octet.len() > 1 && octet.starts_with('0') {
            return Err(invalid());
        }
        if octet.parse::<u16>().map_err(|_| invalid())? > 255 {
            return Err(invalid());
        }
    }
    Ok(())
}

pub struct InventoryView {
    api: Arc<dyn ConsoleApi>,
    notifier: Arc<Notifier>,
    devices: Vec<Device>,
    pending_delete: Option<i64>,
}

impl InventoryView {
    pub fn new(api: Arc<dyn ConsoleApi>, notifier: Arc<Notifier>) -> Self {
        Self {
            api,
            notifier,
            devices: Vec::new(),
            pending_delete: None,
        }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    /// Reload the inventory from the backend
    pub async fn refresh(&mut self) -> Result<(), ConsoleError> {
        self.devices = self.api.list_devices().await?;
        Ok(())
    }

    fn validate_form(form: &NewDeviceForm) -> Result<(), ConsoleError> {
        if form.name.trim().is_empty() {
            return Err(ConsoleError::ValidationError(
                "Device name is required".to_string(),
            ));
        }
        validate_ip(&form.ip_address)?;
        if form.username.trim().is_empty() {
            return Err(ConsoleError::ValidationError(
                "Username is required".to_string(),
            ));
        }
        if form.password.expose_secret().is_empty() {
            return Err(ConsoleError::ValidationError(
                "Password is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Register a new device
    pub async fn add(&mut self, form: &NewDeviceForm) -> Result<Device, ConsoleError> {
        Self::validate_form(form)?;

        let body = DeviceCreate {
            name: form.name.trim().to_string(),
            ip_address: form.ip_address.trim().to_string(),
            username: form.username.trim().to_string(),
            password: form.password.expose_secret().to_string(),
            api_port: form.api_port,
            snmp_community: form.snmp_community.clone(),
        };

        let device = match self.api.create_device(&body, true).await {
            Ok(device) => {
                self.notifier
                    .success(format!("Device '{}' added", device.name));
                device
            }
            // A 400 here means the connectivity probe failed, not that the
            // record is bad. Add it anyway and tell the operator.
            Err(ConsoleError::ApiError { status: 400, detail }) => {
                warn!(
                    "Connectivity validation failed for {}: {}",
                    body.ip_address, detail
                );
                let device = self.api.create_device(&body, false).await?;
                self.notifier.warning(format!(
                    "Device '{}' added, but it is not reachable: {}",
                    device.name, detail
                ));
                device
            }
            Err(err) => {
                self.notifier.error(err.to_string());
                return Err(err);
            }
        };

        self.refresh().await?;
        Ok(device)
    }

    /// Start the delete handshake for a device
    pub fn request_delete(&mut self, device_id: i64) {
        self.pending_delete = Some(device_id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Complete the delete handshake
    pub async fn confirm_delete(&mut self) -> Result<(), ConsoleError> {
        let Some(device_id) = self.pending_delete.take() else {
            return Err(ConsoleError::ValidationError(
                "No deletion pending".to_string(),
            ));
        };

        match self.api.delete_device(device_id).await {
            Ok(()) => {
                info!("Deleted device {}", device_id);
                self.notifier.success("Device removed");
                self.refresh().await
            }
            Err(err) => {
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_addresses() {
        for ip in ["0.0.0.0", "192.168.88.1", "255.255.255.255", " 10.0.0.1 "] {
            assert!(validate_ip(ip).is_ok(), "{} should be valid", ip);
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for ip in [
            "",
            "192.168.1",
            "192.168.1.1.1",
            "256.1.1.1",
            "192.168.01.1",
            "a.b.c.d",
            "192.168.1.",
            "1e2.0.0.1",
        ] {
            assert!(validate_ip(ip).is_err(), "{} should be invalid", ip);
        }
    }
}
