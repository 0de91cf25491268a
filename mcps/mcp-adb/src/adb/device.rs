use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{device_args, Adb};
use crate::error::{AdbError, AdbResult};

/// State adb reports for a device that accepts commands
pub const READY_STATE: &str = "device";

/// One line of `adb devices -l`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub status: String,
    /// `key:value` fields such as `model`, `product` and `transport_id`
    #[serde(flatten)]
    pub properties: BTreeMap<String, String>,
}

impl Device {
    pub fn is_ready(&self) -> bool {
        self.status == READY_STATE
    }

    pub fn model(&self) -> Option<&str> {
        self.properties.get("model").map(String::as_str)
    }
}

/// Parse the output of `adb devices -l`
pub fn parse_devices(output: &str) -> Vec<Device> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.starts_with("List of devices") && !line.starts_with('*')
        })
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let id = fields.next()?;
            let status = fields.next()?;
            let properties = fields
                .filter_map(|field| field.split_once(':'))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Some(Device {
                id: id.to_string(),
                status: status.to_string(),
                properties,
            })
        })
        .collect()
}

/// Parse `getprop` output: one `[key]: [value]` per line
pub fn parse_getprop(output: &str) -> BTreeMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once("]: [")?;
            let key = key.strip_prefix('[')?;
            let value = value.strip_suffix(']')?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

impl Adb {
    #[instrument(skip(self))]
    pub async fn list_devices(&self) -> AdbResult<Vec<Device>> {
        let stdout = self
            .run_checked(vec!["devices".into(), "-l".into()])
            .await?;
        let devices = parse_devices(&stdout);
        debug!(count = devices.len(), "listed devices");
        Ok(devices)
    }

    /// Pick the device to talk to
    ///
    /// An explicit id is used as given. Otherwise the first device in the
    /// `device` state wins.
    pub async fn resolve_device(&self, device_id: Option<&str>) -> AdbResult<String> {
        if let Some(id) = device_id.map(str::trim).filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }

        let devices = self.list_devices().await?;
        if let Some(ready) = devices.iter().find(|d| d.is_ready()) {
            debug!(device = %ready.id, "auto-selected device");
            return Ok(ready.id.clone());
        }

        match devices.into_iter().next() {
            None => Err(AdbError::NoDevices),
            Some(first) => Err(AdbError::DeviceUnavailable {
                serial: first.id,
                state: first.status,
            }),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_device_info(&self, device: &str) -> AdbResult<BTreeMap<String, String>> {
        let stdout = self
            .run_checked(device_args(device, ["shell", "getprop"]))
            .await?;
        Ok(parse_getprop(&stdout))
    }
}
