// models.rs
use crate::{
    commands::Action,
    config::Settings,
    devices::{Device, IrUsbRemote},
    error::AppError,
    events::EventBus,
    transport::CommandSender,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeviceStatus {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub is_on: bool,
}

fn default_repeats() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendCommandRequest {
    pub command: Vec<Action>,
    #[serde(default = "default_repeats")]
    pub num_repeats: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Invoke {
        device: String,
        action: Action,
    },
    SendCommand {
        device: String,
        command: Vec<Action>,
        #[serde(default = "default_repeats")]
        num_repeats: u32,
    },
    StatusUpdate(DeviceStatus),
    ActionResult {
        device: String,
        actions: Vec<Action>,
        ok: bool,
        error: Option<String>,
        at: DateTime<Utc>,
    },
    Error {
        message: String,
        code: u16,
    },
}

pub struct AppState {
    pub devices: DashMap<String, Arc<dyn Device>>,
    pub events: EventBus,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            devices: DashMap::new(),
            events: EventBus::new(),
        }
    }

    /// Builds one remote per configured relay, all sharing `sender`.
    pub fn from_settings(
        settings: &Settings,
        sender: Arc<dyn CommandSender>,
    ) -> Result<Self, AppError> {
        settings
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let state = Self::new();
        for device in &settings.devices {
            let remote = IrUsbRemote::new(device.name.clone(), device.endpoint(), sender.clone());
            tracing::info!(
                name = remote.name(),
                endpoint = %remote.endpoint(),
                "Device configured"
            );
            state.add_device(Arc::new(remote))?;
        }
        Ok(state)
    }

    pub fn add_device(&self, device: Arc<dyn Device>) -> Result<(), AppError> {
        let name = device.name().to_string();
        if self.devices.contains_key(&name) {
            return Err(AppError::Validation(format!(
                "device name {name:?} is used more than once"
            )));
        }
        self.devices.insert(name, device);
        Ok(())
    }

    pub fn device(&self, name: &str) -> Result<Arc<dyn Device>, AppError> {
        self.devices
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AppError::DeviceNotFound(name.to_string()))
    }

    pub fn statuses(&self) -> Vec<DeviceStatus> {
        let mut statuses: Vec<_> = self
            .devices
            .iter()
            .map(|entry| entry.value().get_status())
            .collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    /// Sends `actions` to `name` and tells every subscriber how it went.
    pub async fn run_actions(
        &self,
        name: &str,
        actions: &[Action],
        num_repeats: u32,
    ) -> Result<DeviceStatus, AppError> {
        let device = self.device(name)?;
        let result = device.send_command(actions, num_repeats).await;

        self.events.publish(WsMessage::ActionResult {
            device: name.to_string(),
            actions: actions.to_vec(),
            ok: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
            at: Utc::now(),
        });
        let status = device.get_status();
        self.events.publish(WsMessage::StatusUpdate(status.clone()));

        result?;
        Ok(status)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
