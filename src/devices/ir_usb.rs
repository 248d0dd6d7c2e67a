// ir_usb.rs
use crate::{
    commands::Action,
    error::TransportError,
    models::DeviceStatus,
    transport::{CommandSender, Endpoint},
};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

pub const DEFAULT_NAME: &str = "Unnamed Device";

/// Remote-control facade for one IrUsb relay.
///
/// The power flag is a local guess. It is written before the command goes out
/// and is never rolled back, so a failed send leaves it showing the requested
/// state.
pub struct IrUsbRemote {
    name: String,
    endpoint: Endpoint,
    power: AtomicBool,
    sender: Arc<dyn CommandSender>,
}

impl IrUsbRemote {
    pub fn new(name: Option<String>, endpoint: Endpoint, sender: Arc<dyn CommandSender>) -> Self {
        Self {
            name: name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
            endpoint,
            power: AtomicBool::new(false),
            sender,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub async fn perform(&self, action: Action) -> Result<(), TransportError> {
        if let Some(power) = action.power_effect() {
            self.power.store(power, Ordering::Relaxed);
        }
        debug!(device = %self.name, %action, "Performing action");
        let result = self.sender.send(&self.endpoint, action.wire_command()).await;
        crate::metrics::record_command(action, result.is_ok());
        result.inspect_err(|e| warn!(device = %self.name, %action, error = %e, "Command failed"))
    }

    pub async fn turn_on(&self) -> Result<(), TransportError> {
        self.perform(Action::TurnOn).await
    }

    pub async fn turn_off(&self) -> Result<(), TransportError> {
        self.perform(Action::TurnOff).await
    }

    pub async fn up_arrow(&self) -> Result<(), TransportError> {
        self.perform(Action::Up).await
    }

    pub async fn down_arrow(&self) -> Result<(), TransportError> {
        self.perform(Action::Down).await
    }

    pub async fn left_arrow(&self) -> Result<(), TransportError> {
        self.perform(Action::Left).await
    }

    pub async fn right_arrow(&self) -> Result<(), TransportError> {
        self.perform(Action::Right).await
    }

    pub async fn enter(&self) -> Result<(), TransportError> {
        self.perform(Action::Enter).await
    }

    pub async fn previous(&self) -> Result<(), TransportError> {
        self.perform(Action::Previous).await
    }

    pub async fn play_pause(&self) -> Result<(), TransportError> {
        self.perform(Action::PlayPause).await
    }

    pub async fn skip(&self) -> Result<(), TransportError> {
        self.perform(Action::Skip).await
    }

    pub async fn back(&self) -> Result<(), TransportError> {
        self.perform(Action::Back).await
    }

    pub async fn home(&self) -> Result<(), TransportError> {
        self.perform(Action::Home).await
    }
}

#[async_trait]
impl super::Device for IrUsbRemote {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_on(&self) -> bool {
        self.power.load(Ordering::Relaxed)
    }

    async fn handle_command(&self, action: Action) -> Result<(), TransportError> {
        self.perform(action).await
    }

    fn get_status(&self) -> DeviceStatus {
        DeviceStatus {
            name: self.name.clone(),
            host: self.endpoint.host.clone(),
            port: self.endpoint.port,
            is_on: self.is_on(),
        }
    }
}
