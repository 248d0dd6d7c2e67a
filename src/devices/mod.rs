// devices/mod.rs
mod ir_usb;
pub use ir_usb::{DEFAULT_NAME, IrUsbRemote};

use crate::{commands::Action, error::TransportError, models::DeviceStatus};

#[async_trait::async_trait]
pub trait Device: Send + Sync {
    fn name(&self) -> &str;
    fn is_on(&self) -> bool;
    async fn handle_command(&self, action: Action) -> Result<(), TransportError>;
    fn get_status(&self) -> DeviceStatus;

    /// Sends `actions` in order, `num_repeats` times over. Stops at the first
    /// failure.
    async fn send_command(
        &self,
        actions: &[Action],
        num_repeats: u32,
    ) -> Result<(), TransportError> {
        for _ in 0..num_repeats {
            for &action in actions {
                self.handle_command(action).await?;
            }
        }
        Ok(())
    }
}
