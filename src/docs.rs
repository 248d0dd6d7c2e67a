use utoipa::OpenApi;
use crate::{commands, handlers, models};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_devices,
        handlers::get_device,
        handlers::invoke_action,
        handlers::send_command,
    ),
    components(
        schemas(
            commands::Action,
            models::DeviceStatus,
            models::SendCommandRequest,
            models::WsMessage
        )
    )
)]
pub struct ApiDoc;
