use std::error::Error;

use crate::core::config::Config;
use crate::server::run_server;

/// Applies command-line listen overrides and runs the relay until Ctrl-C.
pub async fn run_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn Error>> {
    if let Some(host) = host {
        config.server.host = Some(host);
    }
    if let Some(port) = port {
        config.server.port = Some(port);
    }
    run_server(config).await
}
