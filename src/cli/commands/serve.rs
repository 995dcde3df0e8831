//! The web server command.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::server;

/// Run the HTTP server until Ctrl+C
pub fn cmd_serve(rt: &Runtime, mut config: Config, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    println!(
        "Serving on http://{}:{} (downloads in {})",
        config.server.bind_address,
        config.server.port,
        config.library.download_dir.display()
    );

    rt.block_on(server::serve(&config))?;
    Ok(())
}
