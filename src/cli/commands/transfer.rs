//! Copying the library to a remote host.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::model::TransferRequest;
use crate::server::AppState;

/// Send every library file with scp
pub fn cmd_transfer(rt: &Runtime, config: &Config, request: &TransferRequest) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;

    match rt.block_on(state.transfer.run(request)) {
        Ok(outcome) => {
            for file in &outcome.files {
                println!("  ✓ {}", file);
            }
            println!("\n{}", outcome.message);
            Ok(())
        }
        Err(e) => {
            println!("✗ {}", e.summary());
            if let Some(details) = e.details() {
                eprintln!("{}", details.trim_end());
            }
            Err(e.into())
        }
    }
}
