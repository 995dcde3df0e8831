//! External tool checks.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::downloader::YtDlp;
use crate::transfer::ScpTransfer;

/// Report which external tools are installed and whether Last.fm is configured
pub fn cmd_check_tools(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    let tools = &config.tools;
    let ytdlp = YtDlp::new(&tools.ytdlp_path, tools.download_timeout());
    let scp = ScpTransfer::new(&tools.scp_path, &tools.sshpass_path, tools.transfer_timeout());

    let (has_ytdlp, has_scp, has_sshpass) = rt.block_on(async {
        tokio::join!(
            ytdlp.is_available(),
            scp.scp_available(),
            scp.sshpass_available()
        )
    });

    println!("Checking external tools...\n");
    report("yt-dlp", has_ytdlp, "required for downloads, see https://github.com/yt-dlp/yt-dlp");
    report("scp", has_scp, "required for transfers (install OpenSSH client)");
    report("sshpass", has_sshpass, "only needed for password transfers");

    match config.lastfm_api_key() {
        Some(_) => println!("✓ Last.fm API key configured"),
        None => println!("✗ Last.fm API key not configured (set LASTFM_API_KEY)"),
    }

    if !has_ytdlp {
        anyhow::bail!("yt-dlp not found at {}", ytdlp.program().display());
    }
    Ok(())
}

fn report(name: &str, found: bool, hint: &str) {
    if found {
        println!("✓ {}", name);
    } else {
        println!("✗ {}: {}", name, hint);
    }
}
