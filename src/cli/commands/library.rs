//! Library listing and tag commands.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::library::{MetadataUpdate, Page};
use crate::server::AppState;

/// Print one page of the library, optionally filtered
pub fn cmd_list(
    rt: &Runtime,
    config: &Config,
    page: usize,
    limit: usize,
    search: Option<&str>,
) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let page = Page {
        page: page.max(1),
        limit: limit.max(1),
    };

    let result = rt.block_on(async {
        match search {
            Some(query) => state.library.search(query, page).await,
            None => state.library.list(page).await,
        }
    })?;

    if result.files.is_empty() {
        println!("No files in {}", config.library.download_dir.display());
        return Ok(());
    }

    for file in &result.files {
        let m = &file.metadata;
        println!("{}", file.name);
        println!("    {} - {} ({}, {})  [{}]", m.artist, m.title, m.album, m.year, m.genre);
    }

    let p = &result.pagination;
    println!(
        "\nPage {}/{} ({} files)",
        p.current_page, p.total_pages, p.total_files
    );
    Ok(())
}

/// Apply a manual tag edit to one file
pub fn cmd_tag(
    rt: &Runtime,
    config: &Config,
    file: &str,
    update: &MetadataUpdate,
) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    rt.block_on(state.library.update_metadata(file, update))?;
    println!("✓ Metadata updated for {}", file);
    Ok(())
}

/// Merge Last.fm track info into one file
pub fn cmd_import_lastfm(rt: &Runtime, config: &Config, file: &str) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let found = rt.block_on(state.library.import_lastfm(file))?;

    println!("✓ Imported Last.fm metadata for {}", file);
    let fields = [
        ("Title", found.title),
        ("Artist", found.artist),
        ("Album", found.album),
        ("Year", found.year.map(|y| y.to_string())),
        ("Genre", found.genre),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("  {}: {}", label, value);
        }
    }
    Ok(())
}
