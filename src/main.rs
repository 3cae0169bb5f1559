//! photofeed - browse an infinite photo feed in the terminal.
//!
//! # Usage
//!
//! ```bash
//! photofeed --base-url https://photos.example.org
//! photofeed --threshold 12 --search-debounce-ms 200
//! PHOTOFEED_BASE_URL=http://localhost:8080 photofeed --no-images
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use photofeed::app::App;
use photofeed::config::{
    BASE_URL_ENV, ConfigFlags, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use photofeed::feed::HttpFeed;
use photofeed::logging;

/// Browse a paginated photo feed with thumbnails and search
#[derive(Parser, Debug)]
#[command(name = "photofeed", version, about, long_about = None)]
struct Cli {
    /// Feed server root, e.g. `https://photos.example.org`
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Rows from the bottom of the grid that trigger the next page
    #[arg(long, value_name = "ROWS")]
    threshold: Option<usize>,

    /// Quiet period after typing before suggestions are fetched (0 = immediate)
    #[arg(long, value_name = "MS")]
    search_debounce_ms: Option<u64>,

    /// Feed page used as search suggestions
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    suggestions_page: Option<u32>,

    /// HTTP request timeout
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Disable thumbnails (show placeholders only)
    #[arg(long)]
    no_images: bool,

    /// Force thumbnails to use half-cell fallback mode
    #[arg(long)]
    force_half_cell: bool,

    /// Write logs to a file (RUST_LOG selects the level)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let env_flags = ConfigFlags {
        base_url: std::env::var(BASE_URL_ENV).ok().filter(|url| !url.is_empty()),
        ..ConfigFlags::default()
    };
    let settings = file_flags.union(&env_flags).union(&cli_flags).resolve();

    if let Err(err) = logging::init(settings.log_file.as_deref()) {
        eprintln!("[warn] {err:#}");
    }

    let feed = HttpFeed::new(settings.base_url.clone(), settings.timeout)
        .context("Failed to build HTTP client")?;

    let mut app = App::new(Arc::new(feed))
        .with_settings(settings)
        .with_config_paths(
            Some(global_path),
            local_path.exists().then_some(local_path),
        );

    app.run().context("Application error")
}
