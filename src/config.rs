use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::scroll::DEFAULT_THRESHOLD;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const BASE_URL_ENV: &str = "PHOTOFEED_BASE_URL";

/// Flags as they appear on the command line or in an rc file.
///
/// Valued options are `None` when not given so layers can be merged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub base_url: Option<String>,
    pub threshold: Option<usize>,
    pub search_debounce_ms: Option<u64>,
    pub suggestions_page: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub no_images: bool,
    pub force_half_cell: bool,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`. Booleans accumulate; valued options from
    /// `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            base_url: other.base_url.clone().or_else(|| self.base_url.clone()),
            threshold: other.threshold.or(self.threshold),
            search_debounce_ms: other.search_debounce_ms.or(self.search_debounce_ms),
            suggestions_page: other.suggestions_page.or(self.suggestions_page),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            no_images: self.no_images || other.no_images,
            force_half_cell: self.force_half_cell || other.force_half_cell,
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }

    /// Resolve into concrete settings, filling gaps with defaults.
    pub fn resolve(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            threshold: self.threshold.unwrap_or(defaults.threshold),
            search_debounce_ms: self
                .search_debounce_ms
                .unwrap_or(defaults.search_debounce_ms),
            suggestions_page: self
                .suggestions_page
                .filter(|page| *page >= 1)
                .unwrap_or(defaults.suggestions_page),
            timeout: self
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            images_enabled: !self.no_images,
            force_half_cell: self.force_half_cell,
            log_file: self.log_file.clone(),
        }
    }
}

/// Effective runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    /// Rows from the bottom that trigger the next page
    pub threshold: usize,
    /// Quiet period before a suggestions fetch; zero fetches immediately
    pub search_debounce_ms: u64,
    /// Feed page fetched as search suggestions
    pub suggestions_page: u32,
    pub timeout: Duration,
    pub images_enabled: bool,
    pub force_half_cell: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            threshold: DEFAULT_THRESHOLD,
            search_debounce_ms: 0,
            suggestions_page: 1,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            images_enabled: true,
            force_half_cell: false,
            log_file: None,
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("photofeed").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("photofeed")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("photofeed").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("photofeed")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".photofeedrc")
}

/// Read flags from an rc file. A missing file yields no flags.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Write flags to an rc file, creating parent directories.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# photofeed defaults (saved with --save)".to_string()];
    if let Some(url) = &flags.base_url {
        lines.push(format!("--base-url {url}"));
    }
    if let Some(rows) = flags.threshold {
        lines.push(format!("--threshold {rows}"));
    }
    if let Some(ms) = flags.search_debounce_ms {
        lines.push(format!("--search-debounce-ms {ms}"));
    }
    if let Some(page) = flags.suggestions_page {
        lines.push(format!("--suggestions-page {page}"));
    }
    if let Some(secs) = flags.timeout_secs {
        lines.push(format!("--timeout-secs {secs}"));
    }
    if flags.no_images {
        lines.push("--no-images".to_string());
    }
    if flags.force_half_cell {
        lines.push("--force-half-cell".to_string());
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove an rc file if present.
///
/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from raw tokens. Unknown tokens and unparsable
/// values are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };

        match name {
            "--no-images" => flags.no_images = true,
            "--force-half-cell" => flags.force_half_cell = true,
            "--base-url" | "--threshold" | "--search-debounce-ms" | "--suggestions-page"
            | "--timeout-secs" | "--log-file" => {
                let value = match inline {
                    Some(value) => Some(value),
                    None => {
                        let next = tokens.get(i + 1).map(String::as_str);
                        if next.is_some() {
                            i += 1;
                        }
                        next
                    }
                };
                if let Some(value) = value {
                    apply_valued_flag(&mut flags, name, value);
                }
            }
            _ => {}
        }
        i += 1;
    }
    flags
}

fn apply_valued_flag(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--base-url" => flags.base_url = Some(value.to_string()),
        "--threshold" => flags.threshold = value.parse().ok().or(flags.threshold),
        "--search-debounce-ms" => {
            flags.search_debounce_ms = value.parse().ok().or(flags.search_debounce_ms);
        }
        "--suggestions-page" => {
            flags.suggestions_page = value.parse().ok().or(flags.suggestions_page);
        }
        "--timeout-secs" => flags.timeout_secs = value.parse().ok().or(flags.timeout_secs),
        "--log-file" => flags.log_file = Some(PathBuf::from(value)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "photofeed",
            "--base-url",
            "https://example.org",
            "--threshold=12",
            "--no-images",
            "--search-debounce-ms",
            "250",
            "--log-file=feed.log",
            "--force-half-cell",
        ]));
        assert_eq!(flags.base_url.as_deref(), Some("https://example.org"));
        assert_eq!(flags.threshold, Some(12));
        assert_eq!(flags.search_debounce_ms, Some(250));
        assert!(flags.no_images);
        assert!(flags.force_half_cell);
        assert_eq!(flags.log_file, Some(PathBuf::from("feed.log")));
    }

    #[test]
    fn test_parse_flag_tokens_skips_bad_numbers() {
        let flags = parse_flag_tokens(&tokens(&["--threshold", "lots", "--timeout-secs=5"]));
        assert_eq!(flags.threshold, None);
        assert_eq!(flags.timeout_secs, Some(5));
    }

    #[test]
    fn test_trailing_valued_flag_without_value_is_ignored() {
        let flags = parse_flag_tokens(&tokens(&["--no-images", "--base-url"]));
        assert!(flags.no_images);
        assert_eq!(flags.base_url, None);
    }

    #[test]
    fn test_config_union_prefers_cli_for_options() {
        let file = ConfigFlags {
            base_url: Some("http://file".into()),
            threshold: Some(30),
            no_images: true,
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            base_url: Some("http://cli".into()),
            force_half_cell: true,
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert_eq!(merged.base_url.as_deref(), Some("http://cli"));
        assert_eq!(merged.threshold, Some(30));
        assert!(merged.no_images);
        assert!(merged.force_half_cell);
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let settings = ConfigFlags::default().resolve();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.threshold, 20);
        assert_eq!(settings.search_debounce_ms, 0);
        assert_eq!(settings.suggestions_page, 1);
        assert!(settings.images_enabled);
    }

    #[test]
    fn test_resolve_rejects_page_zero() {
        let flags = ConfigFlags {
            suggestions_page: Some(0),
            ..ConfigFlags::default()
        };
        assert_eq!(flags.resolve().suggestions_page, 1);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".photofeedrc");
        let flags = ConfigFlags {
            base_url: Some("https://photos.example".into()),
            threshold: Some(8),
            search_debounce_ms: Some(150),
            suggestions_page: Some(2),
            timeout_secs: Some(3),
            no_images: true,
            force_half_cell: true,
            log_file: Some(PathBuf::from("feed.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
