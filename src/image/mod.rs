//! Thumbnail decoding and terminal image support.
//!
//! Rendering goes through `ratatui-image`, which picks a graphics protocol
//! the terminal answers to and falls back to Unicode half-blocks.

mod cache;

pub use cache::ThumbnailCache;

#[cfg(unix)]
use std::time::Duration;

use image::DynamicImage;
use image::imageops::FilterType;
use ratatui_image::picker::Picker;
#[cfg(unix)]
use ratatui_image::picker::cap_parser::QueryStdioOptions;

use crate::feed::FeedError;

/// How long the terminal gets to answer the capability query.
#[cfg(unix)]
const QUERY_TIMEOUT: Duration = Duration::from_millis(250);

/// Environment switch overriding truecolor detection (`1`/`true`/`yes`/`on`).
pub const TRUECOLOR_ENV: &str = "PHOTOFEED_TRUECOLOR";

/// Pick the thumbnail protocol for this terminal.
///
/// Must run before the terminal enters raw mode: the capability query talks
/// to stdio. Any query failure degrades to half-blocks.
pub fn create_picker(force_half_cell: bool) -> Option<Picker> {
    if force_half_cell || !cfg!(unix) {
        // On Windows the stdio query can leave a reader parked on console input.
        tracing::debug!(force_half_cell, "using half-block thumbnails");
        return Some(Picker::halfblocks());
    }
    Some(query_picker())
}

#[cfg(unix)]
fn query_picker() -> Picker {
    let mut options = QueryStdioOptions::default();
    options.timeout = QUERY_TIMEOUT;
    match Picker::from_query_stdio_with_options(options) {
        Ok(picker) => {
            tracing::info!(protocol = ?picker.protocol_type(), "image picker ready");
            picker
        }
        Err(err) => {
            tracing::warn!(error = %err, "terminal image query failed, using half-blocks");
            Picker::halfblocks()
        }
    }
}

#[cfg(not(unix))]
fn query_picker() -> Picker {
    Picker::halfblocks()
}

/// Decode downloaded thumbnail bytes.
///
/// # Errors
/// Returns [`FeedError::Image`] when the bytes are not a supported image.
pub fn decode_thumbnail(bytes: &[u8]) -> Result<DynamicImage, FeedError> {
    image::load_from_memory(bytes).map_err(|err| FeedError::Image(err.to_string()))
}

/// Scale `image` to fit inside a `cols` x `rows` cell box for `picker`.
pub fn fit_to_cells(picker: &Picker, image: &DynamicImage, cols: u16, rows: u16) -> DynamicImage {
    let (font_w, font_h) = picker.font_size();
    let max_w = u32::from(cols) * u32::from(font_w);
    let max_h = u32::from(rows) * u32::from(font_h);
    if max_w == 0 || max_h == 0 {
        return image.clone();
    }
    image.resize(max_w, max_h, FilterType::CatmullRom)
}

/// Whether half-block thumbnails may use 24-bit colour.
pub fn supports_truecolor_terminal() -> bool {
    truecolor_from(|key| std::env::var(key).ok())
}

/// Nearest colour in the xterm 6x6x6 cube (indices 16..=231).
pub const fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    16 + 36 * cube_level(r) + 6 * cube_level(g) + cube_level(b)
}

// Cube levels are 0, 95, 135, 175, 215, 255.
const fn cube_level(v: u8) -> u8 {
    if v < 48 {
        0
    } else if v < 115 {
        1
    } else {
        (v - 35) / 40
    }
}

fn truecolor_from(env: impl Fn(&str) -> Option<String>) -> bool {
    if let Some(force) = env(TRUECOLOR_ENV) {
        return matches!(
            force.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
    // Terminal.app advertises 256 colours only.
    if env("TERM_PROGRAM").as_deref() == Some("Apple_Terminal") {
        return false;
    }
    let has = |key: &str, needles: &[&str]| {
        env(key).is_some_and(|value| {
            let value = value.to_ascii_lowercase();
            needles.iter().any(|needle| value.contains(needle))
        })
    };
    has("COLORTERM", &["truecolor", "24bit"]) || has("TERM", &["direct", "truecolor"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 40, 40])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_forced_half_cell_picker_uses_halfblocks() {
        let picker = create_picker(true).unwrap();
        assert!(matches!(
            picker.protocol_type(),
            ratatui_image::picker::ProtocolType::Halfblocks
        ));
    }

    #[test]
    fn test_decode_thumbnail_reads_png() {
        let img = decode_thumbnail(&png_bytes(4, 3)).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[test]
    fn test_decode_thumbnail_rejects_garbage() {
        let err = decode_thumbnail(b"<html>not found</html>").unwrap_err();
        assert!(matches!(err, FeedError::Image(_)));
    }

    #[test]
    fn test_fit_to_cells_preserves_aspect_within_box() {
        let picker = Picker::halfblocks();
        let (font_w, font_h) = picker.font_size();
        let img = DynamicImage::ImageRgb8(RgbImage::new(400, 100));

        let fitted = fit_to_cells(&picker, &img, 20, 5);

        assert!(fitted.width() <= 20 * u32::from(font_w));
        assert!(fitted.height() <= 5 * u32::from(font_h));
        assert_eq!(fitted.width() / fitted.height(), 4);
    }

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_truecolor_from_colorterm_or_term() {
        assert!(truecolor_from(env_of(&[("COLORTERM", "truecolor")])));
        assert!(truecolor_from(env_of(&[("COLORTERM", "24BIT"), ("TERM", "screen")])));
        assert!(truecolor_from(env_of(&[("TERM", "xterm-direct")])));
        assert!(!truecolor_from(env_of(&[("TERM", "xterm-256color")])));
    }

    #[test]
    fn test_truecolor_override_and_apple_terminal() {
        assert!(!truecolor_from(env_of(&[
            ("TERM_PROGRAM", "Apple_Terminal"),
            ("COLORTERM", "truecolor"),
        ])));
        assert!(truecolor_from(env_of(&[
            (TRUECOLOR_ENV, "ON"),
            ("TERM_PROGRAM", "Apple_Terminal"),
        ])));
        assert!(!truecolor_from(env_of(&[(TRUECOLOR_ENV, "0"), ("COLORTERM", "truecolor")])));
    }

    #[test]
    fn test_rgb_to_xterm_256_picks_nearest_level() {
        assert_eq!(rgb_to_xterm_256(0, 0, 0), 16);
        assert_eq!(rgb_to_xterm_256(255, 255, 255), 231);
        // 100 is closest to level 95, 140 to 135.
        assert_eq!(rgb_to_xterm_256(100, 0, 0), 16 + 36);
        assert_eq!(rgb_to_xterm_256(0, 140, 0), 16 + 6 * 2);
    }
}
