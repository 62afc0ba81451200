//! Font registration for chart text.
//!
//! Plotters is built with the `ab_glyph` text backend, which draws nothing
//! until a font is registered under the family name the charts ask for.
//! Registration is process-wide.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{FontStyle, register_font};
use tracing::{debug, info};

use crate::error::AppError;

/// Family name every chart uses for its text.
pub const CHART_FONT: &str = "sans-serif";

/// Fonts with CJK coverage commonly found on Linux, macOS and Windows.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/wenquanyi/wqy-microhei/wqy-microhei.ttc",
    "/usr/share/fonts/truetype/arphic/uming.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\simhei.ttf",
    "C:\\Windows\\Fonts\\msyh.ttc",
];

static PROBED: OnceLock<PathBuf> = OnceLock::new();

/// Register the chart font and return the file it came from.
///
/// An explicit path must load. Without one, the system candidates are tried
/// in order and the first that loads wins; that probe runs once per process.
pub fn register_chart_font(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Some(path) = explicit {
        load_font(path).map_err(AppError::input)?;
        info!(font = %path.display(), "registered chart font");
        return Ok(path.to_path_buf());
    }

    if let Some(path) = PROBED.get() {
        return Ok(path.clone());
    }

    let path = probe_system_fonts()?;
    info!(font = %path.display(), "registered system chart font");
    Ok(PROBED.get_or_init(|| path).clone())
}

fn probe_system_fonts() -> Result<PathBuf, AppError> {
    for candidate in SYSTEM_FONT_CANDIDATES {
        let path = Path::new(candidate);
        if !path.is_file() {
            continue;
        }
        match load_font(path) {
            Ok(()) => return Ok(path.to_path_buf()),
            Err(e) => debug!(font = %path.display(), error = %e, "skipping font"),
        }
    }
    Err(AppError::output(
        "No usable CJK font found for chart text (pass --font <file>).",
    ))
}

fn load_font(path: &Path) -> Result<(), String> {
    let bytes = fs::read(path).map_err(|e| format!("Failed to read font '{}': {e}", path.display()))?;
    // The registry keeps a `'static` borrow of the font data.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(CHART_FONT, FontStyle::Normal, bytes)
        .map_err(|_| format!("Invalid font file '{}': not a TrueType/OpenType font", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EXIT_INPUT;

    #[test]
    fn explicit_non_font_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-font.ttf");
        fs::write(&path, b"plain text, no glyph tables").unwrap();

        let err = register_chart_font(Some(&path)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert!(err.message().starts_with("Invalid font file"));
        assert!(err.message().contains("not-a-font.ttf"));
    }

    #[test]
    fn explicit_missing_font_is_rejected() {
        let err = register_chart_font(Some(Path::new("/nonexistent/font.ttf"))).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert!(err.message().starts_with("Failed to read font"));
    }
}
