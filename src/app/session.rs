//! Per-stage run session.
//!
//! A `Session` is opened at the start of a stage and closed when it goes out of
//! scope, on success and on every early `?` return alike. It owns the stage's
//! tracing span and, for the reporting stage, the chart font registration.

use std::path::PathBuf;
use std::time::Instant;

use tracing::span::EnteredSpan;
use tracing::{info, info_span, warn};

use crate::error::{AppError, EXIT_INPUT};
use crate::plot::font::register_chart_font;

pub struct Session {
    stage: &'static str,
    started: Instant,
    font: Option<PathBuf>,
    _span: EnteredSpan,
}

impl Session {
    /// Open a session that needs no chart resources.
    pub fn open(stage: &'static str) -> Self {
        let span = info_span!("stage", name = stage).entered();
        info!("session opened");
        Self {
            stage,
            started: Instant::now(),
            font: None,
            _span: span,
        }
    }

    /// Open a session that renders charts.
    ///
    /// An explicitly configured font that fails to load is fatal. A failed
    /// probe for system fonts is not: charts will then fail one by one while
    /// the data outputs are still produced.
    pub fn open_with_charts(stage: &'static str, font: Option<PathBuf>) -> Result<Self, AppError> {
        let mut session = Self::open(stage);
        match register_chart_font(font.as_deref()) {
            Ok(path) => session.font = Some(path),
            Err(e) if e.exit_code() == EXIT_INPUT => return Err(e),
            Err(e) => warn!(error = %e, "charts will be rendered without a font"),
        }
        Ok(session)
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    /// Font registered for this session's charts, if any.
    pub fn font(&self) -> Option<&PathBuf> {
        self.font.as_ref()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        info!(
            stage = self.stage,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "session closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_font_is_fatal() {
        let err = Session::open_with_charts("analyze", Some(PathBuf::from("/nonexistent/font.ttf")))
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }

    #[test]
    fn plain_session_has_no_font() {
        let session = Session::open("extract");
        assert_eq!(session.stage(), "extract");
        assert!(session.font().is_none());
    }
}
