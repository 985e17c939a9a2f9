use std::path::{Path, PathBuf};

use chrono::Utc;
use fade_core::StrategyError;
use plotly::Plot;

/// Render the plot to a standalone HTML page. When `refresh_secs` is set the
/// page reloads itself, which pairs with watch mode rewriting the file in
/// place.
pub fn render_html(plot: &Plot, refresh_secs: Option<u64>) -> String {
    let html = plot.to_html();
    match refresh_secs {
        Some(secs) => html.replacen(
            "<head>",
            &format!("<head><meta http-equiv=\"refresh\" content=\"{secs}\">"),
            1,
        ),
        None => html,
    }
}

/// Writes dashboards into an output directory: one timestamped file per run
/// plus a stable `<symbol>_latest.html` that watch mode keeps overwriting.
pub struct ChartWriter {
    out_dir: PathBuf,
}

impl ChartWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn latest_path(&self, symbol: &str) -> PathBuf {
        self.out_dir.join(format!("{}_latest.html", symbol.to_lowercase()))
    }

    pub fn write(
        &self,
        symbol: &str,
        plot: &Plot,
        refresh_secs: Option<u64>,
    ) -> Result<(PathBuf, PathBuf), StrategyError> {
        std::fs::create_dir_all(&self.out_dir)?;

        let html = render_html(plot, refresh_secs);
        let stamped = self.out_dir.join(format!(
            "{}_{}.html",
            symbol.to_lowercase(),
            Utc::now().format("%Y%m%d_%H%M%S")
        ));
        std::fs::write(&stamped, &html)?;

        let latest = self.latest_path(symbol);
        write_atomic(&latest, &html)?;

        tracing::info!(path = %latest.display(), "dashboard written");
        Ok((stamped, latest))
    }
}

// Write via a temp file and rename so a browser refresh never sees a
// half-written page.
fn write_atomic(path: &Path, contents: &str) -> Result<(), StrategyError> {
    let tmp = path.with_extension("html.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_plot() -> Plot {
        let mut plot = Plot::new();
        plot.add_trace(plotly::Scatter::new(vec![1.0, 2.0], vec![3.0, 4.0]).name("t"));
        plot
    }

    #[test]
    fn refresh_tag_injected_once() {
        let html = render_html(&tiny_plot(), Some(60));
        assert_eq!(html.matches("http-equiv=\"refresh\"").count(), 1);
        assert!(html.contains("content=\"60\""));
    }

    #[test]
    fn no_refresh_tag_by_default() {
        let html = render_html(&tiny_plot(), None);
        assert!(!html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn writer_creates_stamped_and_latest() {
        let dir = std::env::temp_dir().join("chart_writer_test");
        let writer = ChartWriter::new(&dir);
        let (stamped, latest) = writer.write("QQQ", &tiny_plot(), None).unwrap();

        assert!(stamped.exists());
        assert!(latest.exists());
        assert!(latest.ends_with("qqq_latest.html"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
