// ============================================================
// Layer 6: Learning Curves
// ============================================================
// Renders the training history as two SVG line charts:
//
//   loss.svg      training vs validation loss per epoch
//   accuracy.svg  training vs validation accuracy per epoch
//
// The files are written next to the lite model so a run can be
// inspected after the fact. Nothing is shown on screen.

use anyhow::{Context, Result};
use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use crate::infra::metrics::TrainingHistory;

const WIDTH:  f64 = 720.0;
const HEIGHT: f64 = 432.0;
const MARGIN: f64 = 56.0;

/// One polyline of a chart
pub struct Series<'a> {
    pub label:  &'a str,
    pub color:  &'a str,
    pub dashed: bool,
    pub values: &'a [f64],
}

pub struct LineChart<'a> {
    pub title:   &'a str,
    pub y_label: &'a str,
    /// Fixed y range; None = fit the data
    pub y_range: Option<(f64, f64)>,
    pub series:  Vec<Series<'a>>,
}

impl<'a> LineChart<'a> {
    /// Render the chart as a standalone SVG document.
    /// Epochs are numbered from 1; non-finite values are left out.
    pub fn to_svg(&self) -> String {
        let epochs = self.series.iter().map(|s| s.values.len()).max().unwrap_or(0);
        let (y_min, y_max) = self.y_range.unwrap_or_else(|| self.data_range());

        let plot_w = WIDTH - 2.0 * MARGIN;
        let plot_h = HEIGHT - 2.0 * MARGIN;
        let x_span = (epochs.max(2) - 1) as f64;
        let y_span = if y_max > y_min { y_max - y_min } else { 1.0 };

        let sx = |epoch: usize| MARGIN + (epoch - 1) as f64 / x_span * plot_w;
        let sy = |v: f64| MARGIN + plot_h - (v - y_min) / y_span * plot_h;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="12">"#
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="16">{}</text>"#,
            WIDTH / 2.0, MARGIN / 2.0, self.title
        );

        // axes
        let (x0, y0, x1, y1) = (MARGIN, MARGIN + plot_h, MARGIN + plot_w, MARGIN);
        let _ = writeln!(svg, r#"<line x1="{x0}" y1="{y0}" x2="{x1}" y2="{y0}" stroke="black"/>"#);
        let _ = writeln!(svg, r#"<line x1="{x0}" y1="{y0}" x2="{x0}" y2="{y1}" stroke="black"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle">Epoch</text>"#,
            WIDTH / 2.0, HEIGHT - 12.0
        );
        let _ = writeln!(
            svg,
            r#"<text x="16" y="{}" text-anchor="middle" transform="rotate(-90 16 {})">{}</text>"#,
            HEIGHT / 2.0, HEIGHT / 2.0, self.y_label
        );
        let _ = writeln!(svg, r#"<text x="{}" y="{}" text-anchor="end">{:.3}</text>"#, x0 - 4.0, y0, y_min);
        let _ = writeln!(svg, r#"<text x="{}" y="{}" text-anchor="end">{:.3}</text>"#, x0 - 4.0, y1 + 4.0, y_max);
        let _ = writeln!(svg, r#"<text x="{x0}" y="{}" text-anchor="middle">1</text>"#, y0 + 16.0);
        let _ = writeln!(svg, r#"<text x="{x1}" y="{}" text-anchor="middle">{}</text>"#, y0 + 16.0, epochs.max(1));

        for (i, s) in self.series.iter().enumerate() {
            let points: Vec<String> = s
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(|(e, &v)| format!("{:.2},{:.2}", sx(e + 1), sy(v.clamp(y_min, y_min + y_span))))
                .collect();
            let dash = if s.dashed { r#" stroke-dasharray="6 4""# } else { "" };
            let _ = writeln!(
                svg,
                r#"<polyline fill="none" stroke="{}" stroke-width="2"{dash} points="{}"/>"#,
                s.color,
                points.join(" ")
            );

            // legend entry, top right
            let ly = MARGIN + 14.0 + 18.0 * i as f64;
            let lx = x1 - 150.0;
            let _ = writeln!(
                svg,
                r#"<line x1="{lx}" y1="{ly}" x2="{}" y2="{ly}" stroke="{}" stroke-width="2"{dash}/>"#,
                lx + 24.0, s.color
            );
            let _ = writeln!(svg, r#"<text x="{}" y="{}">{}</text>"#, lx + 30.0, ly + 4.0, s.label);
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn data_range(&self) -> (f64, f64) {
        let finite = self
            .series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .filter(|v| v.is_finite());
        let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if lo.is_finite() { (lo.min(0.0), hi) } else { (0.0, 1.0) }
    }
}

/// Write loss.svg and accuracy.svg for `history` into `dir`.
pub fn render_curves(history: &TrainingHistory, dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let (train_loss, val_loss) = (history.train_loss(), history.val_loss());
    let (train_acc, val_acc) = (history.train_acc(), history.val_acc());

    let loss = LineChart {
        title:   "Loss",
        y_label: "Loss",
        y_range: None,
        series:  vec![
            Series { label: "Training Loss", color: "red", dashed: true, values: &train_loss },
            Series { label: "Validation Loss", color: "blue", dashed: false, values: &val_loss },
        ],
    };
    let accuracy = LineChart {
        title:   "Accuracy",
        y_label: "Accuracy",
        y_range: Some((0.0, 1.0)),
        series:  vec![
            Series { label: "Training Accuracy", color: "red", dashed: true, values: &train_acc },
            Series { label: "Validation Accuracy", color: "blue", dashed: false, values: &val_acc },
        ],
    };

    let loss_path = dir.join("loss.svg");
    let acc_path = dir.join("accuracy.svg");
    fs::write(&loss_path, loss.to_svg())
        .with_context(|| format!("Cannot write '{}'", loss_path.display()))?;
    fs::write(&acc_path, accuracy.to_svg())
        .with_context(|| format!("Cannot write '{}'", acc_path.display()))?;

    tracing::info!("Learning curves written to '{}'", dir.display());
    Ok((loss_path, acc_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::metrics::EpochMetrics;

    #[test]
    fn test_one_point_per_epoch() {
        let values = [1.0, 0.5, f64::NAN, 0.25];
        let chart = LineChart {
            title:   "Loss",
            y_label: "Loss",
            y_range: None,
            series:  vec![Series { label: "train", color: "red", dashed: true, values: &values }],
        };
        let svg = chart.to_svg();
        let points = svg
            .lines()
            .find(|l| l.starts_with("<polyline"))
            .and_then(|l| l.split("points=\"").nth(1))
            .unwrap();
        // NaN epoch is dropped
        assert_eq!(points.trim_end_matches("\"/>").split(' ').count(), 3);
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_render_curves_writes_both_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut history = TrainingHistory::default();
        history.push(EpochMetrics::new(1, 1.1, 0.3, 1.2, 0.25));

        let (loss, acc) = render_curves(&history, tmp.path()).unwrap();
        let loss_svg = fs::read_to_string(loss).unwrap();
        assert!(loss_svg.contains("Validation Loss"));
        assert!(fs::read_to_string(acc).unwrap().contains("Training Accuracy"));
    }
}
