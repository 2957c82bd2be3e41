//! Two-panel ROC / PR figure rendering.

use std::path::Path;

use plotters::prelude::*;

use crate::metrics::{PrCurve, RocCurve};

/// Error from rendering the evaluation figure.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("failed to render evaluation plot: {message}")]
pub struct PlotError {
    message: String,
}

impl PlotError {
    fn new<E>(source: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self {
            message: source.to_string(),
        }
    }
}

/// Renders ROC and PR panels side by side into an SVG file.
///
/// # Errors
///
/// Fails if the backend cannot write the file or a chart element cannot be
/// drawn.
pub fn save_roc_pr_svg(
    path: &Path,
    roc: &RocCurve,
    roc_auc: f64,
    pr: &PrCurve,
    pr_auc: f64,
) -> Result<(), PlotError> {
    let root = SVGBackend::new(path, (1000, 420)).into_drawing_area();
    root.fill(&WHITE).map_err(PlotError::new)?;
    let (left, right) = root.split_horizontally(500);

    {
        let mut chart = ChartBuilder::on(&left)
            .caption("ROC", ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(36)
            .y_label_area_size(44)
            .build_cartesian_2d(0f64..1f64, 0f64..1f64)
            .map_err(PlotError::new)?;
        chart
            .configure_mesh()
            .x_desc("FPR")
            .y_desc("TPR")
            .draw()
            .map_err(PlotError::new)?;

        let points: Vec<(f64, f64)> = roc.fpr.iter().copied().zip(roc.tpr.iter().copied()).collect();
        chart
            .draw_series(LineSeries::new(points, BLUE.stroke_width(2)))
            .map_err(PlotError::new)?
            .label(format!("ROC AUC={roc_auc:.3}"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLUE.stroke_width(2)));

        // Chance diagonal.
        chart
            .draw_series(LineSeries::new(
                vec![(0.0, 0.0), (1.0, 1.0)],
                BLACK.mix(0.4),
            ))
            .map_err(PlotError::new)?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .border_style(BLACK)
            .draw()
            .map_err(PlotError::new)?;
    }

    {
        let mut chart = ChartBuilder::on(&right)
            .caption("PR", ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(36)
            .y_label_area_size(44)
            .build_cartesian_2d(0f64..1f64, 0f64..1f64)
            .map_err(PlotError::new)?;
        chart
            .configure_mesh()
            .x_desc("Recall")
            .y_desc("Precision")
            .draw()
            .map_err(PlotError::new)?;

        let points: Vec<(f64, f64)> = pr
            .recall
            .iter()
            .copied()
            .zip(pr.precision.iter().copied())
            .collect();
        chart
            .draw_series(LineSeries::new(points, RED.stroke_width(2)))
            .map_err(PlotError::new)?
            .label(format!("PR AUC={pr_auc:.3}"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED.stroke_width(2)));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerLeft)
            .border_style(BLACK)
            .draw()
            .map_err(PlotError::new)?;
    }

    root.present().map_err(PlotError::new)
}
