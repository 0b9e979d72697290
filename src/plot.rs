// SPDX-License-Identifier: AGPL-3.0-only

//! Simulation-vs-theory chart: unit-area histogram of the pooled spectrum
//! overlaid with the Stieltjes density curve, rendered to SVG.

use crate::error::WishartError;
use crate::spectral::{density_histogram, DensityCurve};
use crate::tolerances::HISTOGRAM_BINS;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1000, 600);
const SIMULATION_FILL: RGBColor = RGBColor(135, 206, 235);
/// Dash length and gap of the theory curve, in pixels.
const THEORY_DASH: (u32, u32) = (10, 6);

fn plot_err<E: std::fmt::Display>(e: E) -> WishartError {
    WishartError::Plot(e.to_string())
}

/// Render the histogram of `eigenvalues` and the theory `curve` to `path`.
///
/// # Errors
///
/// Returns [`WishartError::InvalidInput`] for an empty spectrum or curve and
/// [`WishartError::Plot`] if drawing or writing the SVG fails.
pub fn plot_results(
    path: &Path,
    eigenvalues: &[f64],
    curve: &DensityCurve,
) -> Result<(), WishartError> {
    if curve.is_empty() {
        return Err(WishartError::InvalidInput(
            "cannot plot an empty density curve".to_string(),
        ));
    }
    let bins = density_histogram(eigenvalues, HISTOGRAM_BINS)?;

    let x_lo = bins
        .first()
        .map_or(0.0, |b| b.lo)
        .min(curve.x[0])
        .min(0.0);
    let x_hi = bins
        .last()
        .map_or(0.0, |b| b.hi)
        .max(curve.x[curve.len() - 1]);
    let y_peak = bins
        .iter()
        .map(|b| b.height)
        .chain(curve.density.iter().copied())
        .fold(0.0_f64, f64::max);
    let y_hi = if y_peak > 0.0 { y_peak * 1.1 } else { 1.0 };

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Eigenvalue Density: Wishart Product Matrix",
            ("sans-serif", 24),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, 0.0..y_hi)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.08))
        .x_desc("Eigenvalue λ")
        .y_desc("Probability Density P(λ)")
        .draw()
        .map_err(plot_err)?;

    let fill = SIMULATION_FILL.mix(0.6);
    chart
        .draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.lo, 0.0), (b.hi, b.height)], fill.filled())
        }))
        .map_err(plot_err)?
        .label("Simulation")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill.filled()));
    chart
        .draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.lo, 0.0), (b.hi, b.height)], BLACK.stroke_width(1))
        }))
        .map_err(plot_err)?;

    chart
        .draw_series(DashedLineSeries::new(
            curve.points(),
            THEORY_DASH.0,
            THEORY_DASH.1,
            RED.stroke_width(2),
        ))
        .map_err(plot_err)?
        .label("Theory (Stieltjes)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_curve() -> DensityCurve {
        let x: Vec<f64> = (0..100).map(|i| 0.01 + f64::from(i) * 0.1).collect();
        let density = x.iter().map(|v| (-v).exp()).collect();
        DensityCurve {
            x,
            density,
            clipped: 0,
        }
    }

    #[test]
    fn writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let eigs: Vec<f64> = (0..500).map(|i| f64::from(i % 37) * 0.2).collect();
        plot_results(&path, &eigs, &small_curve()).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Simulation"));
        assert!(svg.contains("Theory (Stieltjes)"));
    }

    #[test]
    fn bars_are_outlined_and_theory_is_dashed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let eigs: Vec<f64> = (0..500).map(|i| f64::from(i % 37) * 0.2).collect();
        plot_results(&path, &eigs, &small_curve()).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        // filled bar plus outline per bin
        assert!(svg.matches("<rect").count() >= 2 * HISTOGRAM_BINS);
        // one polyline per dash rather than a single path
        assert!(svg.matches("<polyline").count() > 10);
    }

    #[test]
    fn empty_inputs_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        assert!(plot_results(&path, &[], &small_curve()).is_err());
        let empty = DensityCurve {
            x: Vec::new(),
            density: Vec::new(),
            clipped: 0,
        };
        assert!(plot_results(&path, &[1.0], &empty).is_err());
    }
}
