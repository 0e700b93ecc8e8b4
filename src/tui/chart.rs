//! Plotters-powered rainfall chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - easy to extend later (legend, annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing and makes
/// it easy to test/benchmark the data prep separately.
pub struct RainfallChart<'a> {
    /// Daily rainfall as (days since `x_origin`, mm).
    pub rainfall: &'a [(f64, f64)],
    /// Selected periods as (start, end) day offsets.
    pub periods: &'a [(f64, f64)],
    /// X bounds (day offsets).
    pub x_bounds: [f64; 2],
    /// Y bounds (mm).
    pub y_bounds: [f64; 2],
    /// Calendar date of day offset 0 (for tick labels).
    pub x_origin: NaiveDate,
    pub y_label: &'a str,
}

impl Widget for RainfallChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a
        // chart. In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        let origin = self.x_origin;

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Small margins keep the chart readable without wasting space.
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels.
            //
            // We disable the mesh lines to reduce visual clutter in
            // low-resolution terminal rendering.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_axis_date(origin, *v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Series styling: keep the palette high-contrast for terminal
            // readability.
            let rain_color = RGBColor(0, 255, 255); // cyan
            let span_color = RGBColor(255, 0, 0); // red

            // 1) Selected period spans first, so the rainfall line stays
            //    visible on top (the terminal counterpart of the original
            //    matplotlib `axvspan` highlights).
            chart.draw_series(self.periods.iter().map(|&(start, end)| {
                Rectangle::new([(start, y0), (end, y1)], span_color.mix(0.4).filled())
            }))?;

            // 2) Daily rainfall line.
            chart.draw_series(LineSeries::new(
                self.rainfall.iter().copied(),
                &rain_color,
            ))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

fn fmt_axis_date(origin: NaiveDate, offset: f64) -> String {
    let date = origin
        .checked_add_signed(Duration::days(offset.round() as i64))
        .unwrap_or(origin);
    date.format("%Y-%m").to_string()
}
