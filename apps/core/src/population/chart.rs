//! SVG rendering of the historical series, the fitted line and the projection.

use std::fmt::{self, Write};

use super::dataset::Observation;
use super::regression::{LinearFit, Projection};
use super::scale::{group_thousands, LinearScale};
use crate::error::AppError;

// --- Layout ---
pub const WIDTH: f64 = 800.0;
pub const HEIGHT: f64 = 600.0;
const MARGIN: f64 = 50.0;
const POINT_RADIUS: f64 = 3.0;
const TICK_SIZE: f64 = 6.0;
const Y_TICK_COUNT: usize = 10;

pub const TITLE: &str = "World Population Growth Over Time";
pub const CAPTION: &str = "Source: World Bank API";

/// Everything drawn on the chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartData<'a> {
    pub observations: &'a [Observation],
    pub fit: &'a LinearFit,
    pub projections: &'a [Projection],
}

impl ChartData<'_> {
    /// From the first observed year to the last projected year.
    fn year_domain(&self) -> (f64, f64) {
        let years = self
            .observations
            .iter()
            .map(|o| o.year)
            .chain(self.projections.iter().map(|p| p.year));
        min_max(years.map(|y| y as f64))
    }

    /// Every plotted population value, so a declining series stays on canvas.
    fn population_domain(&self) -> (f64, f64) {
        let fitted = self.fit.fitted(self.observations);
        let values = self
            .observations
            .iter()
            .map(|o| o.population)
            .chain(self.projections.iter().map(|p| p.population))
            .chain(fitted.into_iter().map(|(_, y)| y));
        min_max(values)
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Render a standalone SVG document.
pub fn render_svg(data: &ChartData<'_>) -> Result<String, AppError> {
    if data.observations.is_empty() {
        return Err(AppError::Validation("nothing to chart: no observations".to_string()));
    }

    let x = LinearScale::new(data.year_domain(), (MARGIN, WIDTH - MARGIN));
    let y = LinearScale::new(data.population_domain(), (HEIGHT - MARGIN, MARGIN));

    let mut svg = String::new();
    write_document(&mut svg, data, &x, &y)
        .map_err(|e| AppError::Internal(format!("failed to render chart: {}", e)))?;
    Ok(svg)
}

fn write_document(
    out: &mut String,
    data: &ChartData<'_>,
    x: &LinearScale,
    y: &LinearScale,
) -> fmt::Result {
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        WIDTH, HEIGHT, WIDTH, HEIGHT
    )?;

    // One x tick per projected year, as many as fit the nice-step rule.
    let x_tick_count = data.projections.len().max(1);
    write_bottom_axis(out, x, x_tick_count)?;
    write_left_axis(out, y, Y_TICK_COUNT)?;

    for o in data.observations {
        writeln!(
            out,
            r#"  <circle cx="{}" cy="{}" r="{}" style="fill: steelblue;"/>"#,
            coord(x.apply(o.year as f64)),
            coord(y.apply(o.population)),
            POINT_RADIUS
        )?;
    }

    let fitted = data.fit.fitted(data.observations);
    writeln!(
        out,
        r#"  <path class="regression" d="{}" style="stroke: red; fill: none;"/>"#,
        path_data(fitted.iter().copied(), x, y)
    )?;

    if let (Some(last), false) = (fitted.last(), data.projections.is_empty()) {
        let projected = std::iter::once(*last).chain(
            data.projections
                .iter()
                .map(|p| (p.year as f64, p.population)),
        );
        writeln!(
            out,
            r#"  <path class="projection" d="{}" style="stroke: red; fill: none; stroke-dasharray: 4 4;"/>"#,
            path_data(projected, x, y)
        )?;
    }

    write_text(out, "translate(400,590)", None, "Year")?;
    write_text(out, "translate(15,300)rotate(-90)", None, "Population")?;
    write_text(
        out,
        "translate(400,20)",
        Some(r#"font-size="20px" font-weight="bold""#),
        TITLE,
    )?;
    write_text(out, "translate(400,40)", Some(r#"font-size="12px""#), CAPTION)?;

    writeln!(out, "</svg>")
}

fn write_bottom_axis(out: &mut String, scale: &LinearScale, count: usize) -> fmt::Result {
    let (r0, r1) = scale.range();
    writeln!(
        out,
        r#"  <g class="axis axis-x" transform="translate(0,{})" fill="none" font-size="10" font-family="sans-serif" text-anchor="middle">"#,
        HEIGHT - MARGIN
    )?;
    writeln!(
        out,
        r#"    <path class="domain" stroke="currentColor" d="M{},{}V0H{}V{}"/>"#,
        coord(r0),
        TICK_SIZE,
        coord(r1),
        TICK_SIZE
    )?;
    for tick in scale.ticks(count) {
        writeln!(
            out,
            r#"    <g class="tick" transform="translate({},0)"><line stroke="currentColor" y2="{}"/><text fill="currentColor" y="9" dy="0.71em">{}</text></g>"#,
            coord(scale.apply(tick)),
            TICK_SIZE,
            tick.round() as i64
        )?;
    }
    writeln!(out, "  </g>")
}

fn write_left_axis(out: &mut String, scale: &LinearScale, count: usize) -> fmt::Result {
    let (r0, r1) = scale.range();
    writeln!(
        out,
        r#"  <g class="axis axis-y" transform="translate({},0)" fill="none" font-size="10" font-family="sans-serif" text-anchor="end">"#,
        MARGIN
    )?;
    writeln!(
        out,
        r#"    <path class="domain" stroke="currentColor" d="M-{},{}H0V{}H-{}"/>"#,
        TICK_SIZE,
        coord(r0),
        coord(r1),
        TICK_SIZE
    )?;
    for tick in scale.ticks(count) {
        writeln!(
            out,
            r#"    <g class="tick" transform="translate(0,{})"><line stroke="currentColor" x2="-{}"/><text fill="currentColor" x="-9" dy="0.32em">{}</text></g>"#,
            coord(scale.apply(tick)),
            TICK_SIZE,
            group_thousands(tick)
        )?;
    }
    writeln!(out, "  </g>")
}

fn write_text(out: &mut String, transform: &str, attrs: Option<&str>, text: &str) -> fmt::Result {
    writeln!(
        out,
        r#"  <text transform="{}"{}{} style="text-anchor: middle;">{}</text>"#,
        transform,
        if attrs.is_some() { " " } else { "" },
        attrs.unwrap_or(""),
        escape_xml(text)
    )
}

fn path_data(
    points: impl Iterator<Item = (f64, f64)>,
    x: &LinearScale,
    y: &LinearScale,
) -> String {
    points
        .enumerate()
        .map(|(i, (px, py))| {
            format!(
                "{}{},{}",
                if i == 0 { "M" } else { "L" },
                coord(x.apply(px)),
                coord(y.apply(py))
            )
        })
        .collect()
}

/// Two decimals, trailing zeros dropped.
fn coord(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
