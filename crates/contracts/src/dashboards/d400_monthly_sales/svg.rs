//! SVG renderer for [`ChartSpec`].
//!
//! Used by the frontend to draw charts inline and by the backend for the
//! SVG export endpoint, so both produce identical markup.

use super::chart::{BarPattern, ChartSpec, Heatmap, LineDash, MarkerSymbol};
use crate::shared::format::format_grouped;
use crate::shared::palette;

pub const DEFAULT_WIDTH: f64 = 960.0;
pub const DEFAULT_HEIGHT: f64 = 480.0;

const MARGIN_TOP: f64 = 76.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 84.0;
const MARGIN_LEFT: f64 = 76.0;
const COLORBAR_SPACE: f64 = 96.0;
const FONT_FAMILY: &str = "Pretendard, system-ui, -apple-system, 'Segoe UI', Roboto, 'Noto Sans KR', 'Apple SD Gothic Neo', sans-serif";

/// Renders a chart into a standalone SVG document.
pub fn render_chart(spec: &ChartSpec, width: f64, height: f64) -> String {
    let mut out = String::with_capacity(8 * 1024);
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img" aria-label="{label}" font-family="{font}">"#,
        w = num(width),
        h = num(height),
        label = escape(&spec.title),
        font = escape(FONT_FAMILY),
    ));
    out.push_str(&format!("<title>{}</title>", escape(&spec.title)));
    out.push_str(&format!(
        r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
        num(width),
        num(height),
        palette::CANVAS
    ));
    out.push_str(&format!(
        r#"<text x="{}" y="32" font-size="18" font-weight="600" fill="{}">{}</text>"#,
        num(MARGIN_LEFT),
        palette::NEUTRAL_TEXT,
        escape(&spec.title)
    ));

    match &spec.heatmap {
        Some(heatmap) => render_heatmap(&mut out, spec, heatmap, width, height),
        None => render_xy(&mut out, spec, width, height),
    }

    out.push_str("</svg>");
    out
}

/// Same as [`render_chart`] with the default export size.
pub fn render_chart_default(spec: &ChartSpec) -> String {
    render_chart(spec, DEFAULT_WIDTH, DEFAULT_HEIGHT)
}

// ---------------------------------------------------------------------------
// Line / bar charts
// ---------------------------------------------------------------------------

struct Plot {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
    domain_min: f64,
    domain_max: f64,
    band: f64,
}

impl Plot {
    fn y(&self, value: f64) -> f64 {
        let span = self.domain_max - self.domain_min;
        if span <= 0.0 {
            return self.y1;
        }
        self.y1 - (value - self.domain_min) / span * (self.y1 - self.y0)
    }

    fn x(&self, index: usize) -> f64 {
        self.x0 + self.band * (index as f64 + 0.5)
    }
}

fn render_xy(out: &mut String, spec: &ChartSpec, width: f64, height: f64) {
    let (lo, hi) = value_bounds(&spec.y_values());
    let ticks = nice_ticks(lo, hi, 5);
    let step = if ticks.len() > 1 { ticks[1] - ticks[0] } else { 1.0 };
    let categories = spec.categories.len().max(1);

    let plot = Plot {
        x0: MARGIN_LEFT,
        x1: width - MARGIN_RIGHT,
        y0: MARGIN_TOP,
        y1: height - MARGIN_BOTTOM,
        domain_min: ticks.first().copied().unwrap_or(lo),
        domain_max: ticks.last().copied().unwrap_or(hi),
        band: (width - MARGIN_RIGHT - MARGIN_LEFT) / categories as f64,
    };

    let hatch_id = format!("{}-hatch", spec.kind.file_stem());
    out.push_str(&format!(
        r#"<defs><pattern id="{id}" patternUnits="userSpaceOnUse" width="6" height="6" patternTransform="rotate(45)"><line x1="0" y1="0" x2="0" y2="6" stroke="{c}" stroke-width="2"/></pattern></defs>"#,
        id = hatch_id,
        c = palette::CANVAS
    ));

    // grid + y tick labels
    for tick in &ticks {
        let y = plot.y(*tick);
        out.push_str(&format!(
            r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="{}" stroke-width="1"/>"#,
            num(plot.x0),
            num(plot.x1),
            palette::GRID,
            y = num(y)
        ));
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="11" text-anchor="end" fill="{}">{}</text>"#,
            num(plot.x0 - 8.0),
            num(y + 4.0),
            palette::NEUTRAL_TEXT,
            escape(&format_tick(*tick, step))
        ));
    }
    if plot.domain_min < 0.0 && plot.domain_max > 0.0 {
        let y = plot.y(0.0);
        out.push_str(&format!(
            r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="{}" stroke-width="1.5"/>"#,
            num(plot.x0),
            num(plot.x1),
            palette::GRID,
            y = num(y)
        ));
    }

    // x category labels, rotated
    for (i, category) in spec.categories.iter().enumerate() {
        let x = plot.x(i);
        let y = plot.y1 + 14.0;
        out.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-size="11" text-anchor="end" fill="{}" transform="rotate(-45 {x} {y})">{}</text>"#,
            palette::NEUTRAL_TEXT,
            escape(category),
            x = num(x),
            y = num(y)
        ));
    }

    if let Some(title) = &spec.x_title {
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="12" text-anchor="middle" fill="{}">{}</text>"#,
            num((plot.x0 + plot.x1) / 2.0),
            num(height - 10.0),
            palette::NEUTRAL_TEXT,
            escape(title)
        ));
    }
    if let Some(title) = &spec.y_title {
        let x = 18.0;
        let y = (plot.y0 + plot.y1) / 2.0;
        out.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-size="12" text-anchor="middle" fill="{}" transform="rotate(-90 {x} {y})">{}</text>"#,
            palette::NEUTRAL_TEXT,
            escape(title),
            x = num(x),
            y = num(y)
        ));
    }

    if let Some(bars) = &spec.bars {
        let bar_width = plot.band * 0.7;
        for (i, value) in bars.values.iter().enumerate() {
            if !value.is_finite() {
                continue;
            }
            let top = plot.y(value.max(0.0));
            let bottom = plot.y(value.min(0.0));
            let x = plot.x(i) - bar_width / 2.0;
            let color = bars.colors.get(i).map(String::as_str).unwrap_or(palette::PRIMARY);
            out.push_str(&format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}" stroke-width="0.5"/>"#,
                num(x),
                num(top),
                num(bar_width),
                num((bottom - top).max(0.0)),
                color,
                palette::CANVAS
            ));
            if bars.patterns.get(i) == Some(&BarPattern::Hatch) {
                out.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="url(#{})"/>"#,
                    num(x),
                    num(top),
                    num(bar_width),
                    num((bottom - top).max(0.0)),
                    hatch_id
                ));
            }
            if let Some(label) = bars.labels.get(i).filter(|l| !l.is_empty()) {
                let y = if *value >= 0.0 { top - 5.0 } else { bottom + 14.0 };
                out.push_str(&format!(
                    r#"<text x="{}" y="{}" font-size="11" text-anchor="middle" fill="{}">{}</text>"#,
                    num(plot.x(i)),
                    num(y),
                    palette::NEUTRAL_TEXT,
                    escape(label)
                ));
            }
        }
    }

    for rule in &spec.rules {
        let y = plot.y(rule.y);
        out.push_str(&format!(
            r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="{}" stroke-width="1.5"{}/>"#,
            num(plot.x0),
            num(plot.x1),
            rule.color,
            dash_attr(rule.dash),
            y = num(y)
        ));
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="11" fill="{}">{}</text>"#,
            num(plot.x0 + 4.0),
            num(y - 6.0),
            palette::NEUTRAL_TEXT,
            escape(&rule.annotation)
        ));
    }

    for series in &spec.lines {
        let points: Vec<String> = series
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| format!("{},{}", num(plot.x(i)), num(plot.y(*v))))
            .collect();
        out.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round"{}/>"#,
            points.join(" "),
            series.color,
            num(series.width),
            dash_attr(series.dash)
        ));
        for (i, value) in series.values.iter().enumerate() {
            if !value.is_finite() {
                continue;
            }
            let (cx, cy) = (plot.x(i), plot.y(*value));
            out.push_str(&marker(series.marker, cx, cy, series.marker_size, &series.color, &series.color));
            if let Some(label) = series.labels.get(i).filter(|l| !l.is_empty()) {
                out.push_str(&format!(
                    r#"<text x="{}" y="{}" font-size="11" text-anchor="middle" fill="{}">{}</text>"#,
                    num(cx),
                    num(cy - 10.0),
                    palette::NEUTRAL_TEXT,
                    escape(label)
                ));
            }
        }
    }

    for highlight in &spec.highlights {
        if !highlight.value.is_finite() {
            continue;
        }
        let (cx, cy) = (plot.x(highlight.index), plot.y(highlight.value));
        out.push_str(&marker(highlight.symbol, cx, cy, highlight.size, &highlight.fill, &highlight.stroke));
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="11" font-weight="600" text-anchor="middle" fill="{}">{}</text>"#,
            num(cx),
            num(cy + highlight.size / 2.0 + 14.0),
            palette::NEUTRAL_TEXT,
            escape(&highlight.text)
        ));
    }

    render_legend(out, spec, plot.x0);
}

fn render_legend(out: &mut String, spec: &ChartSpec, x_start: f64) {
    let y = 54.0;
    let mut x = x_start;

    for series in &spec.lines {
        let swatch = format!(
            r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="{}" stroke-width="{}"{}/>{}"#,
            num(x),
            num(x + 24.0),
            series.color,
            num(series.width),
            dash_attr(series.dash),
            marker(series.marker, x + 12.0, y, series.marker_size, &series.color, &series.color),
            y = num(y)
        );
        x = legend_entry(out, x, y, &swatch, &series.name);
    }
    for highlight in &spec.highlights {
        let swatch = marker(highlight.symbol, x + 12.0, y, highlight.size * 0.8, &highlight.fill, &highlight.stroke);
        x = legend_entry(out, x, y, &swatch, &highlight.name);
    }
}

/// Writes one legend entry and returns the x position of the next one.
fn legend_entry(out: &mut String, x: f64, y: f64, swatch: &str, name: &str) -> f64 {
    out.push_str(swatch);
    out.push_str(&format!(
        r#"<text x="{}" y="{}" font-size="12" fill="{}">{}</text>"#,
        num(x + 30.0),
        num(y + 4.0),
        palette::NEUTRAL_TEXT,
        escape(name)
    ));
    x + 40.0 + name.chars().count() as f64 * 12.0
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

fn render_heatmap(out: &mut String, spec: &ChartSpec, heatmap: &Heatmap, width: f64, height: f64) {
    let x0 = MARGIN_LEFT;
    let x1 = width - MARGIN_RIGHT - COLORBAR_SPACE;
    let y0 = MARGIN_TOP;
    let y1 = height - MARGIN_BOTTOM + 24.0;

    let cols = heatmap.x_labels.len();
    let rows = heatmap.y_labels.len();
    let Some((lo, hi)) = heatmap.value_range().filter(|_| cols > 0 && rows > 0) else {
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="14" text-anchor="middle" fill="{}">데이터 없음</text>"#,
            num(width / 2.0),
            num(height / 2.0),
            palette::NEUTRAL_TEXT
        ));
        return;
    };

    let cell_w = (x1 - x0) / cols as f64;
    let cell_h = (y1 - y0) / rows as f64;
    let normalize = |v: f64| if hi > lo { (v - lo) / (hi - lo) } else { 1.0 };

    // first row at the bottom, as in a conventional y axis
    for (r, row) in heatmap.z.iter().enumerate().take(rows) {
        let y = y1 - (r as f64 + 1.0) * cell_h;
        for (c, cell) in row.iter().enumerate().take(cols) {
            let Some(value) = cell.filter(|v| v.is_finite()) else {
                continue;
            };
            let fill = palette::interpolate(&heatmap.color_low, &heatmap.color_high, normalize(value));
            out.push_str(&format!(
                r#"<rect class="heatmap-cell" x="{}" y="{}" width="{}" height="{}" fill="{}"><title>{} · {}: {}</title></rect>"#,
                num(x0 + c as f64 * cell_w),
                num(y),
                num(cell_w),
                num(cell_h),
                fill,
                escape(&heatmap.y_labels[r]),
                escape(&heatmap.x_labels[c]),
                format_grouped(value, 1)
            ));
        }
    }

    for (c, label) in heatmap.x_labels.iter().enumerate() {
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="11" text-anchor="middle" fill="{}">{}</text>"#,
            num(x0 + (c as f64 + 0.5) * cell_w),
            num(y1 + 16.0),
            palette::NEUTRAL_TEXT,
            escape(label)
        ));
    }
    for (r, label) in heatmap.y_labels.iter().enumerate() {
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="11" text-anchor="end" fill="{}">{}</text>"#,
            num(x0 - 8.0),
            num(y1 - (r as f64 + 0.5) * cell_h + 4.0),
            palette::NEUTRAL_TEXT,
            escape(label)
        ));
    }

    // colour bar
    let gradient_id = format!("{}-scale", spec.kind.file_stem());
    let bar_x = width - MARGIN_RIGHT - COLORBAR_SPACE + 28.0;
    out.push_str(&format!(
        r#"<defs><linearGradient id="{}" x1="0" y1="1" x2="0" y2="0"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient></defs>"#,
        gradient_id, heatmap.color_low, heatmap.color_high
    ));
    out.push_str(&format!(
        r#"<rect x="{}" y="{}" width="16" height="{}" fill="url(#{})" stroke="{}"/>"#,
        num(bar_x),
        num(y0),
        num(y1 - y0),
        gradient_id,
        palette::GRID
    ));
    out.push_str(&format!(
        r#"<text x="{}" y="{}" font-size="12" fill="{}">{}</text>"#,
        num(bar_x),
        num(y0 - 10.0),
        palette::NEUTRAL_TEXT,
        escape(&heatmap.colorbar_title)
    ));
    for (value, y) in [(hi, y0 + 4.0), (lo, y1)] {
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="11" fill="{}">{}</text>"#,
            num(bar_x + 22.0),
            num(y),
            palette::NEUTRAL_TEXT,
            format_grouped(value, 1)
        ));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn marker(symbol: MarkerSymbol, cx: f64, cy: f64, size: f64, fill: &str, stroke: &str) -> String {
    let r = size / 2.0;
    match symbol {
        MarkerSymbol::Circle => format!(
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}" stroke="{}" stroke-width="1.5"/>"#,
            num(cx),
            num(cy),
            num(r),
            fill,
            stroke
        ),
        MarkerSymbol::TriangleUp => polygon(
            &[(cx, cy - r), (cx - r, cy + r), (cx + r, cy + r)],
            fill,
            stroke,
        ),
        MarkerSymbol::Diamond => polygon(
            &[(cx, cy - r), (cx + r, cy), (cx, cy + r), (cx - r, cy)],
            fill,
            stroke,
        ),
        MarkerSymbol::Star => {
            let points: Vec<(f64, f64)> = (0..10)
                .map(|i| {
                    let radius = if i % 2 == 0 { r } else { r * 0.45 };
                    let angle = -std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::PI / 5.0;
                    (cx + radius * angle.cos(), cy + radius * angle.sin())
                })
                .collect();
            polygon(&points, fill, stroke)
        }
        MarkerSymbol::Cross => format!(
            r#"<path d="M{a} {b} L{c} {d} M{a} {d} L{c} {b}" stroke="{}" stroke-width="3" stroke-linecap="round"/>"#,
            fill,
            a = num(cx - r),
            b = num(cy - r),
            c = num(cx + r),
            d = num(cy + r)
        ),
    }
}

fn polygon(points: &[(f64, f64)], fill: &str, stroke: &str) -> String {
    let points: Vec<String> = points.iter().map(|(x, y)| format!("{},{}", num(*x), num(*y))).collect();
    format!(
        r#"<polygon points="{}" fill="{}" stroke="{}" stroke-width="2"/>"#,
        points.join(" "),
        fill,
        stroke
    )
}

fn dash_attr(dash: LineDash) -> String {
    match dash.dasharray() {
        Some(pattern) => format!(r#" stroke-dasharray="{}""#, pattern),
        None => String::new(),
    }
}

fn value_bounds(values: &[f64]) -> (f64, f64) {
    let mut iter = values.iter().copied().filter(|v| v.is_finite());
    let Some(first) = iter.next() else {
        return (0.0, 1.0);
    };
    let (lo, hi) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo == hi {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
        (lo - pad, hi + pad)
    } else {
        (lo, hi)
    }
}

/// Evenly spaced "round" tick values covering `lo..=hi`.
pub fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if !lo.is_finite() || !hi.is_finite() || hi <= lo || target == 0 {
        return vec![lo, hi];
    }
    let raw_step = (hi - lo) / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    let step = magnitude
        * if normalized < 1.5 {
            1.0
        } else if normalized < 3.0 {
            2.0
        } else if normalized < 7.0 {
            5.0
        } else {
            10.0
        };
    let start = (lo / step).floor() * step;
    let end = (hi / step).ceil() * step;
    let count = ((end - start) / step).round() as usize;
    (0..=count).map(|i| start + step * i as f64).collect()
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 || step <= 0.0 {
        0
    } else {
        (-step.log10()).ceil().clamp(0.0, 4.0) as usize
    };
    format_grouped(value, decimals)
}

fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

/// Escapes text for XML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
