//! Minimal figure model rendered to SVG.
//!
//! A [`Figure`] is a grid of [`Axes`]. Each axes collects drawing elements in
//! data coordinates (histogram bars, polylines, vertical reference lines,
//! text) and maps them onto its panel when the figure is rendered.

use crate::error::{BestError, Result};
use crate::stats::Histogram;
use std::fmt::{self, Write as _};
use std::path::Path;

const MARGIN_LEFT: f64 = 24.0;
const MARGIN_LEFT_YAXIS: f64 = 56.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 32.0;
const MARGIN_BOTTOM: f64 = 48.0;
const FIGURE_TITLE_HEIGHT: f64 = 36.0;

/// Stroke pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Continuous line
    Solid,
    /// Long dashes
    Dashed,
    /// Dots
    Dotted,
}

impl LineStyle {
    fn dasharray(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("6,4"),
            Self::Dotted => Some("1.5,3"),
        }
    }
}

/// Appearance of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    /// Stroke colour (any SVG colour)
    pub color: String,
    /// Stroke width in pixels
    pub width: f64,
    /// Stroke opacity in [0, 1]
    pub opacity: f64,
    /// Stroke pattern
    pub style: LineStyle,
}

impl LineSpec {
    /// Solid, opaque line of the given colour and width.
    #[must_use]
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            opacity: 1.0,
            style: LineStyle::Solid,
        }
    }

    /// Set the opacity
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the stroke pattern
    #[must_use]
    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }
}

/// Horizontal alignment of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Text starts at the position
    Start,
    /// Text is centred on the position
    Middle,
    /// Text ends at the position
    End,
}

impl Anchor {
    fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Element {
    Bars {
        lefts: Vec<f64>,
        widths: Vec<f64>,
        heights: Vec<f64>,
        color: String,
    },
    Polyline {
        xs: Vec<f64>,
        ys: Vec<f64>,
        line_spec: LineSpec,
    },
    VLine {
        x: f64,
        line_spec: LineSpec,
    },
    /// `y` is a fraction of the axes height, measured from the bottom
    Text {
        x: f64,
        y: f64,
        content: String,
        anchor: Anchor,
        size: f64,
    },
}

/// One panel of a figure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Axes {
    elements: Vec<Element>,
    title: Option<String>,
    xlabel: Option<String>,
    xlim: Option<(f64, f64)>,
    hide_yaxis: bool,
}

impl Axes {
    /// Empty axes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been drawn on the axes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.title.is_none()
    }

    /// Panel title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Title, if set
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Label below the x axis
    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        self.xlabel = Some(label.into());
    }

    /// Fix the x range instead of fitting it to the data
    pub fn set_xlim(&mut self, low: f64, high: f64) {
        if low.is_finite() && high.is_finite() && low < high {
            self.xlim = Some((low, high));
        }
    }

    /// Do not draw the y axis (ticks and line)
    pub fn hide_yaxis(&mut self) {
        self.hide_yaxis = true;
    }

    /// Draw a histogram of `values`.
    ///
    /// `rwidth` is the drawn bar width relative to the bin width. With
    /// `density` the bar heights integrate to one.
    ///
    /// # Errors
    ///
    /// Empty `values` or zero bins.
    pub fn hist(
        &mut self,
        values: &[f64],
        bins: usize,
        density: bool,
        rwidth: f64,
        color: &str,
    ) -> Result<Histogram> {
        let histogram = Histogram::new(values, bins)?;
        let heights = if density {
            histogram.density()
        } else {
            histogram.counts.iter().map(|&c| c as f64).collect()
        };

        let rwidth = rwidth.clamp(0.05, 1.0);
        let (lefts, widths) = histogram
            .bins
            .windows(2)
            .map(|edges| {
                let full = edges[1] - edges[0];
                let drawn = full * rwidth;
                (edges[0] + (full - drawn) / 2.0, drawn)
            })
            .unzip();

        self.elements.push(Element::Bars {
            lefts,
            widths,
            heights,
            color: color.to_string(),
        });
        Ok(histogram)
    }

    /// Draw a polyline through `(xs[i], ys[i])`; non-finite points are skipped.
    pub fn plot(&mut self, xs: &[f64], ys: &[f64], line_spec: LineSpec) {
        let (xs, ys) = xs
            .iter()
            .zip(ys)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| (x, y))
            .unzip();
        self.elements.push(Element::Polyline { xs, ys, line_spec });
    }

    /// Horizontal segment from `x0` to `x1` at height `y`.
    pub fn hline(&mut self, y: f64, x0: f64, x1: f64, line_spec: LineSpec) {
        self.plot(&[x0, x1], &[y, y], line_spec);
    }

    /// Vertical line spanning the whole axes height.
    pub fn axvline(&mut self, x: f64, line_spec: LineSpec) {
        if x.is_finite() {
            self.elements.push(Element::VLine { x, line_spec });
        }
    }

    /// Text at data x-coordinate `x` and height `y_frac` (0 = bottom, 1 = top).
    pub fn text(&mut self, x: f64, y_frac: f64, content: impl Into<String>, anchor: Anchor, size: f64) {
        if x.is_finite() {
            self.elements.push(Element::Text {
                x,
                y: y_frac,
                content: content.into(),
                anchor,
                size,
            });
        }
    }

    /// Text drawn on the axes (all kinds), in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Number of polylines drawn.
    #[must_use]
    pub fn n_lines(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, Element::Polyline { .. }))
            .count()
    }

    /// Data range covered by the elements, with a small margin.
    fn limits(&self) -> ((f64, f64), (f64, f64)) {
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        let extend = |range: &mut (f64, f64), v: f64| {
            if v.is_finite() {
                range.0 = range.0.min(v);
                range.1 = range.1.max(v);
            }
        };

        for element in &self.elements {
            match element {
                Element::Bars {
                    lefts,
                    widths,
                    heights,
                    ..
                } => {
                    for ((&l, &w), &h) in lefts.iter().zip(widths).zip(heights) {
                        extend(&mut x, l);
                        extend(&mut x, l + w);
                        extend(&mut y, 0.0);
                        extend(&mut y, h);
                    }
                }
                Element::Polyline { xs, ys, .. } => {
                    xs.iter().for_each(|&v| extend(&mut x, v));
                    ys.iter().for_each(|&v| extend(&mut y, v));
                }
                Element::VLine { x: v, .. } | Element::Text { x: v, .. } => extend(&mut x, *v),
            }
        }

        let x = self.xlim.unwrap_or_else(|| pad(x, 0.05));
        let y = pad(y, 0.08);
        (x, y)
    }

    fn write_svg(&self, out: &mut impl fmt::Write, id: usize, panel: Rect) -> fmt::Result {
        let left = if self.hide_yaxis {
            MARGIN_LEFT
        } else {
            MARGIN_LEFT_YAXIS
        };
        let plot = Rect {
            x: panel.x + left,
            y: panel.y + MARGIN_TOP,
            w: (panel.w - left - MARGIN_RIGHT).max(1.0),
            h: (panel.h - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        };
        let ((x0, x1), (y0, y1)) = self.limits();
        let sx = |v: f64| plot.x + (v - x0) / (x1 - x0) * plot.w;
        let sy = |v: f64| plot.y + plot.h - (v - y0) / (y1 - y0) * plot.h;

        if let Some(title) = &self.title {
            writeln!(
                out,
                "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" class=\"title\">{}</text>",
                plot.x + plot.w / 2.0,
                panel.y + MARGIN_TOP - 12.0,
                escape(title)
            )?;
        }

        writeln!(
            out,
            "  <clipPath id=\"clip{id}\"><rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\"/></clipPath>",
            plot.x, plot.y, plot.w, plot.h
        )?;
        writeln!(out, "  <g clip-path=\"url(#clip{id})\">")?;
        for element in &self.elements {
            match element {
                Element::Bars {
                    lefts,
                    widths,
                    heights,
                    color,
                } => {
                    for ((&l, &w), &h) in lefts.iter().zip(widths).zip(heights) {
                        let top = sy(h);
                        writeln!(
                            out,
                            "    <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
                            sx(l),
                            top,
                            (sx(l + w) - sx(l)).max(0.0),
                            (sy(0.0) - top).max(0.0),
                            color
                        )?;
                    }
                }
                Element::Polyline { xs, ys, line_spec } => {
                    let points = xs
                        .iter()
                        .zip(ys)
                        .map(|(&x, &y)| format!("{:.2},{:.2}", sx(x), sy(y)))
                        .collect::<Vec<_>>()
                        .join(" ");
                    writeln!(
                        out,
                        "    <polyline points=\"{points}\" fill=\"none\" {}/>",
                        stroke(line_spec)
                    )?;
                }
                Element::VLine { x, line_spec } => {
                    writeln!(
                        out,
                        "    <line x1=\"{0:.2}\" y1=\"{1:.2}\" x2=\"{0:.2}\" y2=\"{2:.2}\" {3}/>",
                        sx(*x),
                        plot.y,
                        plot.y + plot.h,
                        stroke(line_spec)
                    )?;
                }
                Element::Text { .. } => {}
            }
        }
        writeln!(out, "  </g>")?;

        // Text is not clipped so labels near the edges stay readable
        for element in &self.elements {
            if let Element::Text {
                x,
                y,
                content,
                anchor,
                size,
            } = element
            {
                writeln!(
                    out,
                    "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-size=\"{size}\">{}</text>",
                    sx(*x),
                    plot.y + plot.h * (1.0 - y),
                    anchor.as_svg(),
                    escape(content)
                )?;
            }
        }

        // x axis
        let baseline = plot.y + plot.h;
        writeln!(
            out,
            "  <line x1=\"{:.1}\" y1=\"{baseline:.1}\" x2=\"{:.1}\" y2=\"{baseline:.1}\" class=\"axis\"/>",
            plot.x,
            plot.x + plot.w
        )?;
        for tick in nice_ticks(x0, x1, 5) {
            let px = sx(tick.value);
            writeln!(
                out,
                "  <line x1=\"{px:.1}\" y1=\"{baseline:.1}\" x2=\"{px:.1}\" y2=\"{:.1}\" class=\"axis\"/>",
                baseline + 4.0
            )?;
            writeln!(
                out,
                "  <text x=\"{px:.1}\" y=\"{:.1}\" text-anchor=\"middle\" class=\"tick\">{}</text>",
                baseline + 16.0,
                tick.label
            )?;
        }
        if let Some(label) = &self.xlabel {
            writeln!(
                out,
                "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" class=\"label\">{}</text>",
                plot.x + plot.w / 2.0,
                baseline + 36.0,
                escape(label)
            )?;
        }

        // y axis
        if !self.hide_yaxis {
            writeln!(
                out,
                "  <line x1=\"{0:.1}\" y1=\"{1:.1}\" x2=\"{0:.1}\" y2=\"{2:.1}\" class=\"axis\"/>",
                plot.x, plot.y, baseline
            )?;
            for tick in nice_ticks(y0, y1, 4) {
                let py = sy(tick.value);
                writeln!(
                    out,
                    "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" class=\"tick\">{}</text>",
                    plot.x - 6.0,
                    py + 4.0,
                    tick.label
                )?;
            }
        }
        Ok(())
    }
}

/// A grid of axes rendered to one SVG document.
///
/// # Example
///
/// ```
/// use best::plot::{Figure, LineSpec};
///
/// let mut fig = Figure::new(1, 2);
/// let ax = fig.axes_mut(0, 1).unwrap();
/// ax.set_title("Right panel");
/// ax.plot(&[0.0, 1.0], &[0.0, 1.0], LineSpec::new("black", 1.0));
/// assert!(fig.to_svg().contains("Right panel"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    rows: usize,
    cols: usize,
    panel_width: f64,
    panel_height: f64,
    title: Option<String>,
    axes: Vec<Axes>,
}

impl Figure {
    /// Figure with `rows × cols` empty panels of 380 × 220 pixels.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        let (rows, cols) = (rows.max(1), cols.max(1));
        Self {
            rows,
            cols,
            panel_width: 380.0,
            panel_height: 220.0,
            title: None,
            axes: vec![Axes::new(); rows * cols],
        }
    }

    /// Set the size of every panel in pixels
    #[must_use]
    pub fn with_panel_size(mut self, width: f64, height: f64) -> Self {
        self.panel_width = width.max(50.0);
        self.panel_height = height.max(50.0);
        self
    }

    /// Set a title drawn above all panels
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Grid shape as `(rows, cols)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Width and height of the whole figure in pixels
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        let title = if self.title.is_some() {
            FIGURE_TITLE_HEIGHT
        } else {
            0.0
        };
        (
            self.cols as f64 * self.panel_width,
            self.rows as f64 * self.panel_height + title,
        )
    }

    /// All panels in row-major order
    #[must_use]
    pub fn axes(&self) -> &[Axes] {
        &self.axes
    }

    /// Panel at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`BestError::InvalidInput`] outside the grid.
    pub fn axes_mut(&mut self, row: usize, col: usize) -> Result<&mut Axes> {
        if row >= self.rows || col >= self.cols {
            return Err(BestError::InvalidInput(format!(
                "axes ({row}, {col}) outside a {}x{} grid",
                self.rows, self.cols
            )));
        }
        Ok(&mut self.axes[row * self.cols + col])
    }

    /// Render the figure as an SVG document
    #[must_use]
    pub fn to_svg(&self) -> String {
        self.to_string()
    }

    /// Write the figure to an `.svg` file.
    ///
    /// # Errors
    ///
    /// Other extensions are rejected with [`BestError::InvalidInput`]; I/O
    /// failures are returned as [`BestError::Io`].
    pub fn savefig<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        Self::check_path(path)?;
        std::fs::write(path, self.to_svg())?;
        Ok(())
    }

    /// Check that [`Figure::savefig`] accepts `path`, without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`BestError::InvalidInput`] unless the extension is `.svg`.
    pub fn check_path<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let is_svg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        if is_svg {
            Ok(())
        } else {
            Err(BestError::InvalidInput(format!(
                "cannot save figure to '{}': only .svg output is supported",
                path.display()
            )))
        }
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.size();
        writeln!(f, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(
            f,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\">"
        )?;
        f.write_str("  <style>\n")?;
        f.write_str("    text { font-family: sans-serif; fill: #222; }\n")?;
        f.write_str("    .title { font-size: 14px; font-weight: bold; }\n")?;
        f.write_str("    .label { font-size: 13px; }\n")?;
        f.write_str("    .tick { font-size: 10px; }\n")?;
        f.write_str("    .axis { stroke: #444; stroke-width: 1; }\n")?;
        f.write_str("  </style>\n")?;
        writeln!(f, "  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>")?;

        let top = if let Some(title) = &self.title {
            writeln!(
                f,
                "  <text x=\"{:.1}\" y=\"24\" text-anchor=\"middle\" class=\"title\">{}</text>",
                width / 2.0,
                escape(title)
            )?;
            FIGURE_TITLE_HEIGHT
        } else {
            0.0
        };

        for (idx, ax) in self.axes.iter().enumerate() {
            if ax.is_empty() {
                continue;
            }
            let (row, col) = (idx / self.cols, idx % self.cols);
            let panel = Rect {
                x: col as f64 * self.panel_width,
                y: top + row as f64 * self.panel_height,
                w: self.panel_width,
                h: self.panel_height,
            };
            ax.write_svg(f, idx, panel)?;
        }
        writeln!(f, "</svg>")
    }
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct Tick {
    value: f64,
    label: String,
}

/// Widen a range by `frac` on both sides; degenerate ranges get unit width.
fn pad((low, high): (f64, f64), frac: f64) -> (f64, f64) {
    if !low.is_finite() || !high.is_finite() {
        return (0.0, 1.0);
    }
    if high - low <= f64::EPSILON * (1.0 + low.abs().max(high.abs())) {
        let half = if low == 0.0 { 0.5 } else { low.abs() * 0.1 };
        return (low - half, high + half);
    }
    let margin = (high - low) * frac;
    (low - margin, high + margin)
}

/// Tick positions at 1, 2 or 5 times a power of ten, about `target` of them.
fn nice_ticks(low: f64, high: f64, target: usize) -> Vec<Tick> {
    let span = high - low;
    if !(span > 0.0) || !span.is_finite() || target == 0 {
        return Vec::new();
    }

    let raw_step = span / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw_step)
        .unwrap_or(10.0 * magnitude);

    let decimals = (-step.log10().floor()).max(0.0) as usize;
    let first = (low / step).ceil() as i64;
    let last = (high / step).floor() as i64;

    (first..=last)
        .map(|i| {
            let value = i as f64 * step;
            let label = format!("{value:.decimals$}");
            // Avoid "-0"
            let label = if label.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
                label.trim_start_matches('-').to_string()
            } else {
                label
            };
            Tick { value, label }
        })
        .collect()
}

fn stroke(line_spec: &LineSpec) -> String {
    let mut attrs = format!(
        "stroke=\"{}\" stroke-width=\"{:.2}\"",
        line_spec.color, line_spec.width
    );
    if line_spec.opacity < 1.0 {
        let _ = write!(attrs, " stroke-opacity=\"{:.2}\"", line_spec.opacity);
    }
    if let Some(dash) = line_spec.style.dasharray() {
        let _ = write!(attrs, " stroke-dasharray=\"{dash}\"");
    }
    attrs
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
