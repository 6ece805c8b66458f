// ── Chart renderer ──
//
// Turns the history window into a dual-series filled area chart on any
// `Surface`. Both series share one vertical axis scaled to the largest
// value in either direction (never below 1), and every call recomputes
// everything from the snapshots and the surface size. The renderer holds
// no state between frames.

mod color;
mod raster;

pub use color::Rgba;
pub use raster::Raster;

use crate::model::BandwidthSnapshot;

/// A point in surface coordinates (origin top-left, y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Vertical gradient: `top` at `top_y`, `bottom` at `bottom_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub top_y: f64,
    pub bottom_y: f64,
    pub top: Rgba,
    pub bottom: Rgba,
}

impl Gradient {
    /// Color at row `y`, clamped outside the gradient span.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn color_at(&self, y: f64) -> Rgba {
        let span = self.bottom_y - self.top_y;
        if span.abs() < f64::EPSILON {
            return self.top;
        }
        let t = ((y - self.top_y) / span) as f32;
        self.top.lerp(self.bottom, t)
    }
}

/// Drawing target for [`ChartRenderer`].
pub trait Surface {
    /// Width and height in surface units.
    fn size(&self) -> (f64, f64);

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[Point], fill: &Gradient);

    /// Draw connected line segments.
    fn stroke_polyline(&mut self, points: &[Point], color: Rgba);
}

/// Shared-axis scale for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub width: f64,
    pub height: f64,
    /// Largest value across both series, floored at 1.
    pub max_value: f64,
    /// Number of points.
    pub count: usize,
}

impl Scale {
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn fit(snapshots: &[BandwidthSnapshot], width: f64, height: f64) -> Self {
        let max_value = snapshots
            .iter()
            .map(BandwidthSnapshot::peak_rate)
            .max()
            .unwrap_or(0)
            .max(1) as f64;
        Self {
            width,
            height,
            max_value,
            count: snapshots.len(),
        }
    }

    /// `x = i * width / max(k - 1, 1)`.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn x(&self, index: usize) -> f64 {
        let steps = self.count.saturating_sub(1).max(1);
        index as f64 * (self.width / steps as f64)
    }

    /// `y = height - v / max * height`.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn y(&self, value: u64) -> f64 {
        self.height - (value as f64 / self.max_value) * self.height
    }

    /// Line points for one series. A single sample becomes a flat segment
    /// across the full width.
    pub fn line<F>(&self, snapshots: &[BandwidthSnapshot], value: F) -> Vec<Point>
    where
        F: Fn(&BandwidthSnapshot) -> u64,
    {
        if let [only] = snapshots {
            let y = self.y(value(only));
            return vec![Point::new(0.0, y), Point::new(self.width, y)];
        }
        snapshots
            .iter()
            .enumerate()
            .map(|(i, s)| Point::new(self.x(i), self.y(value(s))))
            .collect()
    }

    /// Closed area under `line`: baseline, up, across, down to baseline.
    pub fn area(&self, line: &[Point]) -> Vec<Point> {
        let (Some(first), Some(last)) = (line.first(), line.last()) else {
            return Vec::new();
        };
        let mut polygon = Vec::with_capacity(line.len() + 2);
        polygon.push(Point::new(first.x, self.height));
        polygon.extend_from_slice(line);
        polygon.push(Point::new(last.x, self.height));
        polygon
    }
}

/// Line color plus the opacity the fill starts at under the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub line: Rgba,
    pub fill_alpha: u8,
}

impl SeriesStyle {
    fn gradient(&self, height: f64) -> Gradient {
        Gradient {
            top_y: 0.0,
            bottom_y: height,
            top: self.line.with_alpha(self.fill_alpha),
            bottom: self.line.with_alpha(0),
        }
    }
}

/// Dual-series area chart (download, upload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartRenderer {
    pub download: SeriesStyle,
    pub upload: SeriesStyle,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self {
            download: SeriesStyle {
                line: Rgba::DOWNLOAD,
                fill_alpha: 110,
            },
            upload: SeriesStyle {
                line: Rgba::UPLOAD,
                fill_alpha: 90,
            },
        }
    }
}

impl ChartRenderer {
    /// Draw both series onto `surface`.
    ///
    /// Returns the frame's scale for axis labelling, or `None` when there
    /// was nothing to draw (no samples or a zero-sized surface), in which
    /// case the surface is not touched.
    pub fn render<S>(&self, snapshots: &[BandwidthSnapshot], surface: &mut S) -> Option<Scale>
    where
        S: Surface + ?Sized,
    {
        let (width, height) = surface.size();
        if snapshots.is_empty() || width <= 0.0 || height <= 0.0 {
            return None;
        }

        let scale = Scale::fit(snapshots, width, height);
        let series: [(&SeriesStyle, fn(&BandwidthSnapshot) -> u64); 2] = [
            (&self.download, |s| s.download_rate),
            (&self.upload, |s| s.upload_rate),
        ];

        for (style, value) in series {
            let line = scale.line(snapshots, value);
            surface.fill_polygon(&scale.area(&line), &style.gradient(height));
            surface.stroke_polyline(&line, style.line);
        }
        Some(scale)
    }
}
