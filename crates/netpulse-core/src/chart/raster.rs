//! Software RGBA surface.
//!
//! Scanline polygon fill with per-row gradient color, Bresenham strokes,
//! and source-over alpha blending. Backs the terminal blit and PNG export.

use std::io::Write;

use super::{Gradient, Point, Rgba, Surface};

/// Row-major RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// A transparent raster. Zero dimensions are allowed and draw nothing.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; pixel_len(width, height)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major, no padding.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = u64::from(y) * u64::from(self.width) + u64::from(x);
        usize::try_from(offset * 4).ok()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let i = self.index(x, y)?;
        let p = self.pixels.get(i..i + 4)?;
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }

    pub fn clear(&mut self, color: Rgba) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i..i + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Source-over blend of `color` onto the pixel at `(x, y)`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::as_conversions
    )]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if color.a == 255 {
            self.set_pixel(x, y, color);
            return;
        }

        let src_a = f32::from(color.a) / 255.0;
        let dst_a = f32::from(self.pixels[i + 3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }

        let blend = |src: u8, dst: u8| -> u8 {
            let src_f = f32::from(src) / 255.0;
            let dst_f = f32::from(dst) / 255.0;
            let out = (src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a;
            (out * 255.0).round() as u8
        };

        self.pixels[i] = blend(color.r, self.pixels[i]);
        self.pixels[i + 1] = blend(color.g, self.pixels[i + 1]);
        self.pixels[i + 2] = blend(color.b, self.pixels[i + 2]);
        self.pixels[i + 3] = (out_a * 255.0).round() as u8;
    }

    /// Bresenham line between two pixel positions.
    #[allow(clippy::cast_sign_loss, clippy::as_conversions)]
    fn draw_line(&mut self, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            if let (Ok(px), Ok(py)) = (u32::try_from(x), u32::try_from(y)) {
                self.blend_pixel(px, py, color);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Map a surface point to the nearest pixel, clamped into the raster.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    fn to_pixel(&self, p: Point) -> (i64, i64) {
        let max_x = i64::from(self.width.saturating_sub(1));
        let max_y = i64::from(self.height.saturating_sub(1));
        (
            (p.x.round() as i64).clamp(0, max_x),
            (p.y.round() as i64).clamp(0, max_y),
        )
    }

    /// Encode as an 8-bit RGBA PNG.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        Ok(())
    }

    /// Encode to an in-memory PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, png::EncodingError> {
        let mut buffer = Vec::new();
        self.write_png(&mut buffer)?;
        Ok(buffer)
    }
}

fn pixel_len(width: u32, height: u32) -> usize {
    usize::try_from(u64::from(width) * u64::from(height) * 4).unwrap_or(0)
}

impl Surface for Raster {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.width), f64::from(self.height))
    }

    /// Even-odd scanline fill sampled at pixel centers.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::as_conversions
    )]
    fn fill_polygon(&mut self, points: &[Point], fill: &Gradient) {
        if points.len() < 3 || self.width == 0 || self.height == 0 {
            return;
        }

        let (min_y, max_y) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        let first_row = min_y.floor().max(0.0) as u32;
        let last_row = (max_y.ceil().min(f64::from(self.height))) as u32;

        let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
        for row in first_row..last_row {
            let sample_y = f64::from(row) + 0.5;
            crossings.clear();

            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                let (lo, hi) = if a.y <= b.y { (*a, b) } else { (b, *a) };
                if sample_y >= lo.y && sample_y < hi.y {
                    let t = (sample_y - lo.y) / (hi.y - lo.y);
                    crossings.push(lo.x + t * (hi.x - lo.x));
                }
            }
            crossings.sort_by(f64::total_cmp);

            let color = fill.color_at(sample_y);
            if color.a == 0 {
                continue;
            }
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0) as u32;
                let end = (span[1] - 0.5).floor().min(f64::from(self.width) - 1.0);
                if end < 0.0 {
                    continue;
                }
                for x in start..=end as u32 {
                    self.blend_pixel(x, row, color);
                }
            }
        }
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Rgba) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        match points {
            [] => {}
            [only] => {
                let (x, y) = self.to_pixel(*only);
                self.draw_line((x, y), (x, y), color);
            }
            _ => {
                for pair in points.windows(2) {
                    let a = self.to_pixel(pair[0]);
                    let b = self.to_pixel(pair[1]);
                    self.draw_line(a, b, color);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chart::ChartRenderer;
    use crate::model::BandwidthSnapshot;

    const RED: Rgba = Rgba::rgb(255, 0, 0);

    fn solid(color: Rgba) -> Gradient {
        Gradient {
            top_y: 0.0,
            bottom_y: 1.0,
            top: color,
            bottom: color,
        }
    }

    #[test]
    fn fill_covers_rectangle_interior_only() {
        let mut raster = Raster::new(10, 10);
        let rect = [
            Point::new(2.0, 2.0),
            Point::new(6.0, 2.0),
            Point::new(6.0, 6.0),
            Point::new(2.0, 6.0),
        ];
        raster.fill_polygon(&rect, &solid(RED));

        assert_eq!(raster.pixel(2, 2), Some(RED));
        assert_eq!(raster.pixel(5, 5), Some(RED));
        assert_eq!(raster.pixel(6, 6), Some(Rgba::TRANSPARENT));
        assert_eq!(raster.pixel(1, 3), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn fill_clips_out_of_bounds_polygons() {
        let mut raster = Raster::new(4, 4);
        let huge = [
            Point::new(-10.0, -10.0),
            Point::new(20.0, -10.0),
            Point::new(20.0, 20.0),
            Point::new(-10.0, 20.0),
        ];
        raster.fill_polygon(&huge, &solid(RED));
        assert!(raster.pixels().chunks_exact(4).all(|p| p == [255, 0, 0, 255]));
    }

    #[test]
    fn stroke_draws_diagonal() {
        let mut raster = Raster::new(5, 5);
        raster.stroke_polyline(&[Point::new(0.0, 0.0), Point::new(4.0, 4.0)], RED);
        for i in 0..5 {
            assert_eq!(raster.pixel(i, i), Some(RED));
        }
        assert_eq!(raster.pixel(4, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn stroke_on_bottom_edge_is_clamped_inside() {
        let mut raster = Raster::new(5, 5);
        raster.stroke_polyline(&[Point::new(0.0, 5.0), Point::new(5.0, 5.0)], RED);
        assert_eq!(raster.pixel(0, 4), Some(RED));
        assert_eq!(raster.pixel(4, 4), Some(RED));
    }

    #[test]
    fn blend_mixes_over_opaque_background() {
        let mut raster = Raster::new(1, 1);
        raster.clear(Rgba::rgb(0, 0, 0));
        raster.blend_pixel(0, 0, Rgba::new(255, 255, 255, 128));
        let px = raster.pixel(0, 0).unwrap();
        assert_eq!(px.a, 255);
        assert!((127..=129).contains(&px.r));
    }

    #[test]
    fn zero_sized_raster_is_inert() {
        let mut raster = Raster::new(0, 0);
        let drawn = ChartRenderer::default()
            .render(&[BandwidthSnapshot::new(1, 10, 10)], &mut raster);
        assert!(drawn.is_none());
        assert!(raster.pixels().is_empty());
    }

    #[test]
    fn rendered_chart_encodes_as_png() {
        let mut raster = Raster::new(64, 32);
        raster.clear(Rgba::BACKGROUND);
        let data: Vec<BandwidthSnapshot> = (0..10)
            .map(|i| BandwidthSnapshot::new(i, u64::try_from(i * 100).unwrap(), 50))
            .collect();
        ChartRenderer::default().render(&data, &mut raster).unwrap();

        // Peak download sits on the top row at the right edge.
        assert_ne!(raster.pixel(63, 0), Some(Rgba::BACKGROUND));

        let png = raster.to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
