//! Throughput chart blitted from a software raster.
//!
//! The chart is rasterized at one pixel per column and two per row, then
//! each cell shows its pixel pair as an upper half block (`▀`): the top
//! pixel becomes the foreground, the bottom pixel the background.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

use netpulse_core::{BandwidthSnapshot, ChartRenderer, Raster, Rgba};

use crate::theme;

const HALF_BLOCK: &str = "▀";

pub struct TrafficChart<'a> {
    snapshots: &'a [BandwidthSnapshot],
    renderer: ChartRenderer,
    background: Rgba,
}

impl<'a> TrafficChart<'a> {
    pub fn new(snapshots: &'a [BandwidthSnapshot]) -> Self {
        Self {
            snapshots,
            renderer: ChartRenderer::default(),
            background: Rgba::BACKGROUND,
        }
    }

    /// Rasterize for a `cols` × `rows` cell area. Recomputed on every call,
    /// so a resize simply produces a raster of the new size.
    pub fn rasterize(&self, cols: u16, rows: u16) -> Raster {
        let mut raster = Raster::new(u32::from(cols), u32::from(rows) * 2);
        raster.clear(self.background);
        self.renderer.render(self.snapshots, &mut raster);
        raster
    }
}

impl Widget for TrafficChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let raster = self.rasterize(area.width, area.height);

        for row in 0..area.height {
            for col in 0..area.width {
                let x = u32::from(col);
                let y = u32::from(row) * 2;
                let top = raster.pixel(x, y).unwrap_or(self.background);
                let bottom = raster.pixel(x, y + 1).unwrap_or(self.background);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(HALF_BLOCK)
                        .set_fg(theme::from_rgba(top))
                        .set_bg(theme::from_rgba(bottom));
                }
            }
        }
    }
}
