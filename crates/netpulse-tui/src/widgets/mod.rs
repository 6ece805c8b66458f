//! Reusable widgets shared across screens.

pub mod limit_editor;
pub mod traffic_chart;

use ratatui::layout::Rect;

/// A `width` × `height` rect centered in `area`, shrunk to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(10, 5, 80, 24);
        assert_eq!(centered_rect(40, 10, area), Rect::new(30, 12, 40, 10));
        assert_eq!(centered_rect(200, 50, area), area);
    }
}
