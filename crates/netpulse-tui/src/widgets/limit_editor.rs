//! Popup for the per-device limit editor.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget};

use netpulse_core::{LimitControl, LimitDraft, LimitField, LimitPreset, LimitState};

use crate::theme;
use crate::widgets::centered_rect;

/// Presets are bound to F1 through F9.
pub const MAX_PRESET_KEYS: usize = 9;

pub struct LimitEditor<'a> {
    control: &'a LimitControl,
    presets: &'a [(String, LimitPreset)],
}

impl<'a> LimitEditor<'a> {
    pub fn new(control: &'a LimitControl, presets: &'a [(String, LimitPreset)]) -> Self {
        Self { control, presets }
    }

    fn field_line(draft: &LimitDraft, field: LimitField) -> Line<'static> {
        let (label, value, color) = match field {
            LimitField::Download => ("  ↓ Download  ", &draft.download, theme::DOWNLOAD),
            LimitField::Upload => ("  ↑ Upload    ", &draft.upload, theme::UPLOAD),
        };
        let focused = draft.focus == field;
        let value_style = if focused {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        let cursor = if focused { "█" } else { " " };

        Line::from(vec![
            Span::styled(label, theme::label()),
            Span::styled("[ ", theme::hint()),
            Span::styled(format!("{value:>9}"), value_style),
            Span::styled(cursor, Style::default().fg(color)),
            Span::styled(" ] kbps", theme::hint()),
        ])
    }

    fn preset_line(&self) -> Line<'static> {
        if self.presets.is_empty() {
            return Line::from(Span::styled("  no presets configured", theme::hint()));
        }
        let mut spans = vec![Span::raw("  ")];
        for (i, (name, _)) in self.presets.iter().take(MAX_PRESET_KEYS).enumerate() {
            spans.push(Span::styled(format!("F{} ", i + 1), theme::hint_key()));
            spans.push(Span::styled(format!("{name}  "), theme::hint()));
        }
        Line::from(spans)
    }
}

impl Widget for LimitEditor<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, lines) = match self.control.state() {
            LimitState::Closed => return,
            LimitState::Editing(draft) => (
                format!(" Limit · {} ", draft.label),
                vec![
                    Line::from(""),
                    Self::field_line(draft, LimitField::Download),
                    Self::field_line(draft, LimitField::Upload),
                    Line::from(""),
                    self.preset_line(),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("  Enter ", theme::hint_key()),
                        Span::styled("apply  ", theme::hint()),
                        Span::styled("Tab ", theme::hint_key()),
                        Span::styled("switch  ", theme::hint()),
                        Span::styled("Esc ", theme::hint_key()),
                        Span::styled("cancel", theme::hint()),
                    ]),
                ],
            ),
            LimitState::Applying { mac } => (
                " Limit ".to_owned(),
                vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("  Applying limit to {mac}\u{2026}"),
                        Style::default().fg(theme::WARNING),
                    )),
                ],
            ),
        };

        let popup = centered_rect(52, 9, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(title)
            .title_style(theme::title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(true))
            .style(theme::popup());

        Paragraph::new(lines).block(block).render(popup, buf);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use netpulse_core::{DeviceRecord, MacAddress};

    use super::*;

    const SEED: LimitPreset = LimitPreset {
        download_kbps: 2048,
        upload_kbps: 512,
    };

    fn text(buf: &Buffer) -> String {
        buf.content.iter().map(ratatui::buffer::Cell::symbol).collect()
    }

    #[test]
    fn closed_editor_draws_nothing() {
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        LimitEditor::new(&LimitControl::new(), &[]).render(area, &mut buf);
        assert_eq!(buf, Buffer::empty(area));
    }

    #[test]
    fn editing_shows_label_values_and_presets() {
        let mut device = DeviceRecord::new(MacAddress::new("aa:bb:cc:dd:ee:01"));
        device.name = Some("nas".into());
        let mut control = LimitControl::new();
        control.open(&device, SEED);
        let presets = vec![("slow".to_owned(), SEED)];

        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        LimitEditor::new(&control, &presets).render(area, &mut buf);

        let text = text(&buf);
        assert!(text.contains("Limit · nas"));
        assert!(text.contains("2048"));
        assert!(text.contains("512"));
        assert!(text.contains("F1 slow"));
    }
}
