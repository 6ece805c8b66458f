//! Devices screen: sortable device table with the limit editor popup.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use strum::IntoEnumIterator;

use netpulse_core::format::{fmt_bytes, fmt_kbps, fmt_rate};
use netpulse_core::sort::sort_devices;
use netpulse_core::{
    DeviceRecord, LimitControl, LimitPreset, LimitState, MacAddress, SortField, SortSpec,
};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::limit_editor::{LimitEditor, MAX_PRESET_KEYS};

/// Table columns: the sort field behind each, if any.
const COLUMNS: [(&str, Option<SortField>); 8] = [
    ("Name", Some(SortField::Name)),
    ("Address", Some(SortField::Address)),
    ("MAC", None),
    ("↓ Rate", Some(SortField::DownloadRate)),
    ("↑ Rate", Some(SortField::UploadRate)),
    ("Downloaded", Some(SortField::Downloaded)),
    ("Uploaded", Some(SortField::Uploaded)),
    ("Limit", None),
];

pub struct DevicesScreen {
    focused: bool,
    devices: Arc<Vec<DeviceRecord>>,
    sort: SortSpec,
    table_state: TableState,
    /// Selection follows the device, not the row, across polls and re-sorts.
    selected_mac: Option<MacAddress>,
    limit: LimitControl,
    presets: Vec<(String, LimitPreset)>,
    seed: LimitPreset,
}

impl DevicesScreen {
    pub fn new(presets: Vec<(String, LimitPreset)>, seed: LimitPreset) -> Self {
        let field = SortField::default();
        Self {
            focused: false,
            devices: Arc::new(Vec::new()),
            sort: SortSpec::new(field, field.default_direction()),
            table_state: TableState::default(),
            selected_mac: None,
            limit: LimitControl::new(),
            presets,
            seed,
        }
    }

    fn sorted(&self) -> Vec<&DeviceRecord> {
        sort_devices(&self.devices, self.sort)
    }

    fn selected(&self) -> Option<&DeviceRecord> {
        let idx = self.table_state.selected()?;
        self.sorted().get(idx).copied()
    }

    fn select(&mut self, idx: usize) {
        let mac = {
            let sorted = self.sorted();
            if sorted.is_empty() {
                None
            } else {
                let clamped = idx.min(sorted.len() - 1);
                sorted.get(clamped).map(|d| (clamped, d.mac.clone()))
            }
        };
        match mac {
            Some((idx, mac)) => {
                self.table_state.select(Some(idx));
                self.selected_mac = Some(mac);
            }
            None => {
                self.table_state.select(None);
                self.selected_mac = None;
            }
        }
    }

    #[allow(
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::as_conversions
    )]
    fn move_selection(&mut self, delta: isize) {
        let len = self.devices.len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.select(next as usize);
    }

    /// Re-locate the selected device after the list or its order changed.
    fn resync_selection(&mut self) {
        let position = self.selected_mac.as_ref().and_then(|mac| {
            self.sorted().iter().position(|d| &d.mac == mac)
        });
        match position {
            Some(idx) => self.table_state.select(Some(idx)),
            None => self.select(self.table_state.selected().unwrap_or(0)),
        }
    }

    fn sort_by(&mut self, field: SortField) {
        self.sort.toggle(field);
        self.resync_selection();
    }

    fn cycle_sort_field(&mut self) {
        let fields: Vec<SortField> = SortField::iter().collect();
        let idx = fields.iter().position(|&f| f == self.sort.field).unwrap_or(0);
        let next = fields[(idx + 1) % fields.len()];
        self.sort_by(next);
    }

    fn open_limit_editor(&mut self) {
        if let Some(device) = self.selected().cloned() {
            self.limit.open(&device, self.seed);
        }
    }

    fn request_clear(&self) -> Option<Action> {
        let device = self.selected()?;
        if device.active_limit().is_none() {
            return Some(Action::Notify(Notification::info(format!(
                "{} has no active limit",
                device.display_name()
            ))));
        }
        Some(Action::ShowConfirm(ConfirmAction::ClearLimit {
            mac: device.mac.clone(),
            name: device.display_name(),
        }))
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Option<Action> {
        if !matches!(self.limit.state(), LimitState::Editing(_)) {
            // Applying: wait for the service
            return None;
        }
        match key.code {
            KeyCode::Esc => self.limit.cancel(),
            KeyCode::Enter => {
                return Some(match self.limit.begin_apply() {
                    Ok(request) => Action::ApplyLimit(request),
                    Err(e) => Action::Notify(Notification::error(e.to_string())),
                });
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.limit.toggle_focus();
            }
            KeyCode::Backspace => self.limit.backspace(),
            KeyCode::Char(c) => self.limit.push_digit(c),
            KeyCode::F(n) => {
                let preset = usize::from(n)
                    .checked_sub(1)
                    .filter(|&i| i < MAX_PRESET_KEYS)
                    .and_then(|i| self.presets.get(i))
                    .map(|(_, p)| *p);
                if let Some(preset) = preset {
                    self.limit.apply_preset(preset);
                }
            }
            _ => {}
        }
        None
    }

    fn header(&self) -> Row<'static> {
        let cells = COLUMNS.iter().map(|(title, field)| {
            let text = match field {
                Some(f) if *f == self.sort.field => {
                    format!("{title} {}", self.sort.direction.arrow())
                }
                _ => (*title).to_owned(),
            };
            Cell::from(text)
        });
        Row::new(cells).style(theme::table_header())
    }

    fn row(device: &DeviceRecord) -> Row<'static> {
        let limit = device.active_limit().map_or_else(
            || "─".to_owned(),
            |l| {
                format!(
                    "↓{} ↑{}",
                    l.download_kbps.map_or_else(|| "∞".into(), fmt_kbps),
                    l.upload_kbps.map_or_else(|| "∞".into(), fmt_kbps)
                )
            },
        );
        Row::new(vec![
            Cell::from(device.display_name()),
            Cell::from(device.ip.map_or_else(|| "─".into(), |ip| ip.to_string())),
            Cell::from(device.mac.to_string()),
            Cell::from(fmt_rate(device.download_rate)).style(Style::default().fg(theme::DOWNLOAD)),
            Cell::from(fmt_rate(device.upload_rate)).style(Style::default().fg(theme::UPLOAD)),
            Cell::from(fmt_bytes(device.downloaded)),
            Cell::from(fmt_bytes(device.uploaded)),
            Cell::from(limit).style(Style::default().fg(theme::WARNING)),
        ])
        .style(theme::table_row())
    }
}

impl Component for DevicesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.limit.is_open() {
            return Ok(self.handle_editor_key(key));
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.select(0);
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.select(usize::MAX);
                None
            }
            KeyCode::Char('n') => {
                self.sort_by(SortField::Name);
                None
            }
            KeyCode::Char('a') => {
                self.sort_by(SortField::Address);
                None
            }
            KeyCode::Char('d') => {
                self.sort_by(SortField::Downloaded);
                None
            }
            KeyCode::Char('u') => {
                self.sort_by(SortField::Uploaded);
                None
            }
            KeyCode::Char('D') => {
                self.sort_by(SortField::DownloadRate);
                None
            }
            KeyCode::Char('U') => {
                self.sort_by(SortField::UploadRate);
                None
            }
            KeyCode::Char('s') => {
                self.cycle_sort_field();
                None
            }
            KeyCode::Char('o') => {
                self.sort_by(self.sort.field);
                None
            }
            KeyCode::Char('l') | KeyCode::Enter => {
                self.open_limit_editor();
                None
            }
            KeyCode::Char('c') => self.request_clear(),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::StateUpdated(state) => {
                self.devices = Arc::clone(&state.devices);
                self.resync_selection();
            }
            Action::LimitFinished(result)
                if matches!(self.limit.state(), LimitState::Applying { .. }) =>
            {
                let notification = match self.limit.finish(result.clone()) {
                    Ok(()) => Notification::success("Limit applied"),
                    Err(e) => Notification::error(format!("Limit failed: {e}")),
                };
                return Ok(Some(Action::Notify(notification)));
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                format!(" Devices ({}) ", self.devices.len()),
                theme::title(),
            ),
            Span::styled(
                format!(
                    " sorted by {} {} ",
                    self.sort.field.label(),
                    self.sort.direction.arrow()
                ),
                theme::hint(),
            ),
        ]);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(self.focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        if self.devices.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  No devices reported yet", theme::hint())),
                layout[0],
            );
        } else {
            let rows: Vec<Row> = self.sorted().into_iter().map(Self::row).collect();
            let widths = [
                Constraint::Min(14),
                Constraint::Length(15),
                Constraint::Length(17),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(11),
                Constraint::Length(11),
                Constraint::Min(16),
            ];
            let table = Table::new(rows, widths)
                .header(self.header())
                .row_highlight_style(theme::table_selected())
                .highlight_symbol("▸ ");
            let mut state = self.table_state.clone();
            frame.render_stateful_widget(table, layout[0], &mut state);
        }

        let hints = Line::from(vec![
            Span::styled("  n/a/d/u/D/U ", theme::hint_key()),
            Span::styled("sort  ", theme::hint()),
            Span::styled("o ", theme::hint_key()),
            Span::styled("reverse  ", theme::hint()),
            Span::styled("l ", theme::hint_key()),
            Span::styled("limit  ", theme::hint()),
            Span::styled("c ", theme::hint_key()),
            Span::styled("clear limit", theme::hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);

        if self.limit.is_open() {
            frame.render_widget(LimitEditor::new(&self.limit, &self.presets), area);
        }
    }

    fn captures_input(&self) -> bool {
        self.limit.is_open()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Devices"
    }
}
