//! Dashboard screen: throughput chart over totals and service status.
//!
//! Layout:
//! ┌─ Throughput (half-block raster chart) ───────────────────────────────┐
//! ├──────────────────────────────────────────────────────────────────────┤
//! │ ┌─ Totals ─────────────────────┐ ┌─ Service ───────────────────────┐ │
//! │ │ volume / rates / device count│ │ state / interface / uptime      │ │
//! │ └──────────────────────────────┘ └─────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────────┘

use std::sync::Arc;

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use netpulse_core::format::{fmt_bytes, fmt_rate, fmt_uptime};
use netpulse_core::model::status::UNKNOWN_INTERFACE;
use netpulse_core::{
    BandwidthSnapshot, Command, DashboardState, PollState, PollStats, ServiceAction,
};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;
use crate::widgets::centered_rect;
use crate::widgets::traffic_chart::TrafficChart;

/// Seconds after which data is flagged as stale.
const STALE_AFTER_SECS: i64 = 10;

pub struct DashboardScreen {
    focused: bool,
    state: Arc<DashboardState>,
    poll_state: PollState,
    /// Chart series, copied out of the history window once per commit.
    series: Vec<BandwidthSnapshot>,
    /// Interface prompt buffer; `Some` while the prompt is open.
    interface_prompt: Option<String>,
}

impl DashboardScreen {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            focused: false,
            state: Arc::new(DashboardState::empty(history_capacity)),
            poll_state: PollState::Idle,
            series: Vec::new(),
            interface_prompt: None,
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Option<Action> {
        let buffer = self.interface_prompt.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.interface_prompt = None;
                None
            }
            KeyCode::Enter => {
                let interface = self.interface_prompt.take().unwrap_or_default();
                Some(Action::Execute(Command::SetInterface { interface }))
            }
            KeyCode::Backspace => {
                buffer.pop();
                None
            }
            KeyCode::Char(c) if !c.is_whitespace() => {
                buffer.push(c);
                None
            }
            _ => None,
        }
    }

    fn render_chart(&self, frame: &mut Frame, area: Rect) {
        let latest = self.state.history.latest();
        let peak = self.state.history.peak();

        let title = Line::from(vec![
            Span::styled(" Throughput ", theme::title()),
            Span::styled(
                format!("↓ {} ", fmt_rate(latest.map_or(0, |s| s.download_rate))),
                Style::default().fg(theme::DOWNLOAD),
            ),
            Span::styled(
                format!("↑ {} ", fmt_rate(latest.map_or(0, |s| s.upload_rate))),
                Style::default().fg(theme::UPLOAD),
            ),
            Span::styled(format!(" peak {} ", fmt_rate(peak)), theme::hint()),
        ]);

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(false));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.series.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(" waiting for samples\u{2026}", theme::hint())),
                inner,
            );
            return;
        }
        frame.render_widget(TrafficChart::new(&self.series), inner);
    }

    fn render_totals(&self, frame: &mut Frame, area: Rect) {
        let totals = &self.state.totals;
        let block = Block::default()
            .title(Span::styled(" Totals ", theme::title()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(false));

        let mut lines = vec![
            kv_line("Devices", self.state.devices.len().to_string(), theme::TEXT),
            Line::from(vec![
                Span::styled("  Downloaded   ", theme::label()),
                Span::styled(fmt_bytes(totals.downloaded), Style::default().fg(theme::DOWNLOAD)),
                Span::styled("   ↓ ", Style::default().fg(theme::DOWNLOAD)),
                Span::styled(fmt_rate(totals.download_rate), Style::default().fg(theme::DOWNLOAD)),
            ]),
            Line::from(vec![
                Span::styled("  Uploaded     ", theme::label()),
                Span::styled(fmt_bytes(totals.uploaded), Style::default().fg(theme::UPLOAD)),
                Span::styled("   ↑ ", Style::default().fg(theme::UPLOAD)),
                Span::styled(fmt_rate(totals.upload_rate), Style::default().fg(theme::UPLOAD)),
            ]),
            kv_line("Combined", fmt_bytes(totals.combined), theme::HIGHLIGHT),
        ];
        if let Some(reported) = self.state.reported_totals {
            lines.push(kv_line(
                "Reported",
                fmt_bytes(reported.combined),
                theme::MUTED,
            ));
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_service(&self, frame: &mut Frame, area: Rect) {
        let status = &self.state.status;
        let block = Block::default()
            .title(Span::styled(" Service ", theme::title()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(false));

        let (state_label, state_color) = if status.running {
            ("● running", theme::HEALTHY)
        } else {
            ("○ stopped", theme::FAILURE)
        };

        let lines = vec![
            kv_line("State", state_label.to_owned(), state_color),
            kv_line("Interface", status.interface.clone(), theme::HIGHLIGHT),
            kv_line("Uptime", fmt_uptime(status.uptime_secs), theme::TEXT),
            kv_line(
                "Version",
                status.version.clone().unwrap_or_else(|| "─".into()),
                theme::TEXT,
            ),
            Line::from(vec![
                Span::styled("  S ", theme::hint_key()),
                Span::styled("start  ", theme::hint()),
                Span::styled("X ", theme::hint_key()),
                Span::styled("stop  ", theme::hint()),
                Span::styled("R ", theme::hint_key()),
                Span::styled("restart  ", theme::hint()),
                Span::styled("i ", theme::hint_key()),
                Span::styled("interface", theme::hint()),
            ]),
        ];

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_prompt(frame: &mut Frame, area: Rect, buffer: &str) {
        let popup = centered_rect(44, 5, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Monitored interface ")
            .title_style(theme::title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(true))
            .style(theme::popup());

        let lines = vec![
            Line::from(vec![
                Span::styled("  > ", Style::default().fg(theme::ACCENT)),
                Span::styled(buffer.to_owned(), Style::default().fg(theme::HIGHLIGHT)),
                Span::styled("█", Style::default().fg(theme::HIGHLIGHT)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Enter ", theme::hint_key()),
                Span::styled("switch  ", theme::hint()),
                Span::styled("Esc ", theme::hint_key()),
                Span::styled("cancel", theme::hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

fn kv_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<13}"), theme::label()),
        Span::styled(value, Style::default().fg(color)),
    ])
}

/// Freshness of the displayed data, for the title bar.
pub fn staleness_label(poll: &PollStats, state: PollState, now: DateTime<Utc>) -> String {
    let age = match poll.staleness_secs(now) {
        None if poll.cycles == 0 => return "connecting\u{2026}".into(),
        None => return "service unreachable".into(),
        Some(secs) if secs < 2 => "live".to_owned(),
        Some(secs) if secs < 60 => format!("updated {secs}s ago"),
        Some(secs) => format!("updated {}m ago", secs / 60),
    };
    match (poll.consecutive_failures, state) {
        (0, PollState::Refreshing) => format!("{age} · refreshing"),
        (0, PollState::Idle) => age,
        (n, _) => format!("{age} · {n} failed polls"),
    }
}

fn staleness_color(poll: &PollStats, now: DateTime<Utc>) -> Color {
    match poll.staleness_secs(now) {
        _ if poll.consecutive_failures > 0 => theme::FAILURE,
        Some(secs) if secs <= STALE_AFTER_SECS => theme::HEALTHY,
        _ => theme::WARNING,
    }
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.interface_prompt.is_some() {
            return Ok(self.handle_prompt_key(key));
        }

        let action = match key.code {
            KeyCode::Char('i') => {
                let current = &self.state.status.interface;
                self.interface_prompt = Some(if current == UNKNOWN_INTERFACE {
                    String::new()
                } else {
                    current.clone()
                });
                None
            }
            KeyCode::Char('S') => Some(Action::Execute(Command::Service(ServiceAction::Start))),
            KeyCode::Char('X') => Some(Action::ShowConfirm(ConfirmAction::Service(
                ServiceAction::Stop,
            ))),
            KeyCode::Char('R') => Some(Action::ShowConfirm(ConfirmAction::Service(
                ServiceAction::Restart,
            ))),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::StateUpdated(state) => {
                self.series = state.history.to_vec();
                self.state = Arc::clone(state);
            }
            Action::PollStateChanged(state) => self.poll_state = *state,
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let now = Utc::now();
        let poll = &self.state.poll;
        let title_line = Line::from(vec![
            Span::styled(" netpulse ", theme::title()),
            Span::styled(
                format!(" [{}] ", staleness_label(poll, self.poll_state, now)),
                Style::default().fg(staleness_color(poll, now)),
            ),
        ]);

        let block = Block::default()
            .title(title_line)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(self.focused));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width < 40 || inner.height < 12 {
            let totals = &self.state.totals;
            let summary = format!(
                "↓ {} │ ↑ {} │ {} devices",
                fmt_rate(totals.download_rate),
                fmt_rate(totals.upload_rate),
                self.state.devices.len()
            );
            frame.render_widget(Paragraph::new(summary).style(theme::table_row()), inner);
            return;
        }

        let rows = Layout::vertical([Constraint::Min(5), Constraint::Length(7)]).split(inner);
        self.render_chart(frame, rows[0]);

        let bottom = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        self.render_totals(frame, bottom[0]);
        self.render_service(frame, bottom[1]);

        if let Some(ref buffer) = self.interface_prompt {
            Self::render_prompt(frame, area, buffer);
        }
    }

    fn captures_input(&self) -> bool {
        self.interface_prompt.is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Dashboard"
    }
}
