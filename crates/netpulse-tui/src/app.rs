//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use netpulse_core::{Command, Controller, CycleOutcome, PollState, PollStats};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::centered_rect;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    /// Set on resize; the next frame repaints every cell.
    needs_full_redraw: bool,
    /// Mirrors of the poller's state for the status bar.
    poll_state: PollState,
    last_poll: PollStats,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    data_cancel: CancellationToken,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens = create_screens(controller.config()).into_iter().collect();

        Self {
            active_screen: ScreenId::Dashboard,
            screens,
            running: true,
            help_visible: false,
            needs_full_redraw: false,
            poll_state: PollState::Idle,
            last_poll: PollStats::default(),
            action_tx,
            action_rx,
            controller,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        self.controller.start().await;

        let controller = self.controller.clone();
        let cancel = self.data_cancel.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(controller, tx, cancel).await;
        });

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    if self.needs_full_redraw {
                        tui.clear()?;
                        self.needs_full_redraw = false;
                    }
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        self.controller.shutdown().await;
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        // Text entry and popups own the keyboard
        let capturing = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.captures_input());

        if !capturing {
            match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
                (KeyModifiers::NONE, KeyCode::Char('?')) => {
                    return Ok(Some(Action::ToggleHelp));
                }
                (KeyModifiers::NONE, KeyCode::Char('r')) => {
                    return Ok(Some(Action::RequestRefresh));
                }
                (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='9')) => {
                    let screen = c
                        .to_digit(10)
                        .and_then(|n| u8::try_from(n).ok())
                        .and_then(ScreenId::from_number);
                    if let Some(screen) = screen {
                        return Ok(Some(Action::SwitchScreen(screen)));
                    }
                }
                (KeyModifiers::NONE, KeyCode::Tab) => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
                }
                (_, KeyCode::BackTab) => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
                }
                (KeyModifiers::NONE, KeyCode::Esc) if self.notification.is_some() => {
                    return Ok(Some(Action::DismissNotification));
                }
                _ => {}
            }
        }

        match self.screens.get_mut(&self.active_screen) {
            Some(screen) => screen.handle_key_event(key),
            None => Ok(None),
        }
    }

    /// Process a single action: update app state and propagate to screens.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Resize(w, h) => {
                debug!(width = w, height = h, "terminal resized");
                self.needs_full_redraw = true;
            }

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                        debug!(component = screen.id(), "focused");
                    }
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
            }

            Action::Render => {}

            // Data updates go to ALL screens so they stay in sync
            Action::StateUpdated(_) | Action::PollStateChanged(_) | Action::LimitFinished(_) => {
                match action {
                    Action::StateUpdated(state) => self.last_poll = state.poll.clone(),
                    Action::PollStateChanged(state) => self.poll_state = *state,
                    _ => {}
                }
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::RequestRefresh => self.request_refresh(),

            Action::Execute(cmd) => self.execute_command(cmd.clone()),

            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm.clone()),

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_command(confirm.into_command());
                }
            }

            Action::ConfirmNo => self.pending_confirm = None,

            Action::ApplyLimit(request) => {
                let controller = self.controller.clone();
                let tx = self.action_tx.clone();
                let cmd = Command::SetLimit(request.clone());
                tokio::spawn(async move {
                    let result = controller.execute(cmd).await.map(|_| ());
                    if let Err(e) = &result {
                        warn!(error = %e, "limit request failed");
                    }
                    let _ = tx.send(Action::LimitFinished(result));
                });
            }

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            Action::DismissNotification => self.notification = None,
        }

        Ok(())
    }

    // ── Background work ──────────────────────────────────────────

    /// Manual refresh. The store commit reaches the screens through the
    /// data bridge; only a dropped trigger is reported here.
    fn request_refresh(&self) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if controller.refresh().await == CycleOutcome::Skipped {
                let _ = tx.send(Action::Notify(Notification::info(
                    "Refresh already in progress",
                )));
            }
        });
    }

    /// Spawn a command execution task. Sends a Notify action on completion.
    fn execute_command(&self, cmd: Command) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let success_msg = cmd.describe();
            match controller.execute(cmd).await {
                Ok(_) => {
                    let _ = tx.send(Action::Notify(Notification::success(success_msg)));
                }
                Err(e) => {
                    warn!(error = %e, "command execution failed");
                    let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
                }
            }
        });
    }

    // ── Rendering ────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [screen content] [tab bar] [status bar]
        let layout = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays, last = topmost
        if let Some((notification, _)) = &self.notification {
            render_notification(frame, area, notification);
        }
        if let Some(confirm) = &self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    theme::tab(id == self.active_screen),
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let url = self.controller.config().url.to_string();
        let line = Line::from(vec![
            Span::raw(" "),
            connection_indicator(&self.last_poll, self.poll_state),
            Span::styled(format!(" {url}"), theme::hint()),
            Span::styled(" │ r refresh  ? help  q quit", theme::hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Status-bar dot: green once a read has succeeded, red while every read
/// fails, yellow before the first cycle and during a refresh.
fn connection_indicator(poll: &PollStats, state: PollState) -> Span<'static> {
    if state == PollState::Refreshing {
        return Span::styled("◐ refreshing", Style::default().fg(theme::WARNING));
    }
    match (poll.cycles, poll.consecutive_failures) {
        (0, _) => Span::styled("◐ connecting", Style::default().fg(theme::WARNING)),
        (_, 0) => Span::styled("● connected", Style::default().fg(theme::HEALTHY)),
        _ => Span::styled("○ unreachable", Style::default().fg(theme::FAILURE)),
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered_rect(60, 22, area);
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(theme::popup());

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(theme::HIGHLIGHT)))
    };
    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<12}"), theme::hint_key()),
            Span::styled(what, theme::hint()),
        ])
    };

    let help_text = vec![
        heading("  Global"),
        entry("1/2 Tab", "Switch screen"),
        entry("r", "Refresh now"),
        entry("?", "This help"),
        entry("Esc", "Dismiss notification"),
        entry("q", "Quit"),
        Line::from(""),
        heading("  Dashboard"),
        entry("i", "Change capture interface"),
        entry("S / X / R", "Start / stop / restart service"),
        Line::from(""),
        heading("  Devices"),
        entry("j/k ↑/↓ g/G", "Move selection"),
        entry("n a d u", "Sort by name / address / totals"),
        entry("D U", "Sort by download / upload rate"),
        entry("s / o", "Next sort column / reverse"),
        entry("l Enter", "Edit limit (F1-F9 presets)"),
        entry("c", "Clear limit"),
        Line::from(""),
        Line::from(Span::styled(
            "                         Esc or ? to close",
            theme::hint(),
        )),
    ];

    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog_area = centered_rect(50, 5, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::WARNING))
        .style(theme::popup());

    let text = vec![
        Line::from(Span::styled(
            format!("  {confirm}"),
            Style::default().fg(theme::TEXT),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::hint_key()),
            Span::styled("confirm    ", theme::hint()),
            Span::styled("n ", theme::hint_key()),
            Span::styled("cancel", theme::hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).block(block), dialog_area);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let msg_len = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 60);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height).intersection(area);
    if toast_area.is_empty() {
        return;
    }

    let (border_color, icon) = match notification.level {
        NotificationLevel::Success => (theme::HEALTHY, "✓"),
        NotificationLevel::Error => (theme::FAILURE, "✗"),
        NotificationLevel::Info => (theme::HIGHLIGHT, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(theme::popup());

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(
            notification.message.as_str(),
            Style::default().fg(theme::TEXT),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), toast_area);
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn label(span: &Span<'_>) -> String {
        span.content.to_string()
    }

    #[test]
    fn indicator_tracks_poll_health() {
        let mut poll = PollStats::default();
        assert_eq!(label(&connection_indicator(&poll, PollState::Idle)), "◐ connecting");

        poll.cycles = 3;
        poll.last_success = Some(Utc::now() - ChronoDuration::seconds(1));
        assert_eq!(label(&connection_indicator(&poll, PollState::Idle)), "● connected");
        assert_eq!(
            label(&connection_indicator(&poll, PollState::Refreshing)),
            "◐ refreshing"
        );

        poll.consecutive_failures = 2;
        assert_eq!(label(&connection_indicator(&poll, PollState::Idle)), "○ unreachable");
    }
}
