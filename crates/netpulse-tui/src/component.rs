//! The interface every screen implements.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// A screen mounted in the tab bar.
///
/// The app calls `init` once, then routes keys to the active screen,
/// broadcasts data actions to every screen, and renders the active one.
/// Returned actions go back onto the app's queue.
pub trait Component: Send {
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    /// True while a popup or prompt owns the keyboard. Global bindings
    /// other than Ctrl+C are suspended until it returns false.
    fn captures_input(&self) -> bool {
        false
    }

    fn set_focused(&mut self, _focused: bool) {}

    /// Stable name, used in logs.
    fn id(&self) -> &str;
}
