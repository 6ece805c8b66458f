//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use netpulse_core::{
    Command, CoreError, DashboardState, LimitRequest, MacAddress, PollState, ServiceAction,
};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Writes that need a y/n before they are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Service(ServiceAction),
    ClearLimit { mac: MacAddress, name: String },
}

impl ConfirmAction {
    pub fn into_command(self) -> Command {
        match self {
            Self::Service(action) => Command::Service(action),
            Self::ClearLimit { mac, .. } => Command::ClearLimit { mac },
        }
    }
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(ServiceAction::Start) => write!(f, "Start the measurement service?"),
            Self::Service(ServiceAction::Stop) => write!(f, "Stop the measurement service?"),
            Self::Service(ServiceAction::Restart) => {
                write!(f, "Restart the measurement service?")
            }
            Self::ClearLimit { name, .. } => write!(f, "Remove the limit on {name}?"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ──
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Data ──
    StateUpdated(Arc<DashboardState>),
    PollStateChanged(PollState),
    RequestRefresh,

    // ── Writes ──
    /// Send immediately, no confirmation.
    Execute(Command),
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,
    /// The limit editor produced a request.
    ApplyLimit(LimitRequest),
    /// The service answered a limit request.
    LimitFinished(Result<(), CoreError>),

    // ── Notifications ──
    Notify(Notification),
    DismissNotification,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn confirm_actions_map_to_commands() {
        let mac = MacAddress::new("aa:bb:cc:dd:ee:01");
        let clear = ConfirmAction::ClearLimit {
            mac: mac.clone(),
            name: "nas".into(),
        };
        assert_eq!(clear.to_string(), "Remove the limit on nas?");
        assert_eq!(clear.into_command(), Command::ClearLimit { mac });
        assert_eq!(
            ConfirmAction::Service(ServiceAction::Stop).into_command(),
            Command::Service(ServiceAction::Stop)
        );
    }
}
