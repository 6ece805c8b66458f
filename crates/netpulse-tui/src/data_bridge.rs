//! Data bridge: connects the [`Controller`]'s store to TUI actions.
//!
//! Runs as a background task: watches the store's commit counter and the
//! poller's Idle/Refreshing flag, forwarding every change as an
//! [`Action`] through the TUI's action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use netpulse_core::Controller;

use crate::action::Action;

/// Forward store commits and poll-state transitions until cancelled.
///
/// Each commit is delivered as the whole `Arc` snapshot; screens never
/// see a half-applied cycle.
pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut version = controller.subscribe();
    let mut poll_state = controller.poll_state();

    // Initial snapshot so screens render something before the first cycle
    let _ = action_tx.send(Action::StateUpdated(controller.snapshot()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = version.changed() => {
                let v = *version.borrow_and_update();
                debug!(version = v, "dispatching StateUpdated");
                let _ = action_tx.send(Action::StateUpdated(controller.snapshot()));
            }
            Ok(()) = poll_state.changed() => {
                let state = *poll_state.borrow_and_update();
                let _ = action_tx.send(Action::PollStateChanged(state));
            }
            else => break,
        }
    }

    debug!("data bridge shut down");
}
