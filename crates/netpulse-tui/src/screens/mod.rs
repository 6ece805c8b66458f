//! Screen implementations. Each screen is a top-level Component.

pub mod dashboard;
pub mod devices;

use netpulse_core::DashboardConfig;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components for the tab bar.
pub fn create_screens(config: &DashboardConfig) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Dashboard,
            Box::new(dashboard::DashboardScreen::new(config.history_capacity)),
        ),
        (
            ScreenId::Devices,
            Box::new(devices::DevicesScreen::new(
                config.presets.clone(),
                config.seed_preset(),
            )),
        ),
    ]
}
