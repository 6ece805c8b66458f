//! Tab-bar screens and their number-key bindings.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    Dashboard,
    Devices,
}

impl ScreenId {
    /// Tab-bar order. Position `i` is bound to number key `i + 1`.
    pub const ALL: [ScreenId; 2] = [Self::Dashboard, Self::Devices];

    fn index(self) -> usize {
        match self {
            Self::Dashboard => 0,
            Self::Devices => 1,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::Dashboard => 1,
            Self::Devices => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        usize::from(n)
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    /// Following tab, wrapping at the end.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Preceding tab, wrapping at the start.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Devices => "Devices",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::ScreenId;

    #[test]
    fn number_keys_match_tab_order() {
        for (i, id) in ScreenId::ALL.into_iter().enumerate() {
            assert_eq!(usize::from(id.number()), i + 1);
            assert_eq!(ScreenId::from_number(id.number()), Some(id));
        }
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(9), None);
    }

    #[test]
    fn tab_order_wraps() {
        assert_eq!(ScreenId::Devices.next(), ScreenId::Dashboard);
        assert_eq!(ScreenId::Dashboard.prev(), ScreenId::Devices);
    }
}
