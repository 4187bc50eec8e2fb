// Page state machine
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Main,
    PairManager,
}

impl Page {
    /// Moves to the requested page. Every page is reachable from every other;
    /// new pages must be added to this table.
    pub fn transition(self, requested: Page) -> Page {
        match (self, requested) {
            (Page::Main, Page::Main) => Page::Main,
            (Page::Main, Page::PairManager) => Page::PairManager,
            (Page::PairManager, Page::Main) => Page::Main,
            (Page::PairManager, Page::PairManager) => Page::PairManager,
        }
    }

    /// Destination of the navigation button shown on this page.
    pub fn nav_target(self) -> Page {
        match self {
            Page::Main => Page::PairManager,
            Page::PairManager => Page::Main,
        }
    }
}
