use crate::destination::{Destination, resolve_address};
use crate::viewer::{ViewRequest, Viewer, ViewerError};
use std::time::{Duration, Instant};

pub const EXIT_CONFIRM_WINDOW: Duration = Duration::from_secs(2);
pub const EXIT_CONFIRM_MESSAGE: &str = "Press back again to exit";

const GRID_COLS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeButton {
    Dashboard,
    MediaLibrary,
    LiveTv,
    Settings,
}

impl HomeButton {
    /// Grid order, row by row.
    pub const ALL: [Self; 4] = [
        Self::Dashboard,
        Self::MediaLibrary,
        Self::LiveTv,
        Self::Settings,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::MediaLibrary => "Media Library",
            Self::LiveTv => "Live TV",
            Self::Settings => "Settings",
        }
    }

    #[must_use]
    pub const fn destination(self) -> Option<Destination> {
        match self {
            Self::Dashboard => Some(Destination::Dashboard),
            Self::MediaLibrary => Some(Destination::MediaLibrary),
            Self::LiveTv => Some(Destination::LiveTv),
            Self::Settings => None,
        }
    }

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|button| *button == self)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Opened(ViewRequest),
    Settings,
}

/// Resolves destinations against the configured base address and hands them to a viewer.
pub struct Launcher<V> {
    server_url: String,
    viewer: V,
}

impl<V: Viewer> Launcher<V> {
    pub fn new(server_url: impl Into<String>, viewer: V) -> Self {
        Self {
            server_url: server_url.into(),
            viewer,
        }
    }

    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn set_server_url(&mut self, server_url: impl Into<String>) {
        self.server_url = server_url.into();
    }

    #[must_use]
    pub fn request_for(&self, destination: Destination) -> ViewRequest {
        ViewRequest {
            address: resolve_address(&self.server_url, destination),
            title: destination.title().map(str::to_owned),
        }
    }

    pub fn open(&self, destination: Destination) -> Result<Navigation, ViewerError> {
        let request = self.request_for(destination);
        self.viewer.open(&request)?;
        Ok(Navigation::Opened(request))
    }

    pub fn activate(&self, button: HomeButton) -> Result<Navigation, ViewerError> {
        match button.destination() {
            Some(destination) => self.open(destination),
            None => Ok(Navigation::Settings),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKey {
    Up,
    Down,
    Left,
    Right,
    DpadCenter,
    Enter,
    Back,
    Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    FocusMoved(HomeButton),
    Activate(HomeButton),
    OpenSettings,
    ConfirmExit,
    Exit,
    Ignored,
}

/// Focus and exit-confirmation state for the home screen.
#[derive(Debug, Clone)]
pub struct HomeInput {
    focused: HomeButton,
    exit_armed_until: Option<Instant>,
}

impl Default for HomeInput {
    fn default() -> Self {
        Self {
            focused: HomeButton::Dashboard,
            exit_armed_until: None,
        }
    }
}

impl HomeInput {
    #[must_use]
    pub const fn focused(&self) -> HomeButton {
        self.focused
    }

    pub fn focus(&mut self, button: HomeButton) {
        self.focused = button;
    }

    #[must_use]
    pub fn exit_armed(&self, now: Instant) -> bool {
        self.exit_armed_until.is_some_and(|deadline| now < deadline)
    }

    pub fn on_remote_key(&mut self, key: RemoteKey, now: Instant) -> KeyOutcome {
        if key == RemoteKey::Back {
            if self.exit_armed(now) {
                self.exit_armed_until = None;
                return KeyOutcome::Exit;
            }
            self.exit_armed_until = Some(now + EXIT_CONFIRM_WINDOW);
            return KeyOutcome::ConfirmExit;
        }
        self.exit_armed_until = None;

        match key {
            RemoteKey::DpadCenter | RemoteKey::Enter => KeyOutcome::Activate(self.focused),
            RemoteKey::Menu => KeyOutcome::OpenSettings,
            RemoteKey::Up | RemoteKey::Down | RemoteKey::Left | RemoteKey::Right => {
                match move_focus(self.focused, key) {
                    Some(next) => {
                        self.focused = next;
                        KeyOutcome::FocusMoved(next)
                    }
                    None => KeyOutcome::Ignored,
                }
            }
            RemoteKey::Back => KeyOutcome::Ignored,
        }
    }
}

fn move_focus(current: HomeButton, key: RemoteKey) -> Option<HomeButton> {
    let index = current.index();
    let (row, col) = (index / GRID_COLS, index % GRID_COLS);
    let rows = HomeButton::ALL.len().div_ceil(GRID_COLS);

    let (row, col) = match key {
        RemoteKey::Up if row > 0 => (row - 1, col),
        RemoteKey::Down if row + 1 < rows => (row + 1, col),
        RemoteKey::Left if col > 0 => (row, col - 1),
        RemoteKey::Right if col + 1 < GRID_COLS => (row, col + 1),
        _ => return None,
    };
    HomeButton::ALL.get(row * GRID_COLS + col).copied()
}
