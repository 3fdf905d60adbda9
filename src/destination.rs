use clap::ValueEnum;
use std::fmt;

/// Port carried by the base address (the dashboard).
pub const BASE_PORT_TOKEN: &str = ":8600";
pub const MEDIA_PORT_TOKEN: &str = ":8200";
pub const LIVE_TV_PORT_TOKEN: &str = ":8320";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Destination {
    #[value(name = "dashboard")]
    Dashboard,
    #[value(name = "media", alias = "media-library")]
    MediaLibrary,
    #[value(name = "livetv", alias = "live-tv")]
    LiveTv,
}

impl Destination {
    pub const ALL: [Self; 3] = [Self::Dashboard, Self::MediaLibrary, Self::LiveTv];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::MediaLibrary => "Media Library",
            Self::LiveTv => "Live TV",
        }
    }

    /// Title handed to the viewer alongside the address.
    #[must_use]
    pub const fn title(self) -> Option<&'static str> {
        match self {
            Self::Dashboard => None,
            Self::MediaLibrary => Some("Media Library"),
            Self::LiveTv => Some("Live TV"),
        }
    }

    const fn port_token(self) -> Option<&'static str> {
        match self {
            Self::Dashboard => None,
            Self::MediaLibrary => Some(MEDIA_PORT_TOKEN),
            Self::LiveTv => Some(LIVE_TV_PORT_TOKEN),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derives a destination address from the base address.
///
/// The substitution is purely textual: a base without `:8600` comes back
/// unchanged rather than failing.
#[must_use]
pub fn resolve_address(base: &str, destination: Destination) -> String {
    match destination.port_token() {
        None => base.to_owned(),
        Some(token) => base.replace(BASE_PORT_TOKEN, token),
    }
}

#[cfg(test)]
mod tests {
    use super::{Destination, resolve_address};

    #[test]
    fn dashboard_keeps_base_address() {
        assert_eq!(
            resolve_address("http://h:8600", Destination::Dashboard),
            "http://h:8600"
        );
        assert_eq!(
            resolve_address("http://h:9000/ui", Destination::Dashboard),
            "http://h:9000/ui"
        );
    }

    #[test]
    fn media_and_live_tv_swap_the_port() {
        assert_eq!(
            resolve_address("http://h:8600", Destination::MediaLibrary),
            "http://h:8200"
        );
        assert_eq!(
            resolve_address("http://h:8600", Destination::LiveTv),
            "http://h:8320"
        );
        assert_eq!(
            resolve_address("http://192.168.1.100:8600/home", Destination::LiveTv),
            "http://192.168.1.100:8320/home"
        );
    }

    #[test]
    fn base_without_port_token_is_returned_unchanged() {
        for base in ["http://h", "http://h:8601", "https://media.example.com:443"] {
            assert_eq!(resolve_address(base, Destination::MediaLibrary), base);
            assert_eq!(resolve_address(base, Destination::LiveTv), base);
        }
    }

    #[test]
    fn titles_match_destinations() {
        assert_eq!(Destination::Dashboard.title(), None);
        assert_eq!(Destination::MediaLibrary.title(), Some("Media Library"));
        assert_eq!(Destination::LiveTv.title(), Some("Live TV"));
    }
}
