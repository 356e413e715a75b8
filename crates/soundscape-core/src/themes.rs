use crate::error::{Result, SoundscapeError};
use std::fmt;
use std::str::FromStr;

/// Hex colours for one theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub primary: &'static str,
    pub background_start: &'static str,
    pub background_end: &'static str,
    pub particle: &'static str,
    pub tile: &'static str,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    OceanicBlue,
    CosmicPurple,
    ForestGreen,
    SunsetOrange,
}

impl Theme {
    pub const ALL: [Theme; 4] = [
        Theme::OceanicBlue,
        Theme::CosmicPurple,
        Theme::ForestGreen,
        Theme::SunsetOrange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Theme::OceanicBlue => "Oceanic Blue",
            Theme::CosmicPurple => "Cosmic Purple",
            Theme::ForestGreen => "Forest Green",
            Theme::SunsetOrange => "Sunset Orange",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::OceanicBlue => Palette {
                primary: "#3498db",
                background_start: "#0f2027",
                background_end: "#203a43",
                particle: "#3498db",
                tile: "#34495e",
            },
            Theme::CosmicPurple => Palette {
                primary: "#9b59b6",
                background_start: "#1a0a2e",
                background_end: "#0d0517",
                particle: "#9b59b6",
                tile: "#3e2a5b",
            },
            Theme::ForestGreen => Palette {
                primary: "#2ecc71",
                background_start: "#134e5e",
                background_end: "#71b280",
                particle: "#2ecc71",
                tile: "#27ae60",
            },
            Theme::SunsetOrange => Palette {
                primary: "#e67e22",
                background_start: "#ff4e50",
                background_end: "#f9d423",
                particle: "#e67e22",
                tile: "#e88d2d",
            },
        }
    }

    /// CSS custom properties the page stylesheet reads.
    pub fn css_variables(self) -> [(&'static str, &'static str); 5] {
        let p = self.palette();
        [
            ("--primary-color", p.primary),
            ("--background-start", p.background_start),
            ("--background-end", p.background_end),
            ("--particle-color", p.particle),
            ("--tile-color", p.tile),
        ]
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| SoundscapeError::UnknownTheme(name.to_string()))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = SoundscapeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}
