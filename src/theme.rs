use crate::config;
use anyhow::{Context, Result, anyhow};
use ratatui::style::Color;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fs;
use std::path::{Path, PathBuf};

const THEME_FILE: &str = "theme.json";

/// Every themable role and its default color. The theme file uses these keys.
const SWATCHES: [(&str, (u8, u8, u8)); 10] = [
    ("text", (236, 239, 244)),
    ("muted", (145, 152, 170)),
    ("border", (88, 98, 120)),
    ("border_active", (255, 214, 102)),
    ("accent", (102, 216, 255)),
    ("button", (36, 44, 62)),
    ("button_focused", (52, 86, 160)),
    ("success", (153, 204, 0)),
    ("warning", (255, 187, 51)),
    ("error", (255, 121, 134)),
];

/// Hex strings keyed by role, as stored on disk.
type ThemeFile = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy)]
pub struct ThemePalette {
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub border_active: Color,
    pub accent: Color,
    pub button: Color,
    pub button_focused: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for ThemePalette {
    fn default() -> Self {
        match Self::build(|key| Ok::<_, Infallible>(default_color(key))) {
            Ok(palette) => palette,
            Err(never) => match never {},
        }
    }
}

impl ThemePalette {
    fn build<E>(mut color: impl FnMut(&'static str) -> Result<Color, E>) -> Result<Self, E> {
        Ok(Self {
            text: color("text")?,
            muted: color("muted")?,
            border: color("border")?,
            border_active: color("border_active")?,
            accent: color("accent")?,
            button: color("button")?,
            button_focused: color("button_focused")?,
            success: color("success")?,
            warning: color("warning")?,
            error: color("error")?,
        })
    }

    /// Roles missing from `file` keep their default color.
    fn from_file(file: &ThemeFile) -> Result<Self> {
        for key in file.keys() {
            if !SWATCHES.iter().any(|(name, _)| name == key) {
                log::warn!("ignoring unknown theme key '{key}'");
            }
        }
        Self::build(|key| match file.get(key) {
            Some(value) => parse_hex_color(key, value),
            None => Ok(default_color(key)),
        })
    }
}

fn default_color(key: &str) -> Color {
    SWATCHES
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(Color::Reset, |(_, (r, g, b))| Color::Rgb(*r, *g, *b))
}

fn default_file() -> ThemeFile {
    SWATCHES
        .iter()
        .map(|(key, (r, g, b))| ((*key).to_owned(), format!("#{r:02X}{g:02X}{b:02X}")))
        .collect()
}

pub fn theme_path() -> Result<PathBuf> {
    config::scoped_path(THEME_FILE)
}

pub fn load_or_create_theme() -> Result<ThemePalette> {
    load_or_create_theme_at(&theme_path()?)
}

fn load_or_create_theme_at(path: &Path) -> Result<ThemePalette> {
    if !path.exists() {
        let default_file = default_file();
        write_theme_file(path, &default_file)?;
        return ThemePalette::from_file(&default_file);
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading theme config at {}", path.display()))?;
    let parsed = serde_json::from_str::<ThemeFile>(&raw)
        .with_context(|| format!("failed parsing theme config at {}", path.display()))?;
    ThemePalette::from_file(&parsed)
}

fn write_theme_file(path: &Path, theme: &ThemeFile) -> Result<()> {
    config::ensure_parent_dir(path)?;
    let payload = serde_json::to_string_pretty(theme).context("failed serializing theme config")?;
    fs::write(path, payload)
        .with_context(|| format!("failed writing theme config at {}", path.display()))?;
    Ok(())
}

fn parse_hex_color(key: &str, value: &str) -> Result<Color> {
    let input = value.trim();
    let hex = input.strip_prefix('#').unwrap_or(input);
    let rgb = if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        None
    };
    let [_, red, green, blue] = rgb
        .ok_or_else(|| anyhow!("theme field '{key}' must be a hex color like #RRGGBB, got '{value}'"))?
        .to_be_bytes();
    Ok(Color::Rgb(red, green, blue))
}
