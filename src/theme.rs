//! Light/dark theme preference.
//!
//! An explicitly saved preference always wins. Without one, the presented
//! theme follows the system color-scheme signal and keeps following it as the
//! signal changes.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::store::PreferenceStore;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    Light,
    Dark,
}

impl ThemeName {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Light => "light",
            ThemeName::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(ThemeName::Light),
            "dark" => Some(ThemeName::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeName::Light => ThemeName::Dark,
            ThemeName::Dark => ThemeName::Light,
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The system-level color-scheme signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SystemScheme {
    Light,
    Dark,
    /// No usable signal.
    Unknown,
}

impl SystemScheme {
    pub fn preferred_theme(self) -> ThemeName {
        match self {
            SystemScheme::Dark => ThemeName::Dark,
            SystemScheme::Light | SystemScheme::Unknown => ThemeName::Light,
        }
    }
}

/// Read the terminal's `COLORFGBG` hint (`"<fg>;<bg>"`).
pub fn detect_system_scheme() -> SystemScheme {
    scheme_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

fn scheme_from_colorfgbg(value: Option<&str>) -> SystemScheme {
    let Some(bg) = value.and_then(|v| v.rsplit(';').next()) else {
        return SystemScheme::Unknown;
    };
    match bg.trim().parse::<u8>() {
        Ok(0..=6 | 8) => SystemScheme::Dark,
        Ok(_) => SystemScheme::Light,
        Err(_) => SystemScheme::Unknown,
    }
}

pub struct ThemePreference {
    store: PreferenceStore,
}

impl ThemePreference {
    pub fn new(store: PreferenceStore) -> Self {
        Self { store }
    }

    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Ok(Self::new(PreferenceStore::open(path)?))
    }

    /// The explicitly saved theme. Unrecognized stored values are ignored.
    pub fn stored(&self) -> Option<ThemeName> {
        let raw = self.store.get(THEME_KEY)?;
        let theme = ThemeName::parse(raw);
        if theme.is_none() {
            tracing::warn!(value = raw, "ignoring unrecognized stored theme");
        }
        theme
    }

    pub fn load(&self, system: SystemScheme) -> ThemeName {
        self.stored().unwrap_or_else(|| system.preferred_theme())
    }

    pub fn save(&mut self, theme: ThemeName) -> anyhow::Result<()> {
        if self.store.set(THEME_KEY, theme.as_str())? {
            tracing::info!(%theme, path = %self.store.path().display(), "saved theme preference");
        }
        Ok(())
    }

    /// Save and return the opposite of the currently presented theme.
    pub fn toggle(&mut self, current: ThemeName) -> anyhow::Result<ThemeName> {
        let next = current.toggled();
        self.save(next)?;
        Ok(next)
    }

    /// Forget the saved preference so the system signal is tracked again.
    pub fn clear(&mut self) -> anyhow::Result<()> {
        if self.store.remove(THEME_KEY)? {
            tracing::info!("cleared theme preference");
        }
        Ok(())
    }

    /// The theme to present after the system signal changed, or `None` when a
    /// saved preference overrides the signal.
    pub fn system_changed(&self, system: SystemScheme) -> Option<ThemeName> {
        if self.stored().is_some() {
            return None;
        }
        Some(system.preferred_theme())
    }
}
