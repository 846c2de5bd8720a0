use anyhow::Context;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver},
};

use crate::{icons::IconStyle, theme::ConfiguredTheme};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub window: WindowConfig,
    pub theme: ConfiguredTheme,
    pub ui: UiConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub always_on_top: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 300.0,
            always_on_top: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UiConfig {
    pub icon_style: IconStyle,
    pub alignment: Alignment,
    pub lock_widget: bool,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub preferred_app: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preferred_app: Some("spotify".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Horizontal,
    #[default]
    Vertical,
}

impl Config {
    /// First existing config file among the candidate locations, if any.
    pub fn source_path() -> Option<PathBuf> {
        candidate_paths().into_iter().find(|path| path.exists())
    }

    pub fn load() -> anyhow::Result<Self> {
        match Self::source_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let doc: ConfigDocument = toml::from_str(&data)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        doc.try_into()
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(current_dir) = env::current_dir() {
        candidates.push(current_dir.join("config.toml"));
        candidates.push(current_dir.join("config").join("config.toml"));
        candidates.push(current_dir.join("config").join("fono.toml"));
    }

    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join("config.toml"));
            candidates.push(dir.join("config").join("config.toml"));
            candidates.push(dir.join("config").join("fono.toml"));
        }
    }

    candidates
}

/// Reloads the config file when it changes on disk.
pub struct ConfigWatcher {
    path: PathBuf,
    changes_rx: Receiver<notify::Result<notify::Event>>,
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    pub fn watch(path: PathBuf) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        Ok(Self {
            path,
            changes_rx: rx,
            _watcher: watcher,
        })
    }

    /// Drain pending filesystem events and reload once if anything changed.
    pub fn poll(&self) -> Option<Config> {
        let mut changed = false;
        while let Ok(event) = self.changes_rx.try_recv() {
            match event {
                Ok(_) => changed = true,
                Err(err) => tracing::debug!("config watch error: {err}"),
            }
        }

        if !changed {
            return None;
        }

        match Config::load_from(&self.path) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!("failed to reload config: {err:?}");
                None
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    window: WindowSection,
    #[serde(default)]
    theme: ThemeSection,
    #[serde(default)]
    ui: UiSection,
    #[serde(default)]
    session: SessionSection,
}

impl TryFrom<ConfigDocument> for Config {
    type Error = anyhow::Error;

    fn try_from(value: ConfigDocument) -> anyhow::Result<Self> {
        let defaults = ConfiguredTheme::default();
        let parse = |field: Option<String>, fallback| -> anyhow::Result<_> {
            field
                .map(|hex| crate::theme::parse_hex_color(&hex))
                .transpose()
                .map(|color| color.unwrap_or(fallback))
        };

        let theme = ConfiguredTheme {
            background: parse(value.theme.background, defaults.background)?,
            text: parse(value.theme.text, defaults.text)?,
            primary: parse(value.theme.primary, defaults.primary)?,
            background_opacity: value
                .theme
                .background_opacity
                .unwrap_or(defaults.background_opacity)
                .min(100),
            border_radius: value
                .theme
                .border_radius
                .unwrap_or(defaults.border_radius)
                .max(0.0),
            dynamic: value.theme.dynamic.unwrap_or(defaults.dynamic),
        };

        let window_defaults = WindowConfig::default();
        let window = WindowConfig {
            width: value.window.width.unwrap_or(window_defaults.width).max(80.0),
            height: value
                .window
                .height
                .unwrap_or(window_defaults.height)
                .max(80.0),
            always_on_top: value
                .window
                .always_on_top
                .unwrap_or(window_defaults.always_on_top),
        };

        let ui = UiConfig {
            icon_style: value.ui.icon_style.unwrap_or_default(),
            alignment: value.ui.alignment.unwrap_or_default(),
            lock_widget: value.ui.lock_widget.unwrap_or(false),
        };

        let session = SessionConfig {
            preferred_app: value
                .session
                .preferred_app
                .or_else(|| SessionConfig::default().preferred_app)
                .filter(|app| !app.is_empty()),
        };

        Ok(Config {
            window,
            theme,
            ui,
            session,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct WindowSection {
    width: Option<f32>,
    height: Option<f32>,
    always_on_top: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ThemeSection {
    background: Option<String>,
    text: Option<String>,
    primary: Option<String>,
    background_opacity: Option<u8>,
    border_radius: Option<f32>,
    dynamic: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct UiSection {
    icon_style: Option<IconStyle>,
    alignment: Option<Alignment>,
    lock_widget: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionSection {
    preferred_app: Option<String>,
}
