use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blitter::BlitMode;
use serde::Deserialize;

/// Viewer defaults loaded from TOML. Every field has a baked-in default,
/// so a missing file or an empty file both yield a usable configuration;
/// CLI flags override whatever is resolved here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default blit mode name; parsed with the same rules as `--mode`.
    pub mode: String,
    /// FPS cap; 0 disables the cap.
    pub fps: f32,
    /// Multiplier applied per zoom step (scroll wheel or +/-).
    pub zoom_step: f32,
    /// Pan distance per arrow key press, in shader units at zoom 1.
    pub pan_step: f32,
    /// How much taller than wide a terminal glyph cell is.
    pub cell_aspect: f32,
    /// Whether the FPS overlay starts enabled.
    pub stats: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: "quadrants".to_string(),
            fps: 60.0,
            zoom_step: 1.1,
            pan_step: 0.05,
            cell_aspect: 2.0,
            stats: true,
        }
    }
}

impl Settings {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("failed to parse settings TOML")
    }

    /// Loads settings from an explicit path (which must exist) or from the
    /// default location (which may be absent).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match fs::read_to_string(&path) {
            Ok(raw) => Self::from_toml_str(&raw)
                .with_context(|| format!("invalid settings file {}", path.display())),
            Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(err) => Err(err).with_context(|| {
                format!("failed to read settings file {}", path.display())
            }),
        }
    }

    pub fn blit_mode(&self) -> Result<BlitMode> {
        self.mode
            .parse()
            .map_err(|message: String| anyhow::anyhow!(message))
            .context("invalid `mode` in settings")
    }

    /// FPS cap with 0 normalized to "uncapped".
    pub fn fps_cap(&self) -> Option<f32> {
        if self.fps > 0.0 {
            Some(self.fps)
        } else {
            None
        }
    }
}

fn default_path() -> Option<PathBuf> {
    directories_next::ProjectDirs::from("", "", "termshade")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_input_yields_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.blit_mode().unwrap(), BlitMode::Quadrants);
        assert_eq!(settings.fps_cap(), Some(60.0));
    }

    #[test]
    fn overrides_apply() {
        let settings = Settings::from_toml_str(
            r#"
mode = "braille"
fps = 0
zoom_step = 1.25
stats = false
"#,
        )
        .unwrap();
        assert_eq!(settings.blit_mode().unwrap(), BlitMode::Braille);
        assert_eq!(settings.fps_cap(), None, "fps = 0 means uncapped");
        assert!((settings.zoom_step - 1.25).abs() < f32::EPSILON);
        assert!(!settings.stats);
        assert!((settings.pan_step - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_toml_str("zoom_factor = 2.0").is_err());
    }

    #[test]
    fn bad_mode_surfaces_at_resolution_time() {
        let settings = Settings::from_toml_str("mode = \"octants\"").unwrap();
        assert!(settings.blit_mode().is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let missing = Path::new("/nonexistent/termshade.toml");
        assert!(Settings::load(Some(missing)).is_err());
    }

    #[test]
    fn loads_from_an_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mode = \"halves\"").unwrap();
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.blit_mode().unwrap(), BlitMode::Halves);
    }
}
