/// run settings for shapetrace
/// loaded from a JSON file; command-line flags override individual fields
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// search budget per step
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// random candidates sampled before each hill climb
    pub candidates: u32,
    /// hill-climb iterations per restart
    pub age: u32,
    /// restarts per step, split across all workers
    pub restarts: u32,
    /// hill-climb iterations per refinement pass (`--rep`)
    pub refine_age: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            candidates: 1000,
            age: 100,
            restarts: 16,
            refine_age: 100,
        }
    }
}

/// output sizing and encoder settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// longer side of rendered outputs, in pixels
    pub size: u32,
    /// inputs larger than this are thumbnailed before the search
    pub input_resize: u32,
    /// minimum score drop between two animation frames
    pub frame_delta: f64,
    pub gif_delay_ms: u32,
    /// the last frame lingers
    pub gif_last_delay_ms: u32,
    pub jpeg_quality: u8,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            size: 1024,
            input_resize: 256,
            frame_delta: 0.001,
            gif_delay_ms: 500,
            gif_last_delay_ms: 2500,
            jpeg_quality: 95,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub output: OutputSettings,
}

impl Settings {
    /// save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// load settings from a JSON file, or return defaults if the file doesn't exist.
    /// a file that exists but doesn't parse is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("shapetrace-{}-{name}", std::process::id()))
    }

    #[test]
    fn missing_file_gives_defaults() {
        let s = Settings::load(temp_path("does-not-exist.json")).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.search.candidates, 1000);
        assert_eq!(s.output.jpeg_quality, 95);
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("roundtrip.json");
        let mut s = Settings::default();
        s.search.restarts = 4;
        s.output.size = 512;
        s.save(&path).unwrap();
        let back = Settings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, s);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let path = temp_path("partial.json");
        std::fs::write(&path, r#"{ "search": { "age": 7 } }"#).unwrap();
        let s = Settings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(s.search.age, 7);
        assert_eq!(s.search.candidates, 1000);
        assert_eq!(s.output, OutputSettings::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_path("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Settings::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, Err(crate::error::Error::Json(_))));
    }
}
