//! Configuration options for the baker.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::request::{BitDepth, OutputType};

/// Virtual prefix for paths inside the project's content directory.
pub const GAME_ROOT: &str = "/Game/";

/// Global configuration options for the baker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Real directory that `/Game/` paths resolve to.
    pub content_dir: PathBuf,

    /// Default output width for new requests.
    pub default_width: u32,

    /// Default output height for new requests.
    pub default_height: u32,

    /// Default bit depth for new requests.
    pub default_bit_depth: BitDepth,

    /// Default output sink for new requests.
    pub default_output: OutputType,

    /// Whether baked names get a property suffix automatically.
    pub auto_suffix: bool,

    /// Upper bound offered to users for texture sizes. Not enforced by the
    /// pipeline, which accepts any positive size.
    pub max_dimension: u32,

    /// Height of the capture camera above the reference surface.
    pub capture_height: f32,

    /// Orthographic width of the capture camera; matches the reference
    /// surface size so the surface fills the frame.
    pub ortho_width: f32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("Content"),
            default_width: 1024,
            default_height: 1024,
            default_bit_depth: BitDepth::Bit16,
            default_output: OutputType::TextureAsset,
            auto_suffix: true,
            max_dimension: 8192,
            capture_height: 100.0,
            ortho_width: 200.0,
        }
    }
}

impl Options {
    /// Loads options from a JSON file. Missing fields take default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Saves options as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Resolves `/Game/`-rooted virtual paths against the content directory.
    ///
    /// Other paths are returned unchanged.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        let text = path.to_string_lossy();
        match text.strip_prefix(GAME_ROOT) {
            Some(rest) => self.content_dir.join(rest),
            None if text == GAME_ROOT.trim_end_matches('/') => self.content_dir.clone(),
            None => path.to_path_buf(),
        }
    }

    /// Clamps a requested size into the range offered to users.
    pub fn clamp_dimension(&self, value: u32) -> u32 {
        value.clamp(1, self.max_dimension)
    }
}
