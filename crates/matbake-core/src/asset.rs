//! Texture asset persistence.
//!
//! Assets are created in two steps: [`AssetStore::create_asset`] builds the
//! asset under a unique name, and [`AssetStore::register_asset`] makes it
//! visible (and, for on-disk stores, writes it). A failed bake therefore never
//! leaves a half-written asset behind.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BakeError, Result};
use crate::options::Options;
use crate::request::CompressionSettings;
use crate::target::PixelFormat;

/// Identifies a created asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle {
    /// Full package path, e.g. `/Game/Textures/T_Rock`.
    pub package_path: String,
    /// Asset name, the last component of the package path.
    pub name: String,
}

/// Texture metadata stored alongside the source pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub compression: CompressionSettings,
    pub srgb: bool,
}

/// A 2D texture whose source data is an uncompressed pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAsset {
    pub info: TextureInfo,
    pub source: Vec<u8>,
}

impl TextureAsset {
    /// Creates a texture, checking `source` against the dimensions and format.
    pub fn new(info: TextureInfo, source: Vec<u8>) -> Result<Self> {
        let expected =
            info.width as usize * info.height as usize * info.format.bytes_per_pixel();
        if source.len() != expected {
            return Err(BakeError::SizeMismatch {
                expected,
                actual: source.len(),
            });
        }
        Ok(Self { info, source })
    }
}

/// Joins a package directory and an asset name with `/`.
pub fn package_path(dir: &Path, name: &str) -> String {
    let dir = dir.to_string_lossy();
    format!("{}/{name}", dir.trim_end_matches('/'))
}

/// Destination for baked texture assets.
pub trait AssetStore {
    /// Returns `base_name` or the first free `base_name_N` under `dir`.
    fn create_unique_name(&self, dir: &Path, base_name: &str) -> String;

    /// Creates an unregistered asset named `name` under `dir`.
    fn create_asset(&mut self, dir: &Path, name: &str, texture: TextureAsset)
        -> Result<AssetHandle>;

    /// Registers a created asset.
    fn register_asset(&mut self, handle: &AssetHandle) -> Result<()>;
}

/// Shared unique-name search: tries `base`, then `base_1`, `base_2`, ...
fn first_free_name(dir: &Path, base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(&package_path(dir, base)) {
        return base.to_string();
    }
    (1u32..)
        .map(|i| format!("{base}_{i}"))
        .find(|candidate| !taken(&package_path(dir, candidate)))
        .unwrap_or_else(|| base.to_string())
}

struct Entry {
    texture: TextureAsset,
    registered: bool,
}

/// Asset store that keeps textures in memory.
#[derive(Default)]
pub struct InMemoryAssetStore {
    /// Map from package path -> asset
    assets: HashMap<String, Entry>,
}

impl InMemoryAssetStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a registered texture by package path.
    pub fn get(&self, package_path: &str) -> Option<&TextureAsset> {
        self.assets
            .get(package_path)
            .filter(|e| e.registered)
            .map(|e| &e.texture)
    }

    /// Checks if a registered asset exists at the given package path.
    pub fn contains(&self, package_path: &str) -> bool {
        self.get(package_path).is_some()
    }

    /// Returns the number of registered assets.
    pub fn len(&self) -> usize {
        self.assets.values().filter(|e| e.registered).count()
    }

    /// Returns true if no asset is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the package paths of all registered assets.
    pub fn package_paths(&self) -> impl Iterator<Item = &str> {
        self.assets
            .iter()
            .filter(|(_, e)| e.registered)
            .map(|(path, _)| path.as_str())
    }
}

impl AssetStore for InMemoryAssetStore {
    fn create_unique_name(&self, dir: &Path, base_name: &str) -> String {
        first_free_name(dir, base_name, |path| self.assets.contains_key(path))
    }

    fn create_asset(
        &mut self,
        dir: &Path,
        name: &str,
        texture: TextureAsset,
    ) -> Result<AssetHandle> {
        let path = package_path(dir, name);
        if self.assets.contains_key(&path) {
            return Err(BakeError::Validation(format!("asset '{path}' already exists")));
        }
        self.assets.insert(
            path.clone(),
            Entry {
                texture,
                registered: false,
            },
        );
        Ok(AssetHandle {
            package_path: path,
            name: name.to_string(),
        })
    }

    fn register_asset(&mut self, handle: &AssetHandle) -> Result<()> {
        let entry = self
            .assets
            .get_mut(&handle.package_path)
            .ok_or_else(|| unknown_asset(handle))?;
        entry.registered = true;
        Ok(())
    }
}

fn unknown_asset(handle: &AssetHandle) -> BakeError {
    BakeError::Validation(format!("unknown asset '{}'", handle.package_path))
}

/// Asset store that writes each texture as `<name>.bin` (raw source) plus
/// `<name>.json` (metadata) under the resolved package directory.
pub struct DirectoryAssetStore {
    options: Options,
    pending: HashMap<String, (PathBuf, TextureAsset)>,
}

impl DirectoryAssetStore {
    /// Creates a store that resolves `/Game/` against `options.content_dir`.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            pending: HashMap::new(),
        }
    }

    fn metadata_path(&self, package_path: &str) -> PathBuf {
        self.options
            .resolve_path(Path::new(package_path))
            .with_extension("json")
    }

    /// True when either file of the asset is already on disk.
    fn on_disk(meta: &Path) -> bool {
        meta.exists() || meta.with_extension("bin").exists()
    }

    /// Writes both files under temporary names, then renames them into
    /// place with the metadata last.
    fn write_files(meta: &Path, texture: &TextureAsset) -> Result<()> {
        let bin_tmp = meta.with_extension("bin.tmp");
        let meta_tmp = meta.with_extension("json.tmp");
        fs::write(&bin_tmp, &texture.source)?;
        fs::write(&meta_tmp, serde_json::to_string_pretty(&texture.info)?)?;
        fs::rename(&bin_tmp, meta.with_extension("bin"))?;
        fs::rename(&meta_tmp, meta)?;
        Ok(())
    }

    fn remove_partial(meta: &Path) {
        for ext in ["bin.tmp", "json.tmp", "bin"] {
            let _ = fs::remove_file(meta.with_extension(ext));
        }
    }

    /// Loads a registered texture back from disk.
    pub fn load(&self, handle: &AssetHandle) -> Result<TextureAsset> {
        let meta = self.metadata_path(&handle.package_path);
        let info: TextureInfo = serde_json::from_str(&fs::read_to_string(&meta)?)?;
        let source = fs::read(meta.with_extension("bin"))?;
        TextureAsset::new(info, source)
    }
}

impl AssetStore for DirectoryAssetStore {
    fn create_unique_name(&self, dir: &Path, base_name: &str) -> String {
        first_free_name(dir, base_name, |path| {
            self.pending.contains_key(path) || Self::on_disk(&self.metadata_path(path))
        })
    }

    fn create_asset(
        &mut self,
        dir: &Path,
        name: &str,
        texture: TextureAsset,
    ) -> Result<AssetHandle> {
        let path = package_path(dir, name);
        let meta = self.metadata_path(&path);
        if self.pending.contains_key(&path) || Self::on_disk(&meta) {
            return Err(BakeError::Validation(format!("asset '{path}' already exists")));
        }
        self.pending.insert(path.clone(), (meta, texture));
        Ok(AssetHandle {
            package_path: path,
            name: name.to_string(),
        })
    }

    fn register_asset(&mut self, handle: &AssetHandle) -> Result<()> {
        let (meta, texture) = self
            .pending
            .get(&handle.package_path)
            .ok_or_else(|| unknown_asset(handle))?;
        if let Some(dir) = meta.parent() {
            fs::create_dir_all(dir)?;
        }
        if let Err(e) = Self::write_files(meta, texture) {
            log::warn!("failed to write texture asset {}: {e}", meta.display());
            Self::remove_partial(meta);
            return Err(e);
        }
        log::debug!("wrote texture asset {}", meta.display());
        self.pending.remove(&handle.package_path);
        Ok(())
    }
}
