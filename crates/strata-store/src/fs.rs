//! File-backed layer storage over a configuration directory.

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use strata_tree::Layer;
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, trace};

use crate::codec::{parse_layer, render_layer};
use crate::error::{ConfigError, Result};
use crate::traits::LayerStore;

/// Stores each layer as a JSON file inside one directory.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a crash mid-write leaves the previous file intact.
#[derive(Clone, Debug)]
pub struct FileLayerStore {
    directory: PathBuf,
}

impl FileLayerStore {
    /// Use `directory` as the configuration directory without validating it.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Derive the configuration directory from a user-supplied path.
    ///
    /// An existing directory is used as-is. Any other existing path selects
    /// its containing directory, which lets a module pass its own source path.
    /// Anything else is rejected with [`ConfigError::InvalidPath`].
    pub fn locate(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Ok(Self::new(path));
        }
        if path.exists() {
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            return Ok(Self::new(parent));
        }
        Err(ConfigError::InvalidPath {
            path: path.to_path_buf(),
        })
    }

    /// Full path of the resource called `name`.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }
}

// A fresh temp file gets the mode a plain create would (0666 less the
// umask) rather than tempfile's private 0600.
fn temp_file_in(directory: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(directory)
}

impl LayerStore for FileLayerStore {
    fn read(&self, name: &str) -> Result<Option<Layer>> {
        let path = self.path_of(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!(path = %path.display(), "layer file absent");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let layer = parse_layer(&path.display().to_string(), &bytes)?;
        debug!(path = %path.display(), keys = layer.len(), "read layer file");
        Ok(Some(layer))
    }

    fn write(&self, name: &str, layer: &Layer) -> Result<()> {
        let path = self.path_of(name);
        let bytes = render_layer(layer)?;

        let mut tmp = temp_file_in(&self.directory)?;
        match fs::metadata(&path) {
            Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(path = %path.display(), bytes = bytes.len(), "wrote layer file");
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path_of(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed layer file");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.path_of(name).try_exists()?)
    }

    fn directory(&self) -> Option<&Path> {
        Some(&self.directory)
    }

    fn describe(&self, name: &str) -> String {
        self.path_of(name).display().to_string()
    }
}
