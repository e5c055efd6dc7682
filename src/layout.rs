//! Paths inside a source directory and normalization of the sparse reconstruction folder.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

/// Name of the folder every sparse model ends up in.
pub const CANONICAL_MODEL: &str = "0";

/// Paths read and written by the pipeline, all relative to the source directory.
#[derive(Debug, Clone)]
pub struct SourceLayout {
    root: PathBuf,
}

impl SourceLayout {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        SourceLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Original, distorted photos.
    pub fn input(&self) -> PathBuf {
        self.root.join("input")
    }

    pub fn distorted(&self) -> PathBuf {
        self.root.join("distorted")
    }

    pub fn database(&self) -> PathBuf {
        self.distorted().join("database.db")
    }

    pub fn distorted_sparse(&self) -> PathBuf {
        self.distorted().join("sparse")
    }

    /// The mapper's first model, which is the one that gets undistorted.
    pub fn distorted_model(&self) -> PathBuf {
        self.distorted_sparse().join(CANONICAL_MODEL)
    }

    /// Undistorted images written by the undistorter.
    pub fn images(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn sparse(&self) -> PathBuf {
        self.root.join("sparse")
    }

    /// Directory for a downscaled copy of [`SourceLayout::images`].
    pub fn scaled_images(&self, folder: &str) -> PathBuf {
        self.root.join(folder)
    }
}

/// Move every entry of `sparse` except the canonical one into `sparse/0`, creating it if needed.
/// Returns the names that were moved.
pub fn normalize_sparse(sparse: &Path) -> Result<Vec<String>, std::io::Error> {
    let canonical = sparse.join(CANONICAL_MODEL);
    fs::create_dir_all(&canonical)?;

    let mut names = fs::read_dir(sparse)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<Result<Vec<_>, _>>()?;
    names.retain(|name| name != CANONICAL_MODEL);
    names.sort();

    let mut moved = Vec::with_capacity(names.len());
    for name in names {
        let from = sparse.join(&name);
        let to = canonical.join(&name);
        debug!("moving {} to {}", from.display(), to.display());
        fs::rename(&from, &to)?;
        moved.push(name.to_string_lossy().into_owned());
    }
    Ok(moved)
}
