//! Image Store: file names mapped to bytes across two pools.
//!
//! ```text
//! <root>/
//! ├── config.toml        # optional, see [`crate::config`]
//! ├── originals/         # uploaded, unmodified images
//! └── edited/            # derived artifacts written by the edit pipeline
//! ```
//!
//! Lookups search the derived pool first and fall back to originals, so a
//! name that exists in both resolves to the derived file. Derived files are
//! created with create-if-absent semantics and are never overwritten.
//!
//! The [`ImageStore`] trait is the seam the pipeline and the analysis engine
//! depend on; [`FsImageStore`] is the production implementation.

use crate::config::StoreConfig;
use crate::error::Error;
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found in any pool")]
    NotFound(String),
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
    #[error("{0} already exists in the derived pool")]
    AlreadyExists(String),
    #[error("IO error reading {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error writing {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) => Error::NotFound(name),
            StoreError::InvalidName(name) => {
                Error::invalid_parameter("name", format!("{name:?} is not a bare file name"))
            }
            StoreError::AlreadyExists(name) => Error::StorageWrite {
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("{name} already exists"),
                ),
                name,
            },
            StoreError::Read { name, source } => Error::StorageRead { name, source },
            StoreError::Write { name, source } => Error::StorageWrite { name, source },
        }
    }
}

/// Which pool a file lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Originals,
    Derived,
}

/// Storage contract consumed by the edit pipeline and the analysis engine.
///
/// `Sync` so one store can be shared by rayon workers during batch analysis.
pub trait ImageStore: Sync {
    /// Read the bytes for `name`, searching the derived pool before originals.
    fn resolve(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Names of the regular files in the originals pool (non-recursive).
    fn list_originals(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Names of the regular files in the derived pool (non-recursive).
    fn list_derived(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Persist a derived artifact under `name`. Fails if the name is taken.
    fn put_derived(&self, bytes: &[u8], name: &str) -> Result<String, StoreError>;

    /// Persist an uploaded original under `name`, replacing any previous upload.
    fn put_original(&self, bytes: &[u8], name: &str) -> Result<String, StoreError>;
}

/// Reject anything that isn't a single, plain path component.
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
    if plain {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

/// Filesystem-backed store rooted at a directory with one subdirectory per pool.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    originals: PathBuf,
    derived: PathBuf,
}

impl FsImageStore {
    /// Open (and create if missing) the pool directories under `root`.
    pub fn open(root: &Path, config: &StoreConfig) -> Result<Self, StoreError> {
        let store = Self {
            originals: root.join(&config.originals),
            derived: root.join(&config.derived),
        };
        for dir in [&store.originals, &store.derived] {
            fs::create_dir_all(dir).map_err(|source| StoreError::Write {
                name: dir.display().to_string(),
                source,
            })?;
        }
        debug!(
            originals = %store.originals.display(),
            derived = %store.derived.display(),
            "opened image store"
        );
        Ok(store)
    }

    pub fn pool_dir(&self, pool: Pool) -> &Path {
        match pool {
            Pool::Originals => &self.originals,
            Pool::Derived => &self.derived,
        }
    }

    /// On-disk path for `name`, using the same derived-first rule as `resolve`.
    pub fn locate(&self, name: &str) -> Result<(Pool, PathBuf), StoreError> {
        validate_name(name)?;
        for pool in [Pool::Derived, Pool::Originals] {
            let path = self.pool_dir(pool).join(name);
            if path.is_file() {
                return Ok((pool, path));
            }
        }
        Err(StoreError::NotFound(name.to_string()))
    }

    fn list_pool(&self, pool: Pool) -> Result<BTreeSet<String>, StoreError> {
        let dir = self.pool_dir(pool);
        let mut names = BTreeSet::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| StoreError::Read {
                name: dir.display().to_string(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => {
                    names.insert(name.to_string());
                }
                None => warn!("Skipping non-UTF-8 file name: {}", entry.path().display()),
            }
        }
        Ok(names)
    }
}

impl ImageStore for FsImageStore {
    fn resolve(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let (pool, path) = self.locate(name).inspect_err(|_| {
            debug!(name, "resolve miss");
        })?;
        debug!(name, ?pool, "resolve hit");
        fs::read(&path).map_err(|source| StoreError::Read {
            name: name.to_string(),
            source,
        })
    }

    fn list_originals(&self) -> Result<BTreeSet<String>, StoreError> {
        self.list_pool(Pool::Originals)
    }

    fn list_derived(&self) -> Result<BTreeSet<String>, StoreError> {
        self.list_pool(Pool::Derived)
    }

    fn put_derived(&self, bytes: &[u8], name: &str) -> Result<String, StoreError> {
        validate_name(name)?;
        let path = self.derived.join(name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::AlreadyExists {
                    StoreError::AlreadyExists(name.to_string())
                } else {
                    StoreError::Write {
                        name: name.to_string(),
                        source,
                    }
                }
            })?;

        // Remove the half-written file so a failed write leaves no artifact behind.
        if let Err(source) = file.write_all(bytes).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(StoreError::Write {
                name: name.to_string(),
                source,
            });
        }

        debug!(name, bytes = bytes.len(), "wrote derived artifact");
        Ok(name.to_string())
    }

    fn put_original(&self, bytes: &[u8], name: &str) -> Result<String, StoreError> {
        validate_name(name)?;
        fs::write(self.originals.join(name), bytes).map_err(|source| StoreError::Write {
            name: name.to_string(),
            source,
        })?;
        debug!(name, bytes = bytes.len(), "stored original");
        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, FsImageStore) {
        let tmp = TempDir::new().unwrap();
        let store = FsImageStore::open(tmp.path(), &StoreConfig::default()).unwrap();
        (tmp, store)
    }

    #[test]
    fn open_creates_pool_directories() {
        let (tmp, _store) = open_store();
        assert!(tmp.path().join("originals").is_dir());
        assert!(tmp.path().join("edited").is_dir());
    }

    #[test]
    fn resolve_prefers_derived_pool() {
        let (_tmp, store) = open_store();
        store.put_original(b"original", "a.png").unwrap();
        store.put_derived(b"derived", "a.png").unwrap();
        assert_eq!(store.resolve("a.png").unwrap(), b"derived");
    }

    #[test]
    fn resolve_falls_back_to_originals() {
        let (_tmp, store) = open_store();
        store.put_original(b"original", "a.png").unwrap();
        assert_eq!(store.resolve("a.png").unwrap(), b"original");
    }

    #[test]
    fn resolve_missing_is_not_found() {
        let (_tmp, store) = open_store();
        assert!(matches!(
            store.resolve("nope.png"),
            Err(StoreError::NotFound(n)) if n == "nope.png"
        ));
    }

    #[test]
    fn resolve_ignores_directories_with_matching_name() {
        let (_tmp, store) = open_store();
        fs::create_dir(store.pool_dir(Pool::Derived).join("a.png")).unwrap();
        store.put_original(b"original", "a.png").unwrap();
        assert_eq!(store.resolve("a.png").unwrap(), b"original");
    }

    #[test]
    fn list_originals_only_regular_files_non_recursive() {
        let (_tmp, store) = open_store();
        store.put_original(b"x", "b.jpg").unwrap();
        store.put_original(b"x", "a.jpg").unwrap();
        store.put_derived(b"x", "c_edited_1.png").unwrap();
        let nested = store.pool_dir(Pool::Originals).join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("deep.jpg"), b"x").unwrap();

        let names: Vec<String> = store.list_originals().unwrap().into_iter().collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn put_derived_never_overwrites() {
        let (_tmp, store) = open_store();
        store.put_derived(b"first", "a_edited_1.png").unwrap();
        let err = store.put_derived(b"second", "a_edited_1.png").unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(store.resolve("a_edited_1.png").unwrap(), b"first");
        assert_eq!(Error::from(err).kind(), ErrorKind::StorageWrite);
    }

    #[test]
    fn put_original_replaces_previous_upload() {
        let (_tmp, store) = open_store();
        store.put_original(b"v1", "a.jpg").unwrap();
        store.put_original(b"v2", "a.jpg").unwrap();
        assert_eq!(store.resolve("a.jpg").unwrap(), b"v2");
    }

    #[test]
    fn path_traversal_names_rejected() {
        let (_tmp, store) = open_store();
        for bad in ["", ".", "..", "../a.png", "a/b.png", "a\\b.png"] {
            assert!(
                matches!(store.resolve(bad), Err(StoreError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
            assert!(store.put_derived(b"x", bad).is_err());
            assert!(store.put_original(b"x", bad).is_err());
        }
    }

    #[test]
    fn locate_reports_pool() {
        let (_tmp, store) = open_store();
        store.put_original(b"x", "a.jpg").unwrap();
        let (pool, path) = store.locate("a.jpg").unwrap();
        assert_eq!(pool, Pool::Originals);
        assert!(path.ends_with("originals/a.jpg"));
    }

    #[test]
    fn store_errors_map_to_taxonomy() {
        assert_eq!(
            Error::from(StoreError::NotFound("a".into())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::from(StoreError::InvalidName("..".into())).kind(),
            ErrorKind::InvalidParameter
        );
        assert_eq!(
            Error::from(StoreError::Read {
                name: "a".into(),
                source: std::io::Error::other("denied"),
            })
            .kind(),
            ErrorKind::StorageRead
        );
    }
}
