//! Named JSON document persistence.
//!
//! Documents live under `<root>/cfg/` and are addressed by keys of the form
//! `<module>/<name>.json`, so two modules can both own a `config.json` without
//! clobbering each other. Every save and load in the process goes through one
//! lock shared by all clones of a [`Store`], regardless of key.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::error::{BotError, Result};

const CFG_DIR: &str = "cfg";

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl Store {
    /// Create a store rooted at `root`. Nothing is touched on disk until the
    /// first save, which creates `<root>/cfg` (and `root` itself) if missing.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Where the document for `key` lives on disk.
    pub fn document_path(&self, key: &str) -> Result<PathBuf> {
        let mut path = self.root.join(CFG_DIR);
        for segment in split_key(key)? {
            path.push(segment);
        }
        Ok(path)
    }

    /// Serialize `value` as tab-indented JSON and write it under `key`,
    /// creating any missing directories along the way.
    ///
    /// The write truncates in place. A failure after truncation can leave a
    /// short file behind.
    pub async fn save<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let _guard = self.lock.lock().await;

        let segments = split_key(key).map_err(logged)?;
        let (file_name, dirs) = segments
            .split_last()
            .ok_or_else(|| logged(invalid_key(key, "key is empty")))?;

        let mut dir = self.root.join(CFG_DIR);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            logged(BotError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })
        })?;
        for segment in dirs {
            dir.push(segment);
            ensure_dir(&dir).await?;
        }
        let path = dir.join(file_name);

        let bytes = encode(value).map_err(|e| {
            logged(BotError::Encode {
                key: key.to_string(),
                source: e,
            })
        })?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|e| {
                logged(BotError::Open {
                    path: path.display().to_string(),
                    source: e,
                })
            })?;

        let write_err = |e| {
            logged(BotError::Write {
                path: path.display().to_string(),
                source: e,
            })
        };
        file.write_all(&bytes).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        debug!("Saved document '{}' ({} bytes)", key, bytes.len());
        Ok(())
    }

    /// Read and decode the document stored under `key`.
    pub async fn load<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let _guard = self.lock.lock().await;

        let path = self.document_path(key).map_err(logged)?;
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(logged(BotError::DocumentNotFound {
                    key: key.to_string(),
                    path: path.display().to_string(),
                }));
            }
            Err(e) => {
                return Err(logged(BotError::Open {
                    path: path.display().to_string(),
                    source: e,
                }));
            }
        };

        let value = serde_json::from_slice(&content).map_err(|e| {
            logged(BotError::Decode {
                path: path.display().to_string(),
                source: e,
            })
        })?;

        debug!("Loaded document '{}'", key);
        Ok(value)
    }

    /// Decode the document under `key` into `dest`. On error `dest` is left
    /// untouched.
    pub async fn load_into<T>(&self, key: &str, dest: &mut T) -> Result<()>
    where
        T: DeserializeOwned,
    {
        *dest = self.load(key).await?;
        Ok(())
    }

    /// Whether a document has been saved under `key`.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;

        let path = self.document_path(key).map_err(logged)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(logged(BotError::Stat {
                path: path.display().to_string(),
                source: e,
            })),
        }
    }
}

/// Split a document key into its path segments.
fn split_key(key: &str) -> Result<Vec<&str>> {
    if key.is_empty() {
        return Err(invalid_key(key, "key is empty"));
    }
    if key.starts_with('/') {
        return Err(invalid_key(key, "key must be relative"));
    }
    if key.contains('\\') {
        return Err(invalid_key(key, "use '/' as the path separator"));
    }

    let segments: Vec<&str> = key.split('/').collect();
    if segments.len() < 2 {
        return Err(invalid_key(key, "key must be of the form <module>/<name>"));
    }
    for segment in &segments {
        match *segment {
            "" => return Err(invalid_key(key, "empty path segment")),
            "." | ".." => return Err(invalid_key(key, "relative path segments are not allowed")),
            _ => {}
        }
    }
    Ok(segments)
}

fn invalid_key(key: &str, reason: &'static str) -> BotError {
    BotError::InvalidKey {
        key: key.to_string(),
        reason,
    }
}

/// Create `dir` unless it already exists.
async fn ensure_dir(dir: &Path) -> Result<()> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(logged(BotError::CreateDir {
            path: dir.display().to_string(),
            source: std::io::Error::new(ErrorKind::AlreadyExists, "exists and is not a directory"),
        })),
        Err(e) if e.kind() == ErrorKind::NotFound => match tokio::fs::create_dir(dir).await {
            Ok(()) => {
                debug!("Created directory {}", dir.display());
                Ok(())
            }
            // Another process got there first.
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(logged(BotError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })),
        },
        Err(e) => Err(logged(BotError::Stat {
            path: dir.display().to_string(),
            source: e,
        })),
    }
}

fn encode<T>(value: &T) -> serde_json::Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

fn logged(err: BotError) -> BotError {
    error!("{}", err);
    err
}
