use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::{error, trace};
use serde::{de::DeserializeOwned, Serialize};

use super::StorageError;

/// Key/value store: one `<key>.json` file per key under `root`.
#[derive(Debug, Clone)]
pub struct Backend {
    root: PathBuf,
}

impl Backend {
    pub fn new(path: &Path) -> Self {
        Self {
            root: path.to_path_buf(),
        }
    }

    pub fn init(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|e| {
            error!("create {:?}: {e:?}", self.root);
            e.into()
        })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// `Ok(None)` when the key was never written.
    pub fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key);
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("{key}: nothing stored at {path:?}");
                return Ok(None);
            }
            Err(e) => {
                error!("open \"{path:?}\": {e:?}");
                return Err(e.into());
            }
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            error!("read \"{path:?}\": {e:?}");
            StorageError::from(e)
        })?;

        Ok(Some(contents))
    }

    /// Overwrites the whole value.
    pub fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| {
                error!("couldn't open \"{path:?}\": {e:?}");
                StorageError::from(e)
            })?;

        file.write_all(value.as_bytes()).map_err(|e| {
            error!("writing \"{path:?}\": {e:?}");
            StorageError::from(e)
        })?;

        trace!("{key}: wrote {} bytes", value.len());
        Ok(())
    }

    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.read(key)? {
            Some(json) => serde_json::from_str(&json).map(Some).map_err(|e| {
                error!("couldn't parse stored {key}: {e:?}");
                e.into()
            }),
            None => Ok(None),
        }
    }

    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|e| {
            error!("couldn't convert {key} to json: {e:?}");
            StorageError::from(e)
        })?;

        self.write(key, &json)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::new(dir.path());

        assert!(backend.read("favorites").unwrap().is_none());
    }

    #[test]
    fn write_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::new(dir.path());

        backend.write("k", "a much longer first value").unwrap();
        backend.write("k", "short").unwrap();

        assert_eq!(backend.read("k").unwrap().as_deref(), Some("short"));
        assert_eq!(
            fs::read_to_string(dir.path().join("k.json")).unwrap(),
            "short"
        );
    }

    #[test]
    fn json_values() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::new(dir.path());

        backend.write_json("nums", &[1, 2, 3]).unwrap();
        let nums: Vec<i32> = backend.read_json("nums").unwrap().unwrap();
        assert_eq!(nums, [1, 2, 3]);

        backend.write("bad", "{not json").unwrap();
        let bad = backend.read_json::<Vec<i32>>("bad");
        assert!(matches!(bad, Err(StorageError::Json(_))));
    }

    #[test]
    fn init_creates_root_and_write_fails_without_it() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::new(&dir.path().join("nested").join("store"));

        assert!(matches!(backend.write("k", "v"), Err(StorageError::Io(_))));

        backend.init().unwrap();
        backend.write("k", "v").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
    }
}
