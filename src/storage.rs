//! Device storage: session tokens and UI preferences.

use crate::backend::DeviceStorage;
use crate::error::Result;
use fs2::FileExt;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Key of the member session token.
pub const MEMBER_TOKEN_KEY: &str = "MEMBER_TOKEN";

/// Key of the JSON object mapping site ids to access-key tokens.
pub const ACCESS_KEY_TOKENS_KEY: &str = "ACCESS_KEY_TOKENS";

/// In-memory storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl DeviceStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object file.
///
/// Writes go to a `.tmp` file first, are synced, then renamed over the
/// real file, so a crash mid-write leaves the previous contents intact.
/// Read-modify-write cycles hold an exclusive lock on a `.lock` sidecar
/// so two processes sharing the file do not lose each other's keys.
///
/// ```text
/// $ cat storage.json
/// {
///   "MEMBER_TOKEN": "eyJhbGciOi...",
///   "SIDEBAR_COLLAPSED_MODE": "true"
/// }
/// ```
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStorage {
    /// Use the file at `path`, creating its parent directory if needed.
    ///
    /// The file itself is created on the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let lock_path = path.with_extension("lock");
        Ok(FileStorage { path, lock_path })
    }

    /// Returns the path of the storage file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(values)?;

        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_data()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> Result<()>) -> Result<()> {
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        lock.lock_exclusive()?;

        let result = self.load().and_then(|mut values| {
            f(&mut values)?;
            self.save(&values)
        });

        lock.unlock()?;
        result
    }
}

impl DeviceStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|values| {
            values.remove(key);
            Ok(())
        })
    }

    fn modify(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<Option<String>>,
    ) -> Result<()> {
        self.update(|values| {
            if let Some(value) = f(values.remove(key))? {
                values.insert(key.to_string(), value);
            }
            Ok(())
        })
    }
}

/// The stored member session token, if any.
pub fn member_token(storage: &dyn DeviceStorage) -> Result<Option<String>> {
    storage.get(MEMBER_TOKEN_KEY)
}

/// Store the member session token.
pub fn set_member_token(storage: &dyn DeviceStorage, token: &str) -> Result<()> {
    storage.set(MEMBER_TOKEN_KEY, token)
}

/// Forget the member session token.
pub fn remove_member_token(storage: &dyn DeviceStorage) -> Result<()> {
    storage.remove(MEMBER_TOKEN_KEY)
}

fn parse_access_key_tokens(raw: Option<String>) -> Result<BTreeMap<String, String>> {
    match raw {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(BTreeMap::new()),
    }
}

/// The access-key token stored for `site_id`, if any.
///
/// Sites without an id never have one.
pub fn access_key_token(storage: &dyn DeviceStorage, site_id: Option<&str>) -> Result<Option<String>> {
    let Some(site_id) = site_id else {
        return Ok(None);
    };
    Ok(parse_access_key_tokens(storage.get(ACCESS_KEY_TOKENS_KEY)?)?.remove(site_id))
}

/// Remember the access-key token of `site_id`.
///
/// Tokens of other sites are kept; the map is rewritten in one
/// [`DeviceStorage::modify`].
pub fn set_access_key_token(storage: &dyn DeviceStorage, site_id: &str, token: &str) -> Result<()> {
    storage.modify(ACCESS_KEY_TOKENS_KEY, &mut |raw| {
        let mut tokens = parse_access_key_tokens(raw)?;
        tokens.insert(site_id.to_string(), token.to_string());
        Ok(Some(serde_json::to_string(&tokens)?))
    })
}
