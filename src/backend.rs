//! Collaborators the editor talks to.
//!
//! None of these report failure through `Err`: a failed call is `None`,
//! `false` or a non-empty error list, and the editor turns that into state
//! flags the UI can render.

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One structured validation failure, from the schema validator or the
/// server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{path}: {message}")]
pub struct ValidationError {
    /// JSON-pointer-like location of the offending value, `""` for the root.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A static page artifact produced by pre-rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerenderedPage {
    pub path: String,
    pub html: String,
}

/// Server-side persistence and authentication.
#[async_trait(?Send)]
pub trait Backend {
    /// Fetch the raw stored configuration of a site. `None` on any failure.
    async fn load_config(&self, site_id: &str, token: &str) -> Option<Value>;

    /// Store `config`. An empty list means the server accepted it.
    async fn save_config(
        &self,
        site_id: &str,
        config: &Config,
        token: Option<&str>,
    ) -> Vec<ValidationError>;

    /// Publish pre-rendered pages. `true` on success.
    async fn deploy(
        &self,
        site_id: &str,
        config: &Config,
        pages: &[PrerenderedPage],
        token: Option<&str>,
    ) -> bool;

    /// Exchange a plain access key for a session token.
    async fn token_from_access_key(&self, site_id: &str, access_key: &str) -> Option<String>;
}

/// Turns a configuration into static page artifacts.
#[async_trait(?Send)]
pub trait Prerenderer {
    /// `None` signals that pre-rendering failed.
    async fn prerender(&self, site_id: &str, config: &Config) -> Option<Vec<PrerenderedPage>>;
}

/// Accepts or rejects a configuration received from the server before it
/// enters the store.
pub trait ConfigValidator {
    fn validate(&self, raw: &Value) -> bool;
}

/// Synchronous key-value storage on the device (tokens, UI preferences).
pub trait DeviceStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    /// Replace the value of `key` with what `f` returns for the current one.
    /// Returning `None` removes the key.
    ///
    /// The default reads and writes in two calls. Storage shared between
    /// processes overrides it to hold its lock across both.
    fn modify(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<Option<String>>,
    ) -> Result<()> {
        match f(self.get(key)?)? {
            Some(value) => self.set(key, &value),
            None => self.remove(key),
        }
    }
}

/// The user-visible location (address bar).
pub trait Location {
    /// Current path, without fragment.
    fn pathname(&self) -> String;
    /// Current fragment, without the leading `#`. `None` when absent.
    fn fragment(&self) -> Option<String>;
    /// Push a new history entry.
    fn push(&self, url: &str);
    /// Show `title` as the window title.
    fn set_title(&self, title: &str);
}
