//! Editor and public URLs.
//!
//! In editor addressing the page path and site id travel in an opaque
//! fragment token, `#!<token>`, where the token is the URL-safe base64 of a
//! small JSON object. In production addressing the page path is the URL.

use crate::backend::Location;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Path of the editor entry point.
pub const EDITOR_PATH: &str = "/editor";

/// What an editor fragment token carries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    pub path: String,
}

/// Encode `data` as a fragment token (without the `#!` prefix).
pub fn generate_hash(data: &HashData) -> String {
    // A struct of strings always serializes.
    let json = serde_json::to_vec(data).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode a fragment. Accepts `#!token`, `!token` or a bare token.
///
/// Returns `None` for anything that is not a token produced by
/// [`generate_hash`].
pub fn parse_hash(fragment: &str) -> Option<HashData> {
    let token = fragment.trim_start_matches('#').trim_start_matches('!');
    let bytes = URL_SAFE_NO_PAD.decode(token).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Editor URL opening `path` of `site_id`.
///
/// # Examples
///
/// ```
/// use sitefold::url::{editor_url, parse_hash};
///
/// let url = editor_url(Some("site-1"), "/about");
/// let (base, fragment) = url.split_once('#').unwrap();
/// assert_eq!(base, "/editor");
/// let data = parse_hash(fragment).unwrap();
/// assert_eq!(data.site_id.as_deref(), Some("site-1"));
/// assert_eq!(data.path, "/about");
/// ```
pub fn editor_url(site_id: Option<&str>, path: &str) -> String {
    let data = HashData {
        site_id: site_id.map(str::to_string),
        path: path.to_string(),
    };
    format!("{EDITOR_PATH}#!{}", generate_hash(&data))
}

/// Public URL of a page on a published site.
///
/// `domain` carries its leading dot, so `subdomain + domain` is the host.
pub fn page_url(subdomain: &str, domain: &str, path: &str) -> String {
    format!("https://{subdomain}{domain}{path}")
}

/// A [`Location`] that lives in memory and records every pushed URL.
///
/// Used when the editor runs without a real address bar.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    current: RefCell<String>,
    history: RefCell<Vec<String>>,
    title: RefCell<Option<String>>,
}

impl MemoryLocation {
    /// Start at `url`, which may carry a `#` fragment.
    pub fn new(url: impl Into<String>) -> Self {
        MemoryLocation {
            current: RefCell::new(url.into()),
            history: RefCell::new(Vec::new()),
            title: RefCell::new(None),
        }
    }

    /// The current URL.
    pub fn current(&self) -> String {
        self.current.borrow().clone()
    }

    /// Every URL pushed so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    /// The last window title set, if any.
    pub fn title(&self) -> Option<String> {
        self.title.borrow().clone()
    }
}

impl Location for MemoryLocation {
    fn pathname(&self) -> String {
        let current = self.current.borrow();
        let path = current.split('#').next().unwrap_or_default();
        if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        }
    }

    fn fragment(&self) -> Option<String> {
        self.current
            .borrow()
            .split_once('#')
            .map(|(_, fragment)| fragment.to_string())
    }

    fn push(&self, url: &str) {
        *self.current.borrow_mut() = url.to_string();
        self.history.borrow_mut().push(url.to_string());
    }

    fn set_title(&self, title: &str) {
        *self.title.borrow_mut() = Some(title.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_hash("#!not base64 at all"), None);
        assert_eq!(parse_hash(&URL_SAFE_NO_PAD.encode("[1,2]")), None);
        assert_eq!(parse_hash(""), None);
    }

    #[test]
    fn parse_accepts_all_prefixes() {
        let token = generate_hash(&HashData {
            site_id: None,
            path: "/x".into(),
        });
        for fragment in [format!("#!{token}"), format!("!{token}"), token.clone()] {
            assert_eq!(parse_hash(&fragment).unwrap().path, "/x");
        }
    }

    #[test]
    fn page_url_joins_host_and_path() {
        assert_eq!(
            page_url("bakery", ".sitefold.page", "/menu"),
            "https://bakery.sitefold.page/menu"
        );
    }

    #[test]
    fn memory_location_splits_fragment() {
        let location = MemoryLocation::new("/editor#!abc");
        assert_eq!(location.pathname(), "/editor");
        assert_eq!(location.fragment().as_deref(), Some("!abc"));

        location.push("/about");
        assert_eq!(location.pathname(), "/about");
        assert_eq!(location.fragment(), None);
        assert_eq!(location.history(), vec!["/about".to_string()]);
    }
}
