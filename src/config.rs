//! Site configuration: the persisted, user-editable description of a site.

use crate::derived::Dependency;
use crate::patch::{Partial, set};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;
use unicode_normalization::UnicodeNormalization;

/// Domain every new site starts on.
pub const DEFAULT_DOMAIN: &str = ".sitefold.page";

/// The persisted description of a site.
///
/// `pages` sits behind an `Rc` so that snapshots sharing an untouched page
/// list share the allocation, and derived values keyed on the list can
/// compare it by pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub title: String,
    pub description: String,
    pub icon: Icon,
    pub subdomain: String,
    /// One of the validator's allowed domains, including the leading dot.
    pub domain: String,
    pub theme: Theme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_image: Option<String>,
    pub pages: Rc<Vec<Page>>,
}

/// Site icon: an emoji or a reference to an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Icon {
    Emoji(String),
    Image(String),
}

/// Color and background pattern settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub color: String,
    pub pattern: String,
    /// Opacity of the pattern, 0 to 100.
    pub pattern_intensity: u8,
}

/// One page of the site.
///
/// `path` is derived from the page's position and title; see
/// [`regenerate_paths`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub uuid: String,
    pub path: String,
    pub title: String,
    pub icon: String,
    pub on_nav: bool,
    /// Page content. Opaque to the store.
    #[serde(default)]
    pub elements: Vec<Value>,
}

impl Dependency for Page {
    fn unchanged(&self, previous: &Self) -> bool {
        self == previous
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            color: "#4f46e5".to_string(),
            pattern: "none".to_string(),
            pattern_intensity: 50,
        }
    }
}

impl Default for Config {
    /// The starter site used when no configuration was loaded: a single
    /// home page shown in the navigation.
    fn default() -> Self {
        Config {
            title: "My site".to_string(),
            description: String::new(),
            icon: Icon::Emoji("🌱".to_string()),
            subdomain: String::new(),
            domain: DEFAULT_DOMAIN.to_string(),
            theme: Theme::default(),
            header_image: None,
            pages: Rc::new(vec![Page {
                uuid: "home".to_string(),
                path: "/".to_string(),
                title: "Home".to_string(),
                icon: "🏠".to_string(),
                on_nav: true,
                elements: Vec::new(),
            }]),
        }
    }
}

impl Config {
    /// Find the page currently addressed by `path`.
    pub fn page_by_path(&self, path: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.path == path)
    }

    /// Find a page by its identifier.
    pub fn page(&self, uuid: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.uuid == uuid)
    }
}

/// Shallow partial of [`Config`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<Icon>,
    pub subdomain: Option<String>,
    pub domain: Option<String>,
    pub theme: Option<Theme>,
    pub header_image: Option<Option<String>>,
    pub pages: Option<Rc<Vec<Page>>>,
}

impl Partial<Config> for ConfigPatch {
    fn merge_into(self, target: &mut Config) {
        set(&mut target.title, self.title);
        set(&mut target.description, self.description);
        set(&mut target.icon, self.icon);
        set(&mut target.subdomain, self.subdomain);
        set(&mut target.domain, self.domain);
        set(&mut target.theme, self.theme);
        set(&mut target.header_image, self.header_image);
        set(&mut target.pages, self.pages);
    }
}

/// Shallow partial of [`Theme`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemePatch {
    pub color: Option<String>,
    pub pattern: Option<String>,
    pub pattern_intensity: Option<u8>,
}

impl Partial<Theme> for ThemePatch {
    fn merge_into(self, target: &mut Theme) {
        set(&mut target.color, self.color);
        set(&mut target.pattern, self.pattern);
        set(&mut target.pattern_intensity, self.pattern_intensity);
    }
}

/// Shallow partial of [`Page`]. The identifier cannot be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePatch {
    pub path: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub on_nav: Option<bool>,
    pub elements: Option<Vec<Value>>,
}

impl Partial<Page> for PagePatch {
    fn merge_into(self, target: &mut Page) {
        set(&mut target.path, self.path);
        set(&mut target.title, self.title);
        set(&mut target.icon, self.icon);
        set(&mut target.on_nav, self.on_nav);
        set(&mut target.elements, self.elements);
    }
}

/// Turn a page title into a URL slug.
///
/// Lowercases, strips accents, keeps ASCII letters, digits, spaces and
/// hyphens, then turns runs of spaces into a single hyphen.
///
/// # Examples
///
/// ```
/// use sitefold::slugify;
///
/// assert_eq!(slugify("About Us"), "about-us");
/// assert_eq!(slugify("Café  & Más"), "cafe-mas");
/// assert_eq!(slugify("a--b"), "a-b");
/// ```
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    for c in kept.chars() {
        let c = if c == ' ' { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug
}

/// The path a page gets at `index` with its current title.
pub fn page_path(index: usize, page: &Page) -> String {
    if index == 0 {
        "/".to_string()
    } else if page.title.is_empty() {
        format!("/{}", page.uuid)
    } else {
        format!("/{}", slugify(&page.title))
    }
}

/// Recompute every page path from position and title.
///
/// The first page is always `/`.
pub fn regenerate_paths(pages: Vec<Page>) -> Vec<Page> {
    pages
        .into_iter()
        .enumerate()
        .map(|(i, mut page)| {
            page.path = page_path(i, &page);
            page
        })
        .collect()
}
