//! Page operations on the edited configuration.

use crate::config::{Config, ConfigPatch, Page, PagePatch, regenerate_paths};
use crate::editor::Editor;
use crate::patch::{Partial, Patch};
use std::rc::Rc;

/// Where [`Pages::move_to`] puts a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTarget {
    /// Insert right after this page. `None`, or an id that matches no
    /// page, inserts at the head of the sequence.
    pub uuid: Option<String>,
    /// The moved page's new `on_nav` flag.
    pub nav: bool,
}

impl MoveTarget {
    /// Place the page right after `uuid`.
    pub fn after(uuid: impl Into<String>, nav: bool) -> Self {
        MoveTarget {
            uuid: Some(uuid.into()),
            nav,
        }
    }

    /// Place the page first, making it the root page.
    pub fn head(nav: bool) -> Self {
        MoveTarget { uuid: None, nav }
    }
}

/// Move the page `uuid` within `pages`.
///
/// Returns `None` if no page has that id. Paths are not touched.
pub fn move_page(pages: &[Page], uuid: &str, target: &MoveTarget) -> Option<Vec<Page>> {
    let mut page = pages.iter().find(|page| page.uuid == uuid)?.clone();
    page.on_nav = target.nav;

    let mut rest: Vec<Page> = pages
        .iter()
        .filter(|page| page.uuid != uuid)
        .cloned()
        .collect();

    let index = target
        .uuid
        .as_deref()
        .and_then(|target| rest.iter().position(|page| page.uuid == target))
        .map_or(0, |i| i + 1);
    rest.insert(index, page);
    Some(rest)
}

/// Page operations of an [`Editor`], from [`Editor::pages`].
#[derive(Debug, Clone, Copy)]
pub struct Pages<'a> {
    editor: &'a Editor,
}

impl Editor {
    /// Page operations on the edited configuration.
    pub fn pages(&self) -> Pages<'_> {
        Pages { editor: self }
    }

    /// Replace the page sequence with `f(current pages)`, optionally
    /// regenerating every path.
    fn set_pages(&self, f: impl FnOnce(&[Page]) -> Vec<Page> + 'static, regenerate: bool) {
        self.patch_config(Patch::update(move |config: &Config| {
            let pages = f(&config.pages);
            let pages = if regenerate {
                regenerate_paths(pages)
            } else {
                pages
            };
            ConfigPatch {
                pages: Some(Rc::new(pages)),
                ..Default::default()
            }
        }));
    }
}

impl Pages<'_> {
    /// Append an empty page hidden from the navigation.
    ///
    /// The new page is addressed by its identifier. Existing paths are
    /// left alone. Returns the new identifier.
    pub fn add(&self) -> String {
        let uuid = uuid::Uuid::new_v4().to_string();
        let page = Page {
            path: format!("/{uuid}"),
            uuid: uuid.clone(),
            title: String::new(),
            icon: String::new(),
            on_nav: false,
            elements: Vec::new(),
        };
        self.editor.set_pages(
            move |pages| {
                let mut pages = pages.to_vec();
                pages.push(page);
                pages
            },
            false,
        );
        uuid
    }

    /// Merge `patch` into the page `uuid`.
    ///
    /// Paths are regenerated only when the patch sets a title. Returns
    /// whether the page exists.
    pub fn patch(&self, uuid: &str, patch: PagePatch) -> bool {
        if self.editor.snapshot().config.page(uuid).is_none() {
            log::warn!("patch of unknown page {uuid} ignored");
            return false;
        }

        let regenerate = patch.title.is_some();
        let uuid = uuid.to_string();
        self.editor.set_pages(
            move |pages| {
                let mut pages = pages.to_vec();
                if let Some(page) = pages.iter_mut().find(|page| page.uuid == uuid) {
                    patch.merge_into(page);
                }
                pages
            },
            regenerate,
        );
        true
    }

    /// Move the page `uuid` after `target.uuid` (or to the head) and set
    /// its navigation flag. Paths are always regenerated.
    ///
    /// Moving an unknown page is a no-op. Returns whether the page exists.
    pub fn move_to(&self, uuid: &str, target: MoveTarget) -> bool {
        let Some(pages) = move_page(&self.editor.snapshot().config.pages, uuid, &target) else {
            log::warn!("move of unknown page {uuid} ignored");
            return false;
        };
        self.editor.set_pages(move |_| pages, true);
        true
    }

    /// Delete the page `uuid`. Paths are regenerated.
    ///
    /// Returns whether a page was deleted.
    pub fn remove(&self, uuid: &str) -> bool {
        let existed = self.editor.snapshot().config.page(uuid).is_some();
        let uuid = uuid.to_string();
        self.editor.set_pages(
            move |pages| {
                pages
                    .iter()
                    .filter(|page| page.uuid != uuid)
                    .cloned()
                    .collect()
            },
            true,
        );
        existed
    }
}
