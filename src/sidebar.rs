use crate::backend::DeviceStorage;
use std::rc::Rc;

/// Storage key of the collapsed-mode preference.
pub const SIDEBAR_COLLAPSED_KEY: &str = "SIDEBAR_COLLAPSED_MODE";

/// Viewports narrower than this always start collapsed.
pub const NARROW_VIEWPORT_WIDTH: u32 = 768;

/// Editor sidebar state.
///
/// In collapsed mode the sidebar is hidden until it is popped in (hover or
/// tap), and hidden again when popped out. The collapsed-mode preference is
/// written to the injected storage on every change; pop-in state is not
/// persisted.
pub struct Sidebar {
    storage: Rc<dyn DeviceStorage>,
    collapsed: bool,
    popped_in: bool,
}

impl std::fmt::Debug for Sidebar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sidebar")
            .field("collapsed", &self.collapsed)
            .field("popped_in", &self.popped_in)
            .finish()
    }
}

impl Sidebar {
    /// Restore the sidebar for a viewport `viewport_width` pixels wide.
    ///
    /// Narrow viewports start collapsed regardless of the stored
    /// preference.
    pub fn new(storage: Rc<dyn DeviceStorage>, viewport_width: u32) -> Self {
        let stored = match storage.get(SIDEBAR_COLLAPSED_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                log::warn!("could not read sidebar preference: {e}");
                false
            }
        };
        let sidebar = Sidebar {
            storage,
            collapsed: viewport_width < NARROW_VIEWPORT_WIDTH || stored,
            popped_in: false,
        };
        sidebar.persist();
        sidebar
    }

    /// The user's collapse preference, or forced by a narrow viewport.
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// A collapsed sidebar is shown temporarily.
    pub fn is_popped_in(&self) -> bool {
        self.popped_in
    }

    /// The sidebar is out of view: collapsed and not popped in.
    pub fn is_hidden(&self) -> bool {
        self.collapsed && !self.popped_in
    }

    /// Collapse or expand, and store the choice. Expanding ends a pop-in.
    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
        if !collapsed {
            self.popped_in = false;
        }
        self.persist();
    }

    /// Flip [`is_collapsed`](Sidebar::is_collapsed).
    pub fn toggle_collapsed(&mut self) {
        self.set_collapsed(!self.collapsed);
    }

    /// Show a collapsed sidebar temporarily.
    pub fn pop_in(&mut self) {
        self.popped_in = self.collapsed;
    }

    /// Hide a popped-in sidebar again.
    pub fn pop_out(&mut self) {
        self.popped_in = false;
    }

    /// Tap handler on touch devices.
    pub fn toggle_pop_in(&mut self) {
        if self.popped_in {
            self.pop_out();
        } else {
            self.pop_in();
        }
    }

    fn persist(&self) {
        let value = if self.collapsed { "true" } else { "false" };
        if let Err(e) = self.storage.set(SIDEBAR_COLLAPSED_KEY, value) {
            log::warn!("could not store sidebar preference: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn wide_viewport_uses_stored_preference() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set(SIDEBAR_COLLAPSED_KEY, "true").unwrap();
        assert!(Sidebar::new(storage.clone(), 1280).is_collapsed());

        storage.set(SIDEBAR_COLLAPSED_KEY, "false").unwrap();
        assert!(!Sidebar::new(storage, 1280).is_collapsed());
    }

    #[test]
    fn narrow_viewport_starts_collapsed() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set(SIDEBAR_COLLAPSED_KEY, "false").unwrap();
        let sidebar = Sidebar::new(storage.clone(), 400);
        assert!(sidebar.is_collapsed());
        assert_eq!(
            storage.get(SIDEBAR_COLLAPSED_KEY).unwrap().as_deref(),
            Some("true")
        );
    }

    #[test]
    fn toggle_persists() {
        let storage = Rc::new(MemoryStorage::new());
        let mut sidebar = Sidebar::new(storage.clone(), 1280);
        assert!(!sidebar.is_collapsed());

        sidebar.toggle_collapsed();
        assert_eq!(
            storage.get(SIDEBAR_COLLAPSED_KEY).unwrap().as_deref(),
            Some("true")
        );
    }

    #[test]
    fn pop_in_only_matters_when_collapsed() {
        let storage = Rc::new(MemoryStorage::new());
        let mut sidebar = Sidebar::new(storage, 1280);
        sidebar.pop_in();
        assert!(!sidebar.is_popped_in());

        sidebar.set_collapsed(true);
        assert!(sidebar.is_hidden());
        sidebar.toggle_pop_in();
        assert!(!sidebar.is_hidden());
        sidebar.toggle_pop_in();
        assert!(sidebar.is_hidden());
    }
}
