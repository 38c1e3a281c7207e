use crate::patch::{Partial, Patch};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A callback invoked with the new snapshot after every patch.
pub type Listener<S> = Box<dyn Fn(&Rc<S>)>;

/// Holds the current immutable snapshot of a state `S`.
///
/// Every [`patch`](StateContainer::patch) clones the current snapshot,
/// merges the resolved partial into the clone, and swaps the new `Rc` in.
/// Snapshots handed out earlier are never mutated, so a reader always sees
/// either the state before a patch or the fully merged state after it.
///
/// The container is single-threaded: it uses `RefCell`/`Cell` and is
/// neither `Send` nor `Sync`.
///
/// # Examples
///
/// ```
/// use sitefold::{Patch, StateContainer, StoreInit, StorePatch, StoreState};
///
/// let container = StateContainer::new(StoreState::new(&StoreInit::default()));
/// let before = container.snapshot();
///
/// container.patch(Patch::partial(StorePatch {
///     editing: Some(true),
///     ..Default::default()
/// }));
///
/// assert!(!before.editing);
/// assert!(container.snapshot().editing);
/// assert_eq!(container.version(), 1);
/// ```
pub struct StateContainer<S> {
    current: RefCell<Rc<S>>,
    version: Cell<u64>,
    listeners: RefCell<Vec<Listener<S>>>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for StateContainer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateContainer")
            .field("current", &self.current.borrow())
            .field("version", &self.version.get())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl<S: Clone> StateContainer<S> {
    /// Create a container holding `initial` at version 0.
    pub fn new(initial: S) -> Self {
        StateContainer {
            current: RefCell::new(Rc::new(initial)),
            version: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Return the current snapshot.
    ///
    /// Cheap: clones the `Rc`, not the state.
    pub fn snapshot(&self) -> Rc<S> {
        Rc::clone(&self.current.borrow())
    }

    /// Number of patches applied since creation.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Resolve `patch` against the current snapshot and install the merged
    /// result as the new snapshot, then notify listeners.
    ///
    /// Updater functions run before the swap and see the pre-patch state.
    /// They must not patch the same container themselves.
    ///
    /// If a listener patches the container, the nested patch notifies every
    /// listener with its newer snapshot and this round stops there, so no
    /// listener is handed a snapshot that has already been replaced.
    pub fn patch<P: Partial<S>>(&self, patch: Patch<S, P>) -> Rc<S> {
        let current = self.snapshot();
        let next = Rc::new(patch.apply(&current));
        *self.current.borrow_mut() = Rc::clone(&next);
        let version = self.version.get() + 1;
        self.version.set(version);

        for listener in self.listeners.borrow().iter() {
            if self.version.get() != version {
                log::trace!("patch {version} superseded during notification");
                break;
            }
            listener(&next);
        }
        next
    }

    /// Register a listener called with each new snapshot.
    ///
    /// Listeners may read the container or patch it again, but must not
    /// subscribe further listeners from inside the callback.
    pub fn subscribe(&self, listener: impl Fn(&Rc<S>) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }
}
