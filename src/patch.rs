/// A partial value that can be shallow-merged into a full `S`.
///
/// Implementors are plain structs of `Option` fields, one per top-level
/// field of `S`. `Some` replaces the whole field, `None` leaves it untouched.
/// Nothing is merged below the top level: patching a nested struct replaces
/// it wholesale.
///
/// # Examples
///
/// ```
/// use sitefold::Partial;
///
/// #[derive(Clone, Default)]
/// struct Counter {
///     count: u32,
///     label: String,
/// }
///
/// #[derive(Default)]
/// struct CounterPatch {
///     count: Option<u32>,
///     label: Option<String>,
/// }
///
/// impl Partial<Counter> for CounterPatch {
///     fn merge_into(self, target: &mut Counter) {
///         if let Some(count) = self.count {
///             target.count = count;
///         }
///         if let Some(label) = self.label {
///             target.label = label;
///         }
///     }
/// }
///
/// let mut counter = Counter { count: 1, label: "clicks".into() };
/// CounterPatch { count: Some(2), ..Default::default() }.merge_into(&mut counter);
/// assert_eq!(counter.count, 2);
/// assert_eq!(counter.label, "clicks");
/// ```
pub trait Partial<S> {
    /// Overwrite every field of `target` that this partial sets.
    fn merge_into(self, target: &mut S);
}

/// Writes `value` into `slot` when present.
///
/// Helper for hand-written [`Partial`] impls.
pub(crate) fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// An updater computed from the current state.
pub type UpdateFn<S, P> = Box<dyn FnOnce(&S) -> P>;

/// A pending change to a state of type `S`.
///
/// Either a ready-made partial, or an updater that receives the current
/// state and returns the partial to merge. Both forms are resolved to a
/// partial by [`Patch::resolve`] before anything is merged, so the
/// container treats them identically.
///
/// # Examples
///
/// ```
/// use sitefold::{Patch, StorePatch, StoreState, StoreInit};
///
/// let state = StoreState::new(&StoreInit::default());
///
/// let direct: Patch<StoreState, StorePatch> = Patch::partial(StorePatch {
///     editing: Some(true),
///     ..Default::default()
/// });
/// assert_eq!(direct.resolve(&state).editing, Some(true));
///
/// let toggle: Patch<StoreState, StorePatch> = Patch::update(|s: &StoreState| StorePatch {
///     previewing: Some(!s.previewing),
///     ..Default::default()
/// });
/// assert_eq!(toggle.resolve(&state).previewing, Some(true));
/// ```
pub enum Patch<S, P> {
    /// Merge this partial as-is.
    Partial(P),
    /// Compute the partial from the current state, then merge it.
    Update(UpdateFn<S, P>),
}

impl<S, P> Patch<S, P> {
    /// Wrap a ready-made partial.
    pub fn partial(partial: P) -> Self {
        Patch::Partial(partial)
    }

    /// Wrap an updater function.
    pub fn update(f: impl FnOnce(&S) -> P + 'static) -> Self {
        Patch::Update(Box::new(f))
    }

    /// Turn this patch into the partial that should be merged into `current`.
    pub fn resolve(self, current: &S) -> P {
        match self {
            Patch::Partial(partial) => partial,
            Patch::Update(f) => f(current),
        }
    }
}

impl<S, P> Patch<S, P>
where
    S: Clone,
    P: Partial<S>,
{
    /// Resolve against `current` and return the merged copy.
    ///
    /// `current` is left untouched.
    pub fn apply(self, current: &S) -> S {
        let partial = self.resolve(current);
        let mut next = current.clone();
        partial.merge_into(&mut next);
        next
    }
}

impl<S, P: std::fmt::Debug> std::fmt::Debug for Patch<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Patch::Partial(partial) => f.debug_tuple("Partial").field(partial).finish(),
            Patch::Update(_) => f.write_str("Update(..)"),
        }
    }
}
