use std::rc::Rc;

/// A pure function from a dependency tuple to a derived value.
///
/// Derive functions receive only their declared dependencies, never the
/// whole state, so a dependency cannot be read without being declared.
///
/// # Examples
///
/// ```
/// use sitefold::DeriveFn;
///
/// fn both(deps: &(bool, bool)) -> bool {
///     deps.0 && deps.1
/// }
///
/// let derive: DeriveFn<(bool, bool), bool> = both;
/// ```
pub type DeriveFn<D, T> = fn(&D) -> T;

/// A value a memo can depend on.
///
/// `unchanged` decides whether a cached result may be reused. Shared
/// pointers compare by identity, the way snapshot fields are replaced
/// wholesale on every patch; plain values compare by equality.
pub trait Dependency: Clone {
    /// `true` if `self` is the same dependency value as `previous`.
    fn unchanged(&self, previous: &Self) -> bool;
}

impl<T: ?Sized> Dependency for Rc<T> {
    fn unchanged(&self, previous: &Self) -> bool {
        Rc::ptr_eq(self, previous)
    }
}

impl<T: Dependency> Dependency for Option<T> {
    fn unchanged(&self, previous: &Self) -> bool {
        match (self, previous) {
            (Some(a), Some(b)) => a.unchanged(b),
            (None, None) => true,
            _ => false,
        }
    }
}

macro_rules! value_dependency {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Dependency for $ty {
                fn unchanged(&self, previous: &Self) -> bool {
                    self == previous
                }
            }
        )*
    };
}

value_dependency!(bool, u32, u64, usize, String, &'static str);

impl<A: Dependency, B: Dependency> Dependency for (A, B) {
    fn unchanged(&self, previous: &Self) -> bool {
        self.0.unchanged(&previous.0) && self.1.unchanged(&previous.1)
    }
}

impl<A: Dependency, B: Dependency, C: Dependency> Dependency for (A, B, C) {
    fn unchanged(&self, previous: &Self) -> bool {
        self.0.unchanged(&previous.0)
            && self.1.unchanged(&previous.1)
            && self.2.unchanged(&previous.2)
    }
}

/// A memoized derived value.
///
/// Keeps the last-seen dependencies and the last result. [`Memo::get`]
/// recomputes only when the dependencies passed in differ from the cached
/// ones, so results are never stale relative to the dependencies the caller
/// reads from the current snapshot.
///
/// # Examples
///
/// ```
/// use sitefold::Memo;
///
/// fn double(n: &u64) -> u64 {
///     n * 2
/// }
///
/// let mut memo = Memo::new("double", double);
/// assert_eq!(memo.get(2), 4);
/// assert_eq!(memo.get(2), 4);
/// assert_eq!(memo.recomputations(), 1);
/// assert_eq!(memo.get(3), 6);
/// assert_eq!(memo.recomputations(), 2);
/// ```
pub struct Memo<D, T> {
    name: &'static str,
    derive: DeriveFn<D, T>,
    cached: Option<(D, T)>,
    recomputations: u64,
}

impl<D, T: std::fmt::Debug> std::fmt::Debug for Memo<D, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("name", &self.name)
            .field("value", &self.cached.as_ref().map(|(_, value)| value))
            .field("recomputations", &self.recomputations)
            .finish()
    }
}

impl<D, T> Memo<D, T>
where
    D: Dependency,
    T: Clone,
{
    /// Create an empty memo. Nothing is computed until the first `get`.
    pub fn new(name: &'static str, derive: DeriveFn<D, T>) -> Self {
        Memo {
            name,
            derive,
            cached: None,
            recomputations: 0,
        }
    }

    /// Return the derived value for `deps`, recomputing only on change.
    pub fn get(&mut self, deps: D) -> T {
        if let Some((previous, value)) = &self.cached {
            if deps.unchanged(previous) {
                return value.clone();
            }
        }

        let value = (self.derive)(&deps);
        self.recomputations += 1;
        log::trace!("derived '{}' recomputed ({})", self.name, self.recomputations);
        self.cached = Some((deps, value.clone()));
        value
    }

    /// Drop the cached result so the next `get` recomputes.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// How many times the derive function has run.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Returns the memo name.
    pub fn name(&self) -> &str {
        self.name
    }
}
