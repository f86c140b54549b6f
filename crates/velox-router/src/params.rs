//! Path parameter extraction and storage.
//!
//! The matcher never builds a parameter collection itself. It writes into a
//! [`ParamSink`] supplied by the caller, which is the only coupling point
//! between the engine and the request-context layer. [`Params`] is the
//! owned, general-purpose sink.

use smallvec::SmallVec;

/// Number of parameters addressed by index; further ones go through
/// [`ParamSink::set_param_overflow`].
pub const INDEXED_PARAMS: usize = 8;

/// Receiver for parameters extracted by a successful match.
///
/// For a match with `n` parameters the matcher calls `set_param` for
/// indices `0..min(n, INDEXED_PARAMS)` in order, `set_param_overflow` for the
/// rest, then `set_param_count(n)` exactly once. Nothing is written for a
/// route that does not match.
pub trait ParamSink {
    /// Stores the parameter at position `index` (always `< INDEXED_PARAMS`).
    fn set_param(&mut self, index: usize, name: &str, value: &str);

    /// Stores a parameter beyond the indexed slots.
    fn set_param_overflow(&mut self, name: &str, value: &str);

    /// Records the total number of parameters of the match.
    fn set_param_count(&mut self, count: usize);
}

/// Routes the `index`-th parameter to the right sink method.
#[inline]
pub(crate) fn write_param<S: ParamSink + ?Sized>(sink: &mut S, index: usize, name: &str, value: &str) {
    if index < INDEXED_PARAMS {
        sink.set_param(index, name, value);
    } else {
        sink.set_param_overflow(name, value);
    }
}

/// Extracted path parameters from a route match.
///
/// Uses small-vector optimization to avoid heap allocation for the indexed
/// slots. Parameters are stored as (name, value) pairs in path order.
///
/// # Example
///
/// ```rust
/// use velox_router::Params;
///
/// let mut params = Params::new();
/// params.push("userId", "123");
/// params.push("action", "view");
///
/// assert_eq!(params.get("userId"), Some("123"));
/// assert_eq!(params.get("action"), Some("view"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INDEXED_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter to the end of the set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the parameter at `index` in path order.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&str, &str)> {
        self.inner
            .get(index)
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Clears all parameters, retaining allocated capacity.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl ParamSink for Params {
    fn set_param(&mut self, index: usize, name: &str, value: &str) {
        // A write at `index` discards anything a previous match left behind it.
        self.inner.resize(index, (String::new(), String::new()));
        self.push(name, value);
    }

    fn set_param_overflow(&mut self, name: &str, value: &str) {
        self.push(name, value);
    }

    fn set_param_count(&mut self, count: usize) {
        self.inner.truncate(count);
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
