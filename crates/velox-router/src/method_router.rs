//! Per-method storage for a single tree endpoint.

use http::Method;

/// Maps HTTP methods to values for one path.
///
/// Standard methods get a dedicated slot; extension methods are kept in a
/// small list.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use velox_router::MethodRouter;
///
/// let mut router = MethodRouter::new();
/// router.insert(Method::GET, "serveFile");
/// router.insert(Method::HEAD, "headFile");
///
/// assert_eq!(router.get(&Method::GET), Some(&"serveFile"));
/// assert_eq!(router.get(&Method::DELETE), None);
/// assert_eq!(router.allowed_methods(), [Method::GET, Method::HEAD]);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    get: Option<T>,
    post: Option<T>,
    put: Option<T>,
    delete: Option<T>,
    patch: Option<T>,
    head: Option<T>,
    options: Option<T>,
    trace: Option<T>,
    connect: Option<T>,
    extensions: Vec<(Method, T)>,
}

impl<T> MethodRouter<T> {
    /// Creates an empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            get: None,
            post: None,
            put: None,
            delete: None,
            patch: None,
            head: None,
            options: None,
            trace: None,
            connect: None,
            extensions: Vec::new(),
        }
    }

    fn slot(&self, method: &Method) -> Option<&Option<T>> {
        match *method {
            Method::GET => Some(&self.get),
            Method::POST => Some(&self.post),
            Method::PUT => Some(&self.put),
            Method::DELETE => Some(&self.delete),
            Method::PATCH => Some(&self.patch),
            Method::HEAD => Some(&self.head),
            Method::OPTIONS => Some(&self.options),
            Method::TRACE => Some(&self.trace),
            Method::CONNECT => Some(&self.connect),
            _ => None,
        }
    }

    fn slot_mut(&mut self, method: &Method) -> Option<&mut Option<T>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::POST => Some(&mut self.post),
            Method::PUT => Some(&mut self.put),
            Method::DELETE => Some(&mut self.delete),
            Method::PATCH => Some(&mut self.patch),
            Method::HEAD => Some(&mut self.head),
            Method::OPTIONS => Some(&mut self.options),
            Method::TRACE => Some(&mut self.trace),
            Method::CONNECT => Some(&mut self.connect),
            _ => None,
        }
    }

    /// Stores `value` for `method`, returning the value it replaced.
    pub fn insert(&mut self, method: Method, value: T) -> Option<T> {
        if let Some(slot) = self.slot_mut(&method) {
            return slot.replace(value);
        }
        match self.extensions.iter_mut().find(|(m, _)| *m == method) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.extensions.push((method, value));
                None
            }
        }
    }

    /// Returns the value registered for `method`.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        match self.slot(method) {
            Some(slot) => slot.as_ref(),
            None => self
                .extensions
                .iter()
                .find(|(m, _)| m == method)
                .map(|(_, v)| v),
        }
    }

    /// Removes and returns the value registered for `method`.
    pub fn remove(&mut self, method: &Method) -> Option<T> {
        if let Some(slot) = self.slot_mut(method) {
            return slot.take();
        }
        let position = self.extensions.iter().position(|(m, _)| m == method)?;
        Some(self.extensions.remove(position).1)
    }

    /// Returns true if no method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values().next().is_none()
    }

    /// Registered values, standard methods first.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        [
            &self.get,
            &self.post,
            &self.put,
            &self.delete,
            &self.patch,
            &self.head,
            &self.options,
            &self.trace,
            &self.connect,
        ]
        .into_iter()
        .filter_map(Option::as_ref)
        .chain(self.extensions.iter().map(|(_, v)| v))
    }

    /// Returns the methods that have a value.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        let standard = [
            (Method::GET, self.get.is_some()),
            (Method::POST, self.post.is_some()),
            (Method::PUT, self.put.is_some()),
            (Method::DELETE, self.delete.is_some()),
            (Method::PATCH, self.patch.is_some()),
            (Method::HEAD, self.head.is_some()),
            (Method::OPTIONS, self.options.is_some()),
            (Method::TRACE, self.trace.is_some()),
            (Method::CONNECT, self.connect.is_some()),
        ];
        standard
            .into_iter()
            .filter_map(|(method, present)| present.then_some(method))
            .chain(self.extensions.iter().map(|(m, _)| m.clone()))
            .collect()
    }
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_router_new() {
        let router: MethodRouter<&str> = MethodRouter::new();
        assert!(router.is_empty());
        assert!(router.allowed_methods().is_empty());
    }

    #[test]
    fn test_method_router_standard_methods() {
        let mut router = MethodRouter::new();
        for (i, method) in [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::HEAD,
            Method::OPTIONS,
            Method::TRACE,
            Method::CONNECT,
        ]
        .into_iter()
        .enumerate()
        {
            assert!(router.insert(method.clone(), i).is_none());
            assert_eq!(router.get(&method), Some(&i));
        }
        assert_eq!(router.allowed_methods().len(), 9);
        assert_eq!(router.values().count(), 9);
    }

    #[test]
    fn test_method_router_replace_returns_previous() {
        let mut router = MethodRouter::new();
        router.insert(Method::GET, "first");
        assert_eq!(router.insert(Method::GET, "second"), Some("first"));
        assert_eq!(router.get(&Method::GET), Some(&"second"));
    }

    #[test]
    fn test_method_router_extension_method() {
        let purge = Method::from_bytes(b"PURGE").unwrap();
        let mut router = MethodRouter::new();
        router.insert(purge.clone(), "purge");
        router.insert(Method::GET, "get");

        assert_eq!(router.get(&purge), Some(&"purge"));
        assert_eq!(router.allowed_methods(), [Method::GET, purge.clone()]);
        assert_eq!(router.remove(&purge), Some("purge"));
        assert_eq!(router.get(&purge), None);
    }

    #[test]
    fn test_method_router_remove() {
        let mut router = MethodRouter::new();
        router.insert(Method::DELETE, "delete");
        assert_eq!(router.remove(&Method::DELETE), Some("delete"));
        assert_eq!(router.remove(&Method::DELETE), None);
        assert!(router.is_empty());
    }
}
