//! Radix tree node implementation.
//!
//! The tree serves routes the positional matcher cannot express: patterns
//! ending in a wildcard segment. Children are tried static first, then
//! parameters, then wildcards, with backtracking between branches.

use http::Method;
use smallvec::SmallVec;

use crate::compiled::{wildcard_name, MAX_SEGMENTS};
use crate::method_router::MethodRouter;
use crate::params::{write_param, ParamSink, INDEXED_PARAMS};

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Static path segment (e.g., "users", "api")
    Static,
    /// Named parameter (e.g., ":id")
    Param(String),
    /// Trailing wildcard (e.g., "*path")
    Wildcard(String),
}

/// Parameters captured along the current branch: names borrowed from the
/// tree, values from the request path.
type Captures<'t, 'p> = SmallVec<[(&'t str, &'p str); INDEXED_PARAMS]>;

/// A node in the radix tree.
///
/// Each node represents a path segment. A node that ends a registered
/// pattern stores its values per method.
#[derive(Debug, Clone)]
pub struct Node<T> {
    segment: String,
    kind: SegmentKind,
    methods: MethodRouter<T>,
    /// Sorted by segment for binary search.
    static_children: Vec<Node<T>>,
    /// One child per distinct parameter name, in insertion order.
    param_children: Vec<Node<T>>,
    /// One leaf per distinct wildcard name, in insertion order.
    wildcard_children: Vec<Node<T>>,
}

impl<T> Node<T> {
    fn new(segment: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            segment: segment.into(),
            kind,
            methods: MethodRouter::new(),
            static_children: Vec::new(),
            param_children: Vec::new(),
            wildcard_children: Vec::new(),
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new("", SegmentKind::Static)
    }

    /// The raw pattern segment this node represents.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// The kind of segment.
    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    /// Parses a pattern into segments. Only the last segment can be a wildcard.
    fn parse_pattern(pattern: &str) -> Vec<(String, SegmentKind)> {
        let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let last = segments.len().saturating_sub(1);

        segments
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let kind = if let Some(name) = s.strip_prefix(':') {
                    SegmentKind::Param(name.to_string())
                } else if let Some(name) = wildcard_name(s).filter(|_| i == last) {
                    SegmentKind::Wildcard(name.to_string())
                } else {
                    SegmentKind::Static
                };
                ((*s).to_string(), kind)
            })
            .collect()
    }

    /// Inserts `value` for `(pattern, method)`.
    ///
    /// # Errors
    ///
    /// Hands `value` back when the pair is already taken.
    pub fn insert(&mut self, pattern: &str, method: Method, value: T) -> Result<(), T> {
        let segments = Self::parse_pattern(pattern);
        let node = self.descend_or_create(&segments);
        if node.methods.get(&method).is_some() {
            return Err(value);
        }
        node.methods.insert(method, value);
        Ok(())
    }

    fn descend_or_create(&mut self, segments: &[(String, SegmentKind)]) -> &mut Self {
        let Some(((segment, kind), rest)) = segments.split_first() else {
            return self;
        };

        let child = match kind {
            SegmentKind::Static => {
                let i = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(i) => i,
                    Err(i) => {
                        self.static_children.insert(i, Self::new(segment.as_str(), SegmentKind::Static));
                        i
                    }
                };
                &mut self.static_children[i]
            }
            SegmentKind::Param(_) | SegmentKind::Wildcard(_) => {
                let children = if matches!(kind, SegmentKind::Param(_)) {
                    &mut self.param_children
                } else {
                    &mut self.wildcard_children
                };
                let i = match children.iter().position(|c| c.kind == *kind) {
                    Some(i) => i,
                    None => {
                        children.push(Self::new(segment.as_str(), kind.clone()));
                        children.len() - 1
                    }
                };
                &mut children[i]
            }
        };
        child.descend_or_create(rest)
    }

    fn descend(&mut self, segments: &[(String, SegmentKind)]) -> Option<&mut Self> {
        let Some(((segment, kind), rest)) = segments.split_first() else {
            return Some(self);
        };

        let child = match kind {
            SegmentKind::Static => {
                let i = self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                    .ok()?;
                &mut self.static_children[i]
            }
            SegmentKind::Param(_) => self.param_children.iter_mut().find(|c| c.kind == *kind)?,
            SegmentKind::Wildcard(_) => self.wildcard_children.iter_mut().find(|c| c.kind == *kind)?,
        };
        child.descend(rest)
    }

    /// Removes and returns the value stored for `(pattern, method)`.
    ///
    /// Emptied nodes are left in place.
    pub fn remove(&mut self, pattern: &str, method: &Method) -> Option<T> {
        let segments = Self::parse_pattern(pattern);
        self.descend(&segments)?.methods.remove(method)
    }

    /// Matches `(method, path)` and writes captured parameters to `sink`.
    ///
    /// A wildcard captures one or more remaining segments, joined by `/`
    /// exactly as they appear in the path, minus trailing slashes.
    pub fn match_path<S: ParamSink + ?Sized>(
        &self,
        method: &Method,
        path: &str,
        sink: &mut S,
    ) -> Option<&T> {
        self.match_path_where(method, path, sink, |_, _| true)
    }

    /// Like [`match_path`](Self::match_path), but a candidate value only
    /// matches when `accept` approves it together with the parameters
    /// captured on its branch. A rejected candidate backtracks into the
    /// remaining branches.
    pub fn match_path_where<S, F>(&self, method: &Method, path: &str, sink: &mut S, accept: F) -> Option<&T>
    where
        S: ParamSink + ?Sized,
        F: Fn(&T, &[(&str, &str)]) -> bool,
    {
        let mut segments: SmallVec<[(usize, &str); MAX_SEGMENTS]> = SmallVec::new();
        let mut offset = 0;
        for segment in path.split('/') {
            if !segment.is_empty() {
                segments.push((offset, segment));
            }
            offset += segment.len() + 1;
        }

        let mut captures = Captures::new();
        let value = self.match_segments(method, path, &segments, &mut captures, &accept)?;

        for (index, (name, value)) in captures.iter().enumerate() {
            write_param(sink, index, name, value);
        }
        sink.set_param_count(captures.len());
        Some(value)
    }

    fn match_segments<'t, 'p, F>(
        &'t self,
        method: &Method,
        path: &'p str,
        segments: &[(usize, &'p str)],
        captures: &mut Captures<'t, 'p>,
        accept: &F,
    ) -> Option<&'t T>
    where
        F: Fn(&T, &[(&str, &str)]) -> bool,
    {
        let Some((&(offset, segment), rest)) = segments.split_first() else {
            return self.methods.get(method).filter(|value| accept(*value, &captures[..]));
        };

        if let Ok(i) = self
            .static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
        {
            if let Some(value) = self.static_children[i].match_segments(method, path, rest, captures, accept) {
                return Some(value);
            }
        }

        for child in &self.param_children {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = captures.len();
                captures.push((name.as_str(), segment));
                if let Some(value) = child.match_segments(method, path, rest, captures, accept) {
                    return Some(value);
                }
                captures.truncate(mark);
            }
        }

        for child in &self.wildcard_children {
            if let (SegmentKind::Wildcard(name), Some(value)) = (&child.kind, child.methods.get(method)) {
                captures.push((name.as_str(), path[offset..].trim_end_matches('/')));
                if accept(value, &captures[..]) {
                    return Some(value);
                }
                captures.pop();
            }
        }

        None
    }

    /// All stored values, depth first.
    pub fn values(&self) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_values(&mut out);
        out
    }

    fn collect_values<'t>(&'t self, out: &mut Vec<&'t T>) {
        out.extend(self.methods.values());
        for child in self
            .static_children
            .iter()
            .chain(&self.param_children)
            .chain(&self.wildcard_children)
        {
            child.collect_values(out);
        }
    }
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self::root()
    }
}
