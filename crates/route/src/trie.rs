//! A radix trie of path segments.
//!
//! Every segment of a route is a key starting with `/`. Static keys share
//! common prefixes with their siblings (the edge is split at the longest
//! common prefix), so static edges leaving one node always differ in their
//! first byte. Wildcards are separate edge kinds:
//!
//! - [`Edge::Capture`] (`/:name`) consumes one segment and captures it,
//! - [`Edge::Discard`] (`/_`) consumes one segment,
//! - [`Edge::Greedy`] (`/*`) consumes the rest of the path and captures it.
//!
//! Lookup walks the path string once. Children are tried static first, then
//! single segment wildcards, then the greedy wildcard; when a branch dead-ends
//! the walk backtracks to the next sibling with its captures restored.

use std::fmt;
use std::mem;

/// The label of an edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    /// A literal label, `/users` or a fragment of one after a split.
    ///
    /// Labels are bytes: a split may fall inside a multi-byte character.
    Static(Vec<u8>),
    Capture,
    Discard,
    Greedy,
}

impl Edge {
    /// The key of one pattern segment: `:name`, `_`, `*` or a literal.
    pub fn segment(segment: &str) -> Self {
        match segment.as_bytes().first() {
            Some(b':') => Edge::Capture,
            Some(b'_') if segment.len() == 1 => Edge::Discard,
            Some(b'*') if segment.len() == 1 => Edge::Greedy,
            _ => Edge::Static(format!("/{segment}").into_bytes()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Edge::Static(_) => 0,
            Edge::Capture | Edge::Discard => 1,
            Edge::Greedy => 2,
        }
    }

    fn first_byte(&self) -> Option<u8> {
        match self {
            Edge::Static(label) => label.first().copied(),
            _ => None,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Static(label) => f.write_str(&String::from_utf8_lossy(label)),
            Edge::Capture => f.write_str("/:"),
            Edge::Discard => f.write_str("/_"),
            Edge::Greedy => f.write_str("/*"),
        }
    }
}

struct Node<T> {
    edge: Edge,
    children: Vec<Node<T>>,
    value: Option<T>,
}

impl<T> Node<T> {
    fn new(edge: Edge) -> Self {
        Self { edge, children: vec![], value: None }
    }

    /// Inserts `node` after every child of the same or a lower rank.
    fn add_child(&mut self, node: Node<T>) -> &mut Node<T> {
        let index = self.children.iter().position(|child| child.edge.rank() > node.edge.rank()).unwrap_or(self.children.len());
        self.children.insert(index, node);
        &mut self.children[index]
    }

    fn insert(&mut self, edge: Edge) -> &mut Node<T> {
        match edge {
            Edge::Static(key) => self.insert_static(&key),
            wildcard => match self.children.iter().position(|child| child.edge == wildcard) {
                Some(index) => &mut self.children[index],
                None => self.add_child(Node::new(wildcard)),
            },
        }
    }

    fn insert_static(&mut self, key: &[u8]) -> &mut Node<T> {
        let first = key.first().copied();
        let Some(index) = self.children.iter().position(|child| child.edge.first_byte() == first) else {
            return self.add_child(Node::new(Edge::Static(key.to_vec())));
        };

        let child = &mut self.children[index];
        let common = match &child.edge {
            Edge::Static(label) => common_prefix(label, key),
            _ => 0,
        };
        child.split(common);

        if common == key.len() { child } else { child.insert_static(&key[common..]) }
    }

    /// Cuts the static label at `at`; the suffix takes over children and value.
    fn split(&mut self, at: usize) {
        let Edge::Static(label) = &mut self.edge else {
            return;
        };
        if at >= label.len() {
            return;
        }

        let suffix = label.split_off(at);
        let tail = Node { edge: Edge::Static(suffix), children: mem::take(&mut self.children), value: self.value.take() };
        self.children.push(tail);
    }

    fn find<'a>(&'a self, path: &str, i: usize, values: &mut Vec<String>) -> Option<&'a T> {
        if i == path.len()
            && let Some(value) = &self.value
        {
            return Some(value);
        }

        let bytes = path.as_bytes();
        for child in &self.children {
            match &child.edge {
                Edge::Static(label) => {
                    if bytes.get(i) != label.first() || !bytes[i..].starts_with(label) {
                        continue;
                    }
                    if let Some(found) = child.find(path, i + label.len(), values) {
                        return Some(found);
                    }
                }
                Edge::Capture | Edge::Discard => {
                    if bytes.get(i) != Some(&b'/') {
                        continue;
                    }
                    let start = i + 1;
                    let end = path[start..].find('/').map_or(path.len(), |p| start + p);
                    let mark = values.len();
                    if child.edge == Edge::Capture {
                        values.push(path[start..end].to_owned());
                    }
                    if let Some(found) = child.find(path, end, values) {
                        return Some(found);
                    }
                    values.truncate(mark);
                }
                Edge::Greedy => {
                    if bytes.get(i) != Some(&b'/') {
                        continue;
                    }
                    let mark = values.len();
                    values.push(path[i + 1..].to_owned());
                    if let Some(found) = child.find(path, path.len(), values) {
                        return Some(found);
                    }
                    values.truncate(mark);
                }
            }
        }
        None
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let marker = if self.value.is_some() { " *" } else { "" };
        writeln!(f, "{:indent$}{}{marker}", "", self.edge, indent = depth * 2)?;
        self.children.iter().try_for_each(|child| child.fmt_tree(f, depth + 1))
    }
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Route trie holding one value per distinct pattern.
pub struct Trie<T> {
    root: Node<T>,
    len: usize,
}

impl<T> Trie<T> {
    pub fn new() -> Self {
        Self { root: Node::new(Edge::Static(Vec::new())), len: 0 }
    }

    /// Returns the value stored at the end of `edges`, creating it if needed.
    ///
    /// A pattern without edges is the root path `/`.
    pub fn entry<I>(&mut self, edges: I) -> &mut T
    where
        I: IntoIterator<Item = Edge>,
        T: Default,
    {
        let mut edges = edges.into_iter().peekable();
        let mut node = if edges.peek().is_none() { self.root.insert_static(b"/") } else { &mut self.root };
        for edge in edges {
            node = node.insert(edge);
        }

        if node.value.is_none() {
            self.len += 1;
        }
        node.value.get_or_insert_with(T::default)
    }

    /// Finds the value whose pattern matches the whole `path`.
    ///
    /// Wildcard captures are appended to `values` in path order; on a miss
    /// `values` is left as it was.
    pub fn lookup<'a>(&'a self, path: &str, values: &mut Vec<String>) -> Option<&'a T> {
        self.root.find(path, 0, values)
    }

    /// Number of distinct patterns.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Trie<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.children.iter().try_for_each(|child| child.fmt_tree(f, 0))
    }
}
