use std::fmt;

/// Namespace of the XMind 2.0 content document.
pub const XMIND_CONTENT_NS: &str = "urn:xmind:xmap:xmlns:content:2.0";

/// Local name of the element carrying a topic's label.
pub const TITLE_LOCAL_NAME: &str = "title";

/// Namespace-qualified element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_owned),
            local: local.to_owned(),
        }
    }

    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local == local
    }
}

/// Clark notation: `{namespace}local`, or just `local` when unqualified.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name in Clark notation.
    pub name: String,
    pub value: String,
}

/// One element of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: QName,
    /// Attributes in document order; namespace declarations are not included.
    pub attributes: Vec<Attribute>,
    /// Character data before the first child element, untrimmed.
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Trimmed text content, empty when the element has none.
    pub fn content(&self) -> &str {
        self.text.as_deref().map_or("", str::trim)
    }

    pub fn is_title(&self) -> bool {
        self.name.is(XMIND_CONTENT_NS, TITLE_LOCAL_NAME)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Number of elements in this subtree, including `self`.
    pub fn subtree_size(&self) -> usize {
        let mut pending = vec![self];
        let mut count = 0;
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(&node.children);
        }
        count
    }
}

/// Tears the tree down level by level so that depth is bounded by heap, not stack.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
