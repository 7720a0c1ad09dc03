//! Classification of proxy-list entries ahead of filtering

/// What a proxy-list entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRef<'a> {
    /// Another group or a built-in policy; never subject to inclusion filters
    Group(&'a str),
    /// A proxy node; `kind` is `None` when it is absent from the inventory
    Node { name: &'a str, kind: Option<&'a str> },
}

impl<'a> EntryRef<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            EntryRef::Group(name) => name,
            EntryRef::Node { name, .. } => name,
        }
    }
}

/// Knowledge about which names are groups and which are typed nodes
pub trait EntryClassifier {
    fn is_group(&self, name: &str) -> bool;

    /// Lowercased type of a live node, if the name is one
    fn node_type(&self, name: &str) -> Option<&str>;

    fn classify<'a>(&'a self, name: &'a str) -> EntryRef<'a> {
        if self.is_group(name) {
            EntryRef::Group(name)
        } else {
            EntryRef::Node {
                name,
                kind: self.node_type(name),
            }
        }
    }
}
