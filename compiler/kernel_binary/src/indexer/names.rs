use kernel_ir::{CanonicalName, CanonicalNames};
use rustc_hash::FxHashMap;

/// Canonical names in the order they are written to the name table.
///
/// Indices handed out are biased by one: 0 stands for "no name". A name is
/// only indexed after its parent, so the table can be rebuilt in one pass.
pub(crate) struct NameIndexer {
    map: FxHashMap<CanonicalName, u32>,
    names: Vec<CanonicalName>,
}

impl NameIndexer {
    pub(crate) fn new() -> Self {
        NameIndexer {
            map: FxHashMap::default(),
            names: Vec::new(),
        }
    }

    /// Biased index of `name`, indexing it and its ancestors on first use.
    /// The root is never indexed and maps to 0.
    pub(crate) fn index(&mut self, names: &CanonicalNames, name: CanonicalName) -> u32 {
        if names.is_root(name) {
            return 0;
        }
        if let Some(&index) = self.map.get(&name) {
            return index + 1;
        }
        if let Some(parent) = names.parent(name) {
            self.index(names, parent);
        }
        let index = self.names.len() as u32;
        self.map.insert(name, index);
        self.names.push(name);
        index + 1
    }

    /// Biased index of an already indexed name.
    #[cfg(test)]
    pub(crate) fn get(&self, name: CanonicalName) -> Option<u32> {
        self.map.get(&name).map(|index| index + 1)
    }

    /// Names in table order.
    pub(crate) fn names(&self) -> &[CanonicalName] {
        &self.names
    }
}
