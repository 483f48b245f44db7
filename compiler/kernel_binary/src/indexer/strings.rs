use rustc_hash::FxHashMap;

/// Deduplicating string table. The empty string is always index 0.
pub(crate) struct StringIndexer {
    map: FxHashMap<String, u32>,
    strings: Vec<String>,
}

impl StringIndexer {
    pub(crate) fn new() -> Self {
        let mut indexer = StringIndexer {
            map: FxHashMap::default(),
            strings: Vec::new(),
        };
        indexer.put("");
        indexer
    }

    pub(crate) fn put(&mut self, value: &str) -> u32 {
        if let Some(&index) = self.map.get(value) {
            return index;
        }
        let index = self.strings.len() as u32;
        self.map.insert(value.to_owned(), index);
        self.strings.push(value.to_owned());
        index
    }

    /// Strings in index order.
    pub(crate) fn strings(&self) -> &[String] {
        &self.strings
    }
}
