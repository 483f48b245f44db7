use kernel_ir::Uri;
use rustc_hash::FxHashMap;

/// File URIs referenced from the tree, in source-table order. Index 0 is
/// reserved for "no URI".
pub(crate) struct UriIndexer {
    map: FxHashMap<Uri, u32>,
    uris: Vec<Option<Uri>>,
}

impl UriIndexer {
    pub(crate) fn new() -> Self {
        UriIndexer {
            map: FxHashMap::default(),
            uris: vec![None],
        }
    }

    pub(crate) fn put(&mut self, uri: Option<&Uri>) -> u32 {
        let Some(uri) = uri else {
            return 0;
        };
        if let Some(&index) = self.map.get(uri) {
            return index;
        }
        let index = self.uris.len() as u32;
        self.map.insert(uri.clone(), index);
        self.uris.push(Some(uri.clone()));
        index
    }

    pub(crate) fn uris(&self) -> &[Option<Uri>] {
        &self.uris
    }
}
