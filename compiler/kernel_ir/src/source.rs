//! Source locations: URIs, file offsets, and per-file line tables.

use std::fmt;

/// A source or import URI, e.g. `file:///lib/main.dart` or `dart:core`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Uri(String);

impl Uri {
    pub fn new(uri: impl Into<String>) -> Self {
        Uri(uri.into())
    }

    /// `file://` URI for an absolute path.
    pub fn file(path: &str) -> Self {
        let path = path.trim_start_matches('/');
        Uri(format!("file:///{path}"))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uri({:?})", self.0)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uri {
    fn from(uri: &str) -> Self {
        Uri::new(uri)
    }
}

/// Character offset into a source file, or [`FileOffset::NONE`].
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct FileOffset(i32);

impl FileOffset {
    /// No source position.
    pub const NONE: FileOffset = FileOffset(-1);

    #[inline]
    pub const fn new(offset: i32) -> Self {
        FileOffset(offset)
    }

    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn is_known(self) -> bool {
        self.0 >= 0
    }
}

impl Default for FileOffset {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Debug for FileOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "@{}", self.0)
        } else {
            f.write_str("@none")
        }
    }
}

/// Contents of one source file as recorded in the component's source table.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Source {
    pub content: String,
    /// Offsets at which each line starts, followed by `content.len() + 1`.
    pub line_starts: Vec<u32>,
    pub import_uri: Option<Uri>,
}

impl Source {
    /// Record `content` and compute its line table.
    pub fn new(content: impl Into<String>, import_uri: Option<Uri>) -> Self {
        let content = content.into();
        let line_starts = line_starts(&content);
        Source {
            content,
            line_starts,
            import_uri,
        }
    }

    /// Whether the entry carries any information worth recording.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.line_starts.is_empty() && self.import_uri.is_none()
    }
}

/// Line table for `content`: offset 0, the offset after every `'\n'`, and
/// one past the end.
pub fn line_starts(content: &str) -> Vec<u32> {
    let mut starts = vec![0];
    starts.extend(
        content
            .bytes()
            .enumerate()
            .filter(|&(_, b)| b == b'\n')
            .map(|(i, _)| (i + 1) as u32),
    );
    starts.push(content.len() as u32 + 1);
    starts
}
