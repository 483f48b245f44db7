//! Binary format and language versions.

use std::fmt;
use std::ops::RangeInclusive;

/// Dart language version recorded on each library.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct LanguageVersion {
    pub major: u32,
    pub minor: u32,
}

impl LanguageVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        LanguageVersion { major, minor }
    }
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Kernel binary format version together with the language version it
/// was introduced with.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct KernelVersion {
    pub format: u32,
    pub language: LanguageVersion,
}

impl KernelVersion {
    pub const V40: KernelVersion = KernelVersion {
        format: 40,
        language: LanguageVersion::new(2, 8),
    };
    pub const V41: KernelVersion = KernelVersion {
        format: 41,
        language: LanguageVersion::new(2, 8),
    };

    pub const LATEST: KernelVersion = Self::V41;
    pub const OLDEST_SUPPORTED: KernelVersion = Self::V40;

    /// Format versions this crate can read and write.
    pub const SUPPORTED: RangeInclusive<u32> = Self::V40.format..=Self::V41.format;

    pub fn from_format(format: u32) -> Option<KernelVersion> {
        match format {
            40 => Some(Self::V40),
            41 => Some(Self::V41),
            _ => None,
        }
    }

    /// Version 41 added the compiled-mode word to the component index.
    #[inline]
    pub const fn has_compiled_mode(self) -> bool {
        self.format >= 41
    }
}

impl Default for KernelVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{} (language {})", self.format, self.language)
    }
}

/// Null-safety mode the component was compiled in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CompiledMode {
    Disabled,
    Weak,
    #[default]
    Strong,
    Agnostic,
}

impl CompiledMode {
    pub const fn to_u32(self) -> u32 {
        match self {
            CompiledMode::Disabled => 0,
            CompiledMode::Weak => 1,
            CompiledMode::Strong => 2,
            CompiledMode::Agnostic => 3,
        }
    }

    pub const fn from_u32(raw: u32) -> Option<CompiledMode> {
        match raw {
            0 => Some(CompiledMode::Disabled),
            1 => Some(CompiledMode::Weak),
            2 => Some(CompiledMode::Strong),
            3 => Some(CompiledMode::Agnostic),
            _ => None,
        }
    }
}
