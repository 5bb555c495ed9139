//! Transform catalog and registry
//!
//! A mode id selects one entry of an ordered registry. Every transform rewrites
//! a byte buffer in place and holds no shared state, so one instance can be
//! applied from any stage thread without extra locking.

use std::fmt;
use std::sync::Arc;

use crate::errors::{PipelineError, Result, TransformError};

/// Index of a transform in the registry
pub type ModeId = usize;

// ----------------------------------------------------------------------------
// Transform Trait
// ----------------------------------------------------------------------------

/// In-place rewrite of a line's bytes
pub trait Transform: Send + Sync + fmt::Debug {
    /// Human-readable name shown in the mode catalog
    fn name(&self) -> &str;

    /// Rewrite `text` in place
    fn apply(&self, text: &mut Vec<u8>) -> core::result::Result<(), TransformError>;
}

// ----------------------------------------------------------------------------
// Built-in Modes
// ----------------------------------------------------------------------------

/// Built-in transforms, in catalog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Translate,
    Reverse,
    Swap,
    Koi8,
    ToUpper,
    ToLower,
    InvertCase,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Translate,
        Mode::Reverse,
        Mode::Swap,
        Mode::Koi8,
        Mode::ToUpper,
        Mode::ToLower,
        Mode::InvertCase,
    ];

    /// Bit toggled by the KOI8 recoding
    pub const KOI8_BIT: u8 = 0x80;

    pub fn label(self) -> &'static str {
        match self {
            Mode::Translate => "Translate",
            Mode::Reverse => "Reverse",
            Mode::Swap => "Swap",
            Mode::Koi8 => "KOI8",
            Mode::ToUpper => "To upper case",
            Mode::ToLower => "To lower case",
            Mode::InvertCase => "Invert case",
        }
    }

    /// Apply this mode to `text`; built-in modes never fail
    pub fn rewrite(self, text: &mut [u8]) {
        match self {
            Mode::Translate => {}
            Mode::Reverse => text.reverse(),
            Mode::Swap => {
                for pair in text.chunks_exact_mut(2) {
                    pair.swap(0, 1);
                }
            }
            Mode::Koi8 => {
                for byte in text.iter_mut() {
                    *byte ^= Self::KOI8_BIT;
                }
            }
            Mode::ToUpper => text.make_ascii_uppercase(),
            Mode::ToLower => text.make_ascii_lowercase(),
            Mode::InvertCase => {
                for byte in text.iter_mut() {
                    if byte.is_ascii_uppercase() {
                        byte.make_ascii_lowercase();
                    } else if byte.is_ascii_lowercase() {
                        byte.make_ascii_uppercase();
                    }
                }
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Transform for Mode {
    fn name(&self) -> &str {
        self.label()
    }

    fn apply(&self, text: &mut Vec<u8>) -> core::result::Result<(), TransformError> {
        self.rewrite(text);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Transform Registry
// ----------------------------------------------------------------------------

/// Ordered catalog mapping mode ids to transforms
#[derive(Debug, Clone)]
pub struct TransformRegistry {
    entries: Vec<Arc<dyn Transform>>,
}

impl TransformRegistry {
    /// Empty registry; mostly useful for tests that install custom transforms
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registry holding the built-in modes with ids `0..7`
    pub fn builtin() -> Self {
        Mode::ALL
            .iter()
            .fold(Self::empty(), |registry, mode| registry.with_transform(Arc::new(*mode)))
    }

    /// Append a transform; it receives the next free mode id
    pub fn with_transform(mut self, transform: Arc<dyn Transform>) -> Self {
        self.entries.push(transform);
        self
    }

    /// Resolve a mode id, reporting out-of-range ids as an error
    pub fn lookup(&self, mode: ModeId) -> Result<Arc<dyn Transform>> {
        self.entries
            .get(mode)
            .cloned()
            .ok_or(PipelineError::UnknownMode {
                mode,
                max: self.entries.len().saturating_sub(1),
            })
    }

    /// Name of the transform behind `mode`, if any
    pub fn name_of(&self, mode: ModeId) -> Option<&str> {
        self.entries.get(mode).map(|transform| transform.name())
    }

    /// `(id, name)` pairs in catalog order
    pub fn catalog(&self) -> impl Iterator<Item = (ModeId, &str)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(id, transform)| (id, transform.name()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(mode: Mode, text: &str) -> Vec<u8> {
        let mut bytes = text.as_bytes().to_vec();
        mode.rewrite(&mut bytes);
        bytes
    }

    #[test]
    fn test_builtin_catalog_order() {
        let registry = TransformRegistry::builtin();
        let names: Vec<&str> = registry.catalog().map(|(_, name)| name).collect();
        assert_eq!(
            names,
            vec![
                "Translate",
                "Reverse",
                "Swap",
                "KOI8",
                "To upper case",
                "To lower case",
                "Invert case"
            ]
        );
    }

    #[test]
    fn test_lookup_out_of_range() {
        let registry = TransformRegistry::builtin();
        assert!(registry.lookup(6).is_ok());
        match registry.lookup(7) {
            Err(PipelineError::UnknownMode { mode, max }) => {
                assert_eq!(mode, 7);
                assert_eq!(max, 6);
            }
            other => panic!("expected UnknownMode, got {:?}", other),
        }
    }

    #[test]
    fn test_reverse() {
        assert_eq!(rewrite(Mode::Reverse, "abcd"), b"dcba");
        assert_eq!(rewrite(Mode::Reverse, "abc"), b"cba");
    }

    #[test]
    fn test_swap_keeps_odd_tail() {
        assert_eq!(rewrite(Mode::Swap, "abcd"), b"badc");
        assert_eq!(rewrite(Mode::Swap, "abcde"), b"badce");
    }

    #[test]
    fn test_koi8_sets_high_bit() {
        let out = rewrite(Mode::Koi8, "A");
        assert_eq!(out, vec![b'A' | 0x80]);
    }

    #[test]
    fn test_case_modes() {
        assert_eq!(rewrite(Mode::ToUpper, "abc 1!"), b"ABC 1!");
        assert_eq!(rewrite(Mode::ToLower, "ABC 1!"), b"abc 1!");
        assert_eq!(rewrite(Mode::InvertCase, "aBc 1!"), b"AbC 1!");
    }

    #[test]
    fn test_translate_is_identity() {
        assert_eq!(rewrite(Mode::Translate, "Hello"), b"Hello");
    }
}
