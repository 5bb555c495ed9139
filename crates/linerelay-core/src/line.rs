//! Bounded text buffer carried between pipeline stages

use std::fmt;

/// Default payload capacity of a line in bytes
pub const DEFAULT_MAX_LINE_LEN: usize = 1023;

/// One line of operator input, held as raw bytes.
///
/// Transforms work on bytes rather than characters, so a line may stop being
/// valid UTF-8 after byte-level recoding. `Display` is lossy and intended for
/// logs only; console traces write the raw bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Line {
    bytes: Vec<u8>,
}

impl Line {
    /// Create a line from raw bytes without any trimming
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Build a line from raw input: strip the trailing line terminator and
    /// cap the payload at `max_len` bytes.
    ///
    /// Returns the line and whether it had to be truncated.
    pub fn from_input(raw: &[u8], max_len: usize) -> (Self, bool) {
        let bytes = raw.strip_suffix(b"\n").unwrap_or(raw);
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);

        let truncated = bytes.len() > max_len;
        let bytes = if truncated { &bytes[..max_len] } else { bytes };

        (Self::new(bytes), truncated)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Replace the contents with a copy of `other`, reusing the allocation
    pub fn copy_from(&mut self, other: &Line) {
        self.bytes.clear();
        self.bytes.extend_from_slice(&other.bytes);
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Self::new(text.into_bytes())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_strips_newline() {
        let (line, truncated) = Line::from_input(b"Hello\n", DEFAULT_MAX_LINE_LEN);
        assert_eq!(line.as_bytes(), b"Hello");
        assert!(!truncated);

        let (line, _) = Line::from_input(b"Hello\r\n", DEFAULT_MAX_LINE_LEN);
        assert_eq!(line.as_bytes(), b"Hello");

        // Only one terminator is removed
        let (line, _) = Line::from_input(b"a\n\n", DEFAULT_MAX_LINE_LEN);
        assert_eq!(line.as_bytes(), b"a\n");
    }

    #[test]
    fn test_from_input_empty() {
        let (line, truncated) = Line::from_input(b"\n", DEFAULT_MAX_LINE_LEN);
        assert!(line.is_empty());
        assert!(!truncated);
    }

    #[test]
    fn test_from_input_truncates() {
        let raw = vec![b'x'; 20];
        let (line, truncated) = Line::from_input(&raw, 8);
        assert_eq!(line.len(), 8);
        assert!(truncated);
    }

    #[test]
    fn test_from_input_keeps_high_bit_bytes() {
        let (line, truncated) = Line::from_input(&[0xF0, 0xD2, 0xC9, b'\n'], 3);
        assert_eq!(line.as_bytes(), &[0xF0, 0xD2, 0xC9]);
        assert!(!truncated);
    }

    #[test]
    fn test_copy_from_replaces_contents() {
        let mut line = Line::from("longer text");
        line.copy_from(&Line::from("abc"));
        assert_eq!(line, Line::from("abc"));
    }

    #[test]
    fn test_display_is_lossy() {
        let line = Line::new(vec![b'a', 0xC8, b'b']);
        assert_eq!(line.to_string(), "a\u{FFFD}b");
    }
}
