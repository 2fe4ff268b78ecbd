//! Immutable source blobs.
//!
//! A [`Source`] owns the raw bytes of a Curv program, string literal, or
//! directory pseudo-file. Every [`crate::location::Location`] that reports an
//! error keeps a reference-counted handle to the `Source` it points into, so
//! a `Source` must outlive every `Location` derived from it; `Rc` gives us
//! that for free instead of threading lifetimes through the whole pipeline.

use std::rc::Rc;

/// What kind of thing a [`Source`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A `.curv` source file, or an in-memory string passed as Curv source.
    Curv,
    /// A cached compiled shape+shader bundle, serialised as JSON (`.gpu`).
    Gpu,
    /// A directory whose members become record fields, named after their
    /// file stems.
    Directory,
}

/// An immutable (name, bytes) pair.
///
/// `Source` never copies or mutates its `bytes`; a [`Token`](crate::token::Token)
/// stores byte offsets into this buffer rather than owned substrings.
#[derive(Debug)]
pub struct Source {
    /// Display name: a file path, `"<string>"`, or similar.
    name: String,
    bytes: Vec<u8>,
    kind: SourceKind,
}

impl Source {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>, kind: SourceKind) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            bytes: bytes.into(),
            kind,
        })
    }

    /// Build a `Source` from a literal Curv expression string, as used by the
    /// CLI's `-x` flag and by `sc_test`.
    #[must_use]
    pub fn from_string(text: impl Into<String>) -> Rc<Self> {
        Self::new("<string>", text.into().into_bytes(), SourceKind::Curv)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The source text. Curv source is required to be valid UTF-8; invalid
    /// byte sequences are caught by the scanner and turned into `bad_utf8`
    /// tokens rather than reaching this method on a live compile path. Used
    /// only by diagnostics, which tolerate lossy conversion.
    #[must_use]
    pub fn text_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl PartialEq for Source {
    /// Two `Source`s are the same source iff they are the same allocation;
    /// byte-for-byte-equal but distinct strings (e.g. two `-x` invocations of
    /// the same expression) are deliberately treated as different origins.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
