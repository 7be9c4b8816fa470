//! Rich diagnostic error types for the usk factorizer.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes and help text so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::table::GlyphKind;

/// Top-level error type for the usk factorizer.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum UskError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Segment(#[from] SegmentError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ledger(#[from] LedgerError),
}

// ---------------------------------------------------------------------------
// Segmenter errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SegmentError {
    #[error("invalid character '{ch}' at byte offset {offset}")]
    #[diagnostic(
        code(usk::segment::invalid_char),
        help(
            "A surface wordform must consist of letters only. Whitespace, \
             digits, and punctuation are rejected, not dropped — split the \
             input into single words before decoding."
        )
    )]
    InvalidCharacter { ch: char, offset: usize },

    #[error("empty input: nothing to decode")]
    #[diagnostic(
        code(usk::segment::empty_input),
        help("Provide a non-empty wordform.")
    )]
    EmptyInput,
}

// ---------------------------------------------------------------------------
// Glyph table errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TableError {
    #[error("no {kind} entry for glyph '{key}'")]
    #[diagnostic(
        code(usk::table::not_found),
        help(
            "The glyph table has no entry under this key/kind. Check the key \
             spelling, or list the seeded table with `usk glyphs`."
        )
    )]
    NotFound { key: String, kind: GlyphKind },
}

// ---------------------------------------------------------------------------
// Ledger errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LedgerError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(usk::ledger::io),
        help(
            "A filesystem operation failed. Check that the data directory \
             exists, has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(usk::ledger::serde),
        help(
            "Failed to serialize or deserialize a record. This usually means \
             the stored format has changed between versions — check the \
             ledger file for hand-edited or truncated lines."
        )
    )]
    Serialization { message: String },
}

/// Convenience alias for functions returning usk results.
pub type UskResult<T> = std::result::Result<T, UskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_error_converts_to_usk_error() {
        let err = SegmentError::InvalidCharacter { ch: '!', offset: 3 };
        let usk: UskError = err.into();
        assert!(matches!(
            usk,
            UskError::Segment(SegmentError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn table_error_converts_to_usk_error() {
        let err = TableError::NotFound {
            key: "zz".into(),
            kind: GlyphKind::Operator,
        };
        let usk: UskError = err.into();
        assert!(matches!(usk, UskError::Table(TableError::NotFound { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = SegmentError::InvalidCharacter { ch: '7', offset: 12 };
        let msg = format!("{err}");
        assert!(msg.contains('7'));
        assert!(msg.contains("12"));
    }
}
