//! Cluster resolution: turning runs into glyph-table tokens.
//!
//! Consonant runs are scanned longest-match-first against the operator keys;
//! precedence is descending key length, and at equal length the exact
//! substring probe (two distinct equal-length keys cannot match the same
//! cursor position). Vowel runs resolve to exactly one payload token,
//! composite when the run is longer than a single glyph.

use crate::segment::Run;
use crate::table::{GlyphEntry, GlyphKind, GlyphTable};

/// A resolved token: a slice of a run bound to a glyph-table entry.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Token {
    /// The matched surface text.
    pub text: String,
    /// Byte offset of the token start in the normalized surface.
    pub start: usize,
    /// Byte offset one past the token end.
    pub end: usize,
    /// The table entry (or degraded fallback) backing this token.
    pub entry: GlyphEntry,
}

/// Zero-confidence fallback for a glyph absent from the table.
fn unknown_glyph(ch: char, kind: GlyphKind) -> GlyphEntry {
    tracing::warn!(glyph = %ch, %kind, "glyph not in table, degrading to zero confidence");
    GlyphEntry {
        key: ch.to_string(),
        kind,
        descriptor: ch.to_string(),
        principle: "unresolved glyph".to_string(),
        confidence: 0.0,
    }
}

/// Tokenize a consonant run into operator tokens, longest match first.
///
/// Resolution never fails: a single glyph with no table entry degrades to a
/// zero-confidence fallback token.
pub fn resolve_operators(run: &Run, table: &GlyphTable) -> Vec<Token> {
    let text = run.text.as_str();
    let mut tokens = Vec::new();
    let mut cursor = 0;

    while cursor < text.len() {
        let remaining = text.len() - cursor;
        let longest = table.max_operator_key_len().min(remaining);

        let mut matched = None;
        for len in (2..=longest).rev() {
            if !text.is_char_boundary(cursor + len) {
                continue;
            }
            let candidate = &text[cursor..cursor + len];
            if let Ok(entry) = table.lookup(candidate, GlyphKind::Operator) {
                matched = Some((candidate.to_string(), len, entry));
                break;
            }
        }

        let (matched_text, len, entry) = match matched {
            Some(m) => m,
            None => {
                // Fall back to a single glyph, degrading if unseeded.
                let Some(ch) = text[cursor..].chars().next() else {
                    break;
                };
                let single = ch.to_string();
                let entry = table
                    .lookup(&single, GlyphKind::Operator)
                    .unwrap_or_else(|_| unknown_glyph(ch, GlyphKind::Operator));
                (single, ch.len_utf8(), entry)
            }
        };

        tokens.push(Token {
            text: matched_text,
            start: run.start + cursor,
            end: run.start + cursor + len,
            entry,
        });
        cursor += len;
    }

    tokens
}

/// Resolve a vowel run into exactly one payload token.
///
/// A run of length 1 is a simple payload. A longer run is a single composite
/// token: the table entry for the whole run when seeded, otherwise a
/// synthesized compound whose descriptor joins the component types with `+`
/// and whose confidence is the mean of the component confidences.
pub fn resolve_payload(run: &Run, table: &GlyphTable) -> Token {
    let entry = match table.lookup(&run.text, GlyphKind::Payload) {
        Ok(entry) => entry,
        Err(_) if run.text.chars().count() > 1 => synthesize_compound(run, table),
        Err(_) => {
            let ch = run.text.chars().next().unwrap_or('?');
            unknown_glyph(ch, GlyphKind::Payload)
        }
    };
    Token {
        text: run.text.clone(),
        start: run.start,
        end: run.end,
        entry,
    }
}

fn synthesize_compound(run: &Run, table: &GlyphTable) -> GlyphEntry {
    let mut descriptors = Vec::new();
    let mut sum = 0.0;
    let mut count = 0usize;
    for ch in run.text.chars() {
        let entry = table
            .lookup(&ch.to_string(), GlyphKind::Payload)
            .unwrap_or_else(|_| unknown_glyph(ch, GlyphKind::Payload));
        descriptors.push(entry.descriptor);
        sum += entry.confidence;
        count += 1;
    }
    GlyphEntry {
        key: run.text.clone(),
        kind: GlyphKind::Payload,
        descriptor: descriptors.join("+"),
        principle: "synthesized compound".to_string(),
        confidence: sum / count as f64,
    }
}
