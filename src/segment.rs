//! Surface normalization and run segmentation.
//!
//! A surface wordform is NFC-normalized and lowercased, then split into
//! maximal runs of same-class characters. Vowel class is exactly
//! `{a, e, i, o, u, y}`; every other alphabetic character is consonant class.
//! Runs carry byte offsets into the normalized surface and partition it
//! exactly, alternating class.

use unicode_normalization::UnicodeNormalization;

use crate::error::SegmentError;

/// Character class of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunClass {
    Vowel,
    Consonant,
}

/// A maximal same-class span of the normalized surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub class: RunClass,
    /// Byte offset of the run start in the normalized surface.
    pub start: usize,
    /// Byte offset one past the run end.
    pub end: usize,
}

/// NFC-normalize and lowercase a surface form.
pub fn normalize(surface: &str) -> String {
    surface.nfc().collect::<String>().to_lowercase()
}

fn classify(ch: char) -> RunClass {
    match ch {
        'a' | 'e' | 'i' | 'o' | 'u' | 'y' => RunClass::Vowel,
        _ => RunClass::Consonant,
    }
}

/// Split a surface wordform into alternating vowel/consonant runs.
///
/// Empty input and non-alphabetic characters are rejected, not dropped.
pub fn segment(surface: &str) -> Result<Vec<Run>, SegmentError> {
    let normalized = normalize(surface);
    if normalized.is_empty() {
        return Err(SegmentError::EmptyInput);
    }

    let mut runs: Vec<Run> = Vec::new();
    for (offset, ch) in normalized.char_indices() {
        if !ch.is_alphabetic() {
            return Err(SegmentError::InvalidCharacter { ch, offset });
        }
        let class = classify(ch);
        match runs.last_mut() {
            Some(run) if run.class == class => {
                run.text.push(ch);
                run.end = offset + ch.len_utf8();
            }
            _ => runs.push(Run {
                text: ch.to_string(),
                class,
                start: offset,
                end: offset + ch.len_utf8(),
            }),
        }
    }
    Ok(runs)
}
