//! # usk
//!
//! A semantic wordform factorizer. Decodes a word into an ordered program of
//! **operator** (consonant-derived) and **payload** (vowel-derived) tokens
//! against a fixed, confidence-rated glyph table, then composes the result
//! into a deterministic [`Program`](compose::Program) with a generated gloss
//! and an aggregate confidence score.
//!
//! ## Pipeline
//!
//! - **Glyph table** (`table`): immutable lookup of glyphs/clusters, mutated
//!   only through explicit calibration
//! - **Segmenter** (`segment`): maximal alternating consonant/vowel runs
//! - **Cluster resolver** (`resolve`): longest-match-first tokenization
//! - **Pairer** (`pair`): adjacency pairing of operators and payloads
//! - **Composer** (`compose`): position tags, confidence, gloss
//!
//! Data flows strictly left to right: surface → runs → tokens → paired
//! steps → program. Decoding is pure and single-threaded; batches may be
//! parallelized freely by the caller.
//!
//! ## Library usage
//!
//! ```
//! use usk::decoder::{Decoder, DecoderConfig};
//!
//! let decoder = Decoder::new(DecoderConfig::default()).unwrap();
//! let program = decoder.decode("ask").unwrap();
//! assert_eq!(program.gloss, "stream → clamp (base_type)");
//! ```

pub mod bind;
pub mod compose;
pub mod decoder;
pub mod error;
pub mod ledger;
pub mod pair;
pub mod resolve;
pub mod segment;
pub mod table;
