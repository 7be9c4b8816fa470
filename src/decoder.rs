//! The decoder facade: owns the glyph table, runs the pipeline, and wires
//! up calibration and ledger persistence.

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use crate::compose::{compose, Program};
use crate::error::UskResult;
use crate::ledger::{DecodeLedger, DecodeRecord};
use crate::pair::pair;
use crate::segment::{normalize, segment};
use crate::table::{GlyphKind, GlyphTable};

const CALIBRATION_FILE: &str = "calibration.toml";
const LEDGER_FILE: &str = "ledger.jsonl";

/// Decoder configuration.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Directory holding the calibration file and the decode ledger. When
    /// unset, calibration is in-memory only and nothing is recorded.
    pub data_dir: Option<PathBuf>,
}

/// Facade over the full decode pipeline.
///
/// The glyph table is built once and shared; `decode` is pure and
/// synchronous, so a `Decoder` can be shared freely across threads.
pub struct Decoder {
    table: Arc<GlyphTable>,
    config: DecoderConfig,
    ledger: Option<DecodeLedger>,
}

impl Decoder {
    /// Build the decoder: seed the table, then apply calibration overrides
    /// and open the ledger when a data directory is configured.
    pub fn new(config: DecoderConfig) -> UskResult<Self> {
        let table = Arc::new(GlyphTable::seeded());

        let mut ledger = None;
        if let Some(dir) = &config.data_dir {
            let applied = table.load_calibration(&dir.join(CALIBRATION_FILE))?;
            ledger = Some(DecodeLedger::open(dir.join(LEDGER_FILE))?);
            tracing::info!(
                data_dir = %dir.display(),
                calibration_overrides = applied,
                glyphs = table.len(),
                "decoder ready"
            );
        } else {
            tracing::info!(glyphs = table.len(), "decoder ready (ephemeral)");
        }

        Ok(Self {
            table,
            config,
            ledger,
        })
    }

    /// Decode one surface wordform into a [`Program`].
    pub fn decode(&self, surface: &str) -> UskResult<Program> {
        let runs = segment(surface)?;
        let pairings = pair(&runs, &self.table);
        let program = compose(normalize(surface), pairings);
        tracing::debug!(
            surface = %program.surface,
            steps = program.steps.len(),
            confidence = program.confidence,
            "decoded"
        );
        Ok(program)
    }

    /// Decode many wordforms in parallel. Words are independent, so failures
    /// are per-word and order is preserved.
    pub fn decode_batch(&self, surfaces: &[String]) -> Vec<UskResult<Program>> {
        surfaces.par_iter().map(|s| self.decode(s)).collect()
    }

    /// Adjust a glyph confidence, persisting the calibration file when a
    /// data directory is configured. Returns `(old, new)` confidence.
    pub fn learn(&self, key: &str, kind: GlyphKind, delta: f64) -> UskResult<(f64, f64)> {
        let adjusted = self.table.learn(key, kind, delta)?;
        if let Some(dir) = &self.config.data_dir {
            self.table.save_calibration(&dir.join(CALIBRATION_FILE))?;
        }
        Ok(adjusted)
    }

    /// Append a decode record to the ledger. A no-op without a data
    /// directory.
    pub fn record(&self, program: &Program) -> UskResult<()> {
        if let Some(ledger) = &self.ledger {
            let record = DecodeRecord::from_program(
                program,
                format!("usk {}", env!("CARGO_PKG_VERSION")),
            );
            ledger.append(&record)?;
        }
        Ok(())
    }

    /// The decode ledger, when persistence is configured.
    pub fn ledger(&self) -> Option<&DecodeLedger> {
        self.ledger.as_ref()
    }

    /// Shared view of the glyph table.
    pub fn table(&self) -> &GlyphTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_runs_the_full_pipeline() {
        let decoder = Decoder::new(DecoderConfig::default()).unwrap();
        let program = decoder.decode("ask").unwrap();
        assert_eq!(program.gloss, "stream → clamp (base_type)");
    }

    #[test]
    fn decode_is_deterministic_across_calls() {
        let decoder = Decoder::new(DecoderConfig::default()).unwrap();
        let a = decoder.decode("Structure").unwrap();
        let b = decoder.decode("structure").unwrap();
        assert_eq!(a.surface, b.surface);
        assert_eq!(a.gloss, b.gloss);
        assert_eq!(a.confidence, b.confidence);
    }

    #[test]
    fn batch_preserves_order_and_isolates_failures() {
        let decoder = Decoder::new(DecoderConfig::default()).unwrap();
        let words = vec!["ask".to_string(), "no!".to_string(), "ox".to_string()];
        let results = decoder.decode_batch(&words);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn learn_is_visible_to_the_next_decode() {
        let decoder = Decoder::new(DecoderConfig::default()).unwrap();
        let before = decoder.decode("pa").unwrap().confidence;
        decoder.learn("p", GlyphKind::Operator, 0.1).unwrap();
        let after = decoder.decode("pa").unwrap().confidence;
        assert!((after - before - 0.05).abs() < 1e-9);
    }

    #[test]
    fn record_without_data_dir_is_a_noop() {
        let decoder = Decoder::new(DecoderConfig::default()).unwrap();
        let program = decoder.decode("ask").unwrap();
        decoder.record(&program).unwrap();
        assert!(decoder.ledger().is_none());
    }
}
