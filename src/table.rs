//! Fixed glyph table: single glyphs and curated clusters mapped to semantic
//! descriptors with confidence ratings.
//!
//! The table is built once at startup and shared process-wide. The only
//! mutation path is [`GlyphTable::learn`], which adjusts a stored confidence
//! under the entry's own lock, so concurrent readers observe either the old
//! or the new value, never a torn write. Overlapping cluster keys (e.g. `st`
//! and `str`) are permitted; precedence among them is resolver policy, not a
//! table property.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, TableError, UskResult};

/// Kind of a glyph entry: consonant-derived operators, vowel-derived payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphKind {
    /// Semantic "verb" assigned to a consonant glyph or cluster.
    Operator,
    /// Semantic "typed value" assigned to a vowel glyph or cluster.
    Payload,
}

impl fmt::Display for GlyphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphKind::Operator => write!(f, "operator"),
            GlyphKind::Payload => write!(f, "payload"),
        }
    }
}

impl FromStr for GlyphKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "operator" | "op" => Ok(GlyphKind::Operator),
            "payload" | "val" => Ok(GlyphKind::Payload),
            other => Err(format!("unknown glyph kind: {other}")),
        }
    }
}

/// One entry in the glyph table.
#[derive(Debug, Clone, Serialize)]
pub struct GlyphEntry {
    /// Lowercase glyph or cluster string.
    pub key: String,
    /// Operator or payload.
    pub kind: GlyphKind,
    /// Action phrase (operators) or type name (payloads). Cluster operators
    /// carry their component actions joined with ` → `; composite payloads
    /// carry their component types joined with `+`.
    pub descriptor: String,
    /// Short rationale for the assignment.
    pub principle: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl GlyphEntry {
    fn new(key: &str, kind: GlyphKind, descriptor: &str, principle: &str, confidence: f64) -> Self {
        Self {
            key: key.to_string(),
            kind,
            descriptor: descriptor.to_string(),
            principle: principle.to_string(),
            confidence,
        }
    }
}

type TableKey = (String, GlyphKind);

/// The glyph table: `(key, kind)` → [`GlyphEntry`].
///
/// Entry-level locking via `DashMap` gives the single-writer/many-reader
/// discipline the calibration path requires.
pub struct GlyphTable {
    entries: DashMap<TableKey, GlyphEntry>,
    /// Length in bytes of the longest operator key, bounding the resolver scan.
    max_operator_key_len: usize,
}

impl GlyphTable {
    /// Build the table from the seed data.
    pub fn seeded() -> Self {
        let entries = DashMap::new();
        let mut max_operator_key_len = 1;

        for entry in seed_entries() {
            if entry.kind == GlyphKind::Operator {
                max_operator_key_len = max_operator_key_len.max(entry.key.len());
            }
            entries.insert((entry.key.clone(), entry.kind), entry);
        }

        Self {
            entries,
            max_operator_key_len,
        }
    }

    /// Look up an entry by key and kind. Clones the entry out so the caller
    /// holds no table lock.
    pub fn lookup(&self, key: &str, kind: GlyphKind) -> Result<GlyphEntry, TableError> {
        self.entries
            .get(&(key.to_string(), kind))
            .map(|r| r.value().clone())
            .ok_or_else(|| TableError::NotFound {
                key: key.to_string(),
                kind,
            })
    }

    /// Whether an entry exists for the key/kind.
    pub fn contains(&self, key: &str, kind: GlyphKind) -> bool {
        self.entries.contains_key(&(key.to_string(), kind))
    }

    /// Adjust a stored confidence by `delta`, clamped to `[0, 1]`.
    ///
    /// This is the sole mutation path. The update happens under the entry's
    /// lock; subsequent decodes observe the new value immediately.
    /// Returns `(old, new)` confidence.
    pub fn learn(&self, key: &str, kind: GlyphKind, delta: f64) -> Result<(f64, f64), TableError> {
        let mut entry = self
            .entries
            .get_mut(&(key.to_string(), kind))
            .ok_or_else(|| TableError::NotFound {
                key: key.to_string(),
                kind,
            })?;
        let old = entry.confidence;
        let new = (old + delta).clamp(0.0, 1.0);
        entry.confidence = new;
        tracing::debug!(key, %kind, old, new, "calibrated glyph confidence");
        Ok((old, new))
    }

    /// Length in bytes of the longest operator key.
    pub fn max_operator_key_len(&self) -> usize {
        self.max_operator_key_len
    }

    /// All entries, sorted by kind then key, for listing and export.
    pub fn all(&self) -> Vec<GlyphEntry> {
        let mut out: Vec<GlyphEntry> = self.entries.iter().map(|r| r.value().clone()).collect();
        out.sort_by(|a, b| (a.kind == GlyphKind::Payload, &a.key).cmp(&(b.kind == GlyphKind::Payload, &b.key)));
        out
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // -----------------------------------------------------------------------
    // Calibration persistence
    // -----------------------------------------------------------------------

    /// Save calibrated confidences (entries whose confidence differs from the
    /// seed value) as TOML.
    pub fn save_calibration(&self, path: &Path) -> UskResult<()> {
        let seeds: std::collections::HashMap<TableKey, f64> = seed_entries()
            .into_iter()
            .map(|e| ((e.key.clone(), e.kind), e.confidence))
            .collect();

        let mut overrides = Vec::new();
        for entry in self.entries.iter() {
            let e = entry.value();
            let seeded = seeds.get(&(e.key.clone(), e.kind)).copied();
            if seeded != Some(e.confidence) {
                overrides.push(CalibrationEntry {
                    key: e.key.clone(),
                    kind: e.kind,
                    confidence: e.confidence,
                });
            }
        }
        overrides.sort_by(|a, b| (a.key.clone(), a.kind == GlyphKind::Payload).cmp(&(b.key.clone(), b.kind == GlyphKind::Payload)));

        let file = CalibrationFile { entry: overrides };
        let text = toml::to_string_pretty(&file).map_err(|e| LedgerError::Serialization {
            message: format!("failed to serialize calibration: {e}"),
        })?;
        std::fs::write(path, text).map_err(|e| LedgerError::Io { source: e })?;
        Ok(())
    }

    /// Load calibrated confidences from a TOML file, if it exists.
    ///
    /// Overrides for unknown keys are skipped with a warning rather than
    /// failing the load.
    pub fn load_calibration(&self, path: &Path) -> UskResult<usize> {
        if !path.exists() {
            return Ok(0);
        }
        let text = std::fs::read_to_string(path).map_err(|e| LedgerError::Io { source: e })?;
        let file: CalibrationFile = toml::from_str(&text).map_err(|e| LedgerError::Serialization {
            message: format!("failed to parse calibration at {}: {e}", path.display()),
        })?;

        let mut applied = 0;
        for cal in file.entry {
            match self.entries.get_mut(&(cal.key.clone(), cal.kind)) {
                Some(mut entry) => {
                    entry.confidence = cal.confidence.clamp(0.0, 1.0);
                    applied += 1;
                }
                None => {
                    tracing::warn!(key = %cal.key, kind = %cal.kind, "calibration override for unknown glyph, skipping");
                }
            }
        }
        Ok(applied)
    }
}

impl fmt::Debug for GlyphTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphTable")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// On-disk calibration record.
#[derive(Debug, Serialize, Deserialize)]
struct CalibrationEntry {
    key: String,
    kind: GlyphKind,
    confidence: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CalibrationFile {
    #[serde(default)]
    entry: Vec<CalibrationEntry>,
}

/// The seed data: all single vowels and consonants plus curated clusters.
fn seed_entries() -> Vec<GlyphEntry> {
    use GlyphKind::{Operator, Payload};

    let mut entries = Vec::with_capacity(64);

    // -- Single vowels: typed payloads --
    entries.push(GlyphEntry::new("a", Payload, "base_type", "aperture/origin", 0.95));
    entries.push(GlyphEntry::new("e", Payload, "relation", "reflexive-relational", 0.90));
    entries.push(GlyphEntry::new("i", Payload, "index", "minimal unit", 0.95));
    entries.push(GlyphEntry::new("o", Payload, "container", "wholeness", 0.90));
    entries.push(GlyphEntry::new("u", Payload, "struct", "root/union", 0.85));
    entries.push(GlyphEntry::new("y", Payload, "branch", "bifurcated value", 0.80));

    // -- Single consonants: operators --
    entries.push(GlyphEntry::new("b", Operator, "bind", "boundary/bulge left", 0.85));
    entries.push(GlyphEntry::new("c", Operator, "contain", "curve/gather approach", 0.90));
    entries.push(GlyphEntry::new("d", Operator, "decide", "delineate/door right", 0.85));
    entries.push(GlyphEntry::new("f", Operator, "flow", "fork/friction split", 0.90));
    entries.push(GlyphEntry::new("g", Operator, "grasp", "gate/gather return", 0.85));
    entries.push(GlyphEntry::new("h", Operator, "animate", "breath/aspiration", 0.80));
    entries.push(GlyphEntry::new("j", Operator, "project", "jet/joint trajectory", 0.75));
    entries.push(GlyphEntry::new("k", Operator, "clamp", "cut/classify branch", 0.95));
    entries.push(GlyphEntry::new("l", Operator, "align", "line/level lateral", 0.90));
    entries.push(GlyphEntry::new("m", Operator, "multiply", "matrix/mass accumulate", 0.95));
    entries.push(GlyphEntry::new("n", Operator, "negate", "next/not alternative", 0.85));
    entries.push(GlyphEntry::new("p", Operator, "present", "press/project emerge", 0.80));
    entries.push(GlyphEntry::new("q", Operator, "query", "query outlet from whole", 0.85));
    entries.push(GlyphEntry::new("r", Operator, "rotate", "route/recur vibration", 0.90));
    entries.push(GlyphEntry::new("s", Operator, "stream", "scan/scatter flow", 0.95));
    entries.push(GlyphEntry::new("t", Operator, "instantiate", "terminal/tool pin", 0.95));
    entries.push(GlyphEntry::new("v", Operator, "vector", "vector/channel directed", 0.85));
    entries.push(GlyphEntry::new("w", Operator, "web", "wave/web dual channels", 0.90));
    entries.push(GlyphEntry::new("x", Operator, "cross", "nexus intersection", 0.85));
    entries.push(GlyphEntry::new("z", Operator, "quantize", "zip/signal discretize", 0.75));

    // -- Consonant clusters --
    entries.push(GlyphEntry::new("st", Operator, "stream → instantiate", "flow to a point", 0.90));
    entries.push(GlyphEntry::new("tr", Operator, "instantiate → rotate", "structure under rotation", 0.85));
    entries.push(GlyphEntry::new("pl", Operator, "present → align", "present then align", 0.80));
    entries.push(GlyphEntry::new("str", Operator, "stream → instantiate → rotate", "flow, pin, stabilize", 0.85));
    entries.push(GlyphEntry::new("spr", Operator, "stream → present → rotate", "flow, emerge, distribute", 0.80));
    entries.push(GlyphEntry::new("sk", Operator, "stream → clamp", "scan and select", 0.95));
    entries.push(GlyphEntry::new("sc", Operator, "stream → clamp", "scan and select (variant)", 0.90));
    entries.push(GlyphEntry::new("gr", Operator, "grasp → rotate", "grab and turn", 0.85));
    entries.push(GlyphEntry::new("br", Operator, "bind → rotate", "bind and revolve", 0.80));
    entries.push(GlyphEntry::new("cr", Operator, "contain → rotate", "encircle", 0.80));
    entries.push(GlyphEntry::new("dr", Operator, "decide → rotate", "determine direction", 0.75));
    entries.push(GlyphEntry::new("fr", Operator, "flow → rotate", "fluid rotation", 0.80));
    entries.push(GlyphEntry::new("pr", Operator, "present → rotate", "present with rotation", 0.75));
    entries.push(GlyphEntry::new("ld", Operator, "align → decide", "modal align/decide", 0.70));
    entries.push(GlyphEntry::new("ght", Operator, "grasp → animate → instantiate", "grasp, breathe, pin", 0.65));
    entries.push(GlyphEntry::new("th", Operator, "instantiate → animate", "pin and breathe (abstract)", 0.85));
    entries.push(GlyphEntry::new("wh", Operator, "web → animate", "web and breathe (query)", 0.75));
    entries.push(GlyphEntry::new("ch", Operator, "contain → animate", "contain and breathe (check)", 0.70));
    entries.push(GlyphEntry::new("sh", Operator, "stream → animate", "stream and breathe (smooth)", 0.75));

    // -- Vowel clusters: composite payloads --
    entries.push(GlyphEntry::new("ae", Payload, "base_type+relation", "open then relate", 0.75));
    entries.push(GlyphEntry::new("ai", Payload, "base_type+index", "open then point", 0.80));
    entries.push(GlyphEntry::new("ea", Payload, "relation+base_type", "relate then open", 0.85));
    entries.push(GlyphEntry::new("ee", Payload, "relation+relation", "sustained relation", 0.85));
    entries.push(GlyphEntry::new("ie", Payload, "index+relation", "point then relate", 0.80));
    entries.push(GlyphEntry::new("io", Payload, "index+container", "point into whole", 0.85));
    entries.push(GlyphEntry::new("oo", Payload, "container+container", "doubled enclosure", 0.85));
    entries.push(GlyphEntry::new("ou", Payload, "container+struct", "whole over channel", 0.80));
    entries.push(GlyphEntry::new("ue", Payload, "struct+relation", "channel then relate", 0.75));

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_table_covers_all_letters() {
        let table = GlyphTable::seeded();
        for v in ["a", "e", "i", "o", "u", "y"] {
            assert!(table.contains(v, GlyphKind::Payload), "missing payload {v}");
        }
        for c in "bcdfghjklmnpqrstvwxz".chars() {
            assert!(
                table.contains(&c.to_string(), GlyphKind::Operator),
                "missing operator {c}"
            );
        }
    }

    #[test]
    fn lookup_by_key_and_kind() {
        let table = GlyphTable::seeded();
        let sk = table.lookup("sk", GlyphKind::Operator).unwrap();
        assert_eq!(sk.descriptor, "stream → clamp");
        assert_eq!(sk.confidence, 0.95);
    }

    #[test]
    fn lookup_unknown_returns_not_found() {
        let table = GlyphTable::seeded();
        let err = table.lookup("zz", GlyphKind::Operator).unwrap_err();
        assert!(matches!(err, TableError::NotFound { .. }));
    }

    #[test]
    fn kinds_do_not_collide() {
        let table = GlyphTable::seeded();
        // "y" is seeded as a payload only.
        assert!(table.contains("y", GlyphKind::Payload));
        assert!(!table.contains("y", GlyphKind::Operator));
    }

    #[test]
    fn max_operator_key_len_spans_trigraphs() {
        let table = GlyphTable::seeded();
        assert_eq!(table.max_operator_key_len(), 3);
    }

    #[test]
    fn learn_adjusts_and_clamps() {
        let table = GlyphTable::seeded();
        let (old, new) = table.learn("p", GlyphKind::Operator, 0.1).unwrap();
        assert!((old - 0.80).abs() < 1e-9);
        assert!((new - 0.90).abs() < 1e-9);

        // Clamp at 1.0.
        let (_, clamped) = table.learn("p", GlyphKind::Operator, 0.5).unwrap();
        assert_eq!(clamped, 1.0);

        // Clamp at 0.0.
        let (_, floored) = table.learn("p", GlyphKind::Operator, -2.0).unwrap();
        assert_eq!(floored, 0.0);
    }

    #[test]
    fn learn_unknown_key_fails() {
        let table = GlyphTable::seeded();
        assert!(table.learn("zz", GlyphKind::Operator, 0.1).is_err());
    }

    #[test]
    fn confidences_within_unit_interval() {
        for entry in GlyphTable::seeded().all() {
            assert!(
                (0.0..=1.0).contains(&entry.confidence),
                "{} out of range",
                entry.key
            );
        }
    }

    #[test]
    fn calibration_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("calibration.toml");

        let table = GlyphTable::seeded();
        table.learn("p", GlyphKind::Operator, 0.1).unwrap();
        table.save_calibration(&path).unwrap();

        let fresh = GlyphTable::seeded();
        let applied = fresh.load_calibration(&path).unwrap();
        assert_eq!(applied, 1);
        let p = fresh.lookup("p", GlyphKind::Operator).unwrap();
        assert!((p.confidence - 0.90).abs() < 1e-9);
    }

    #[test]
    fn load_missing_calibration_is_noop() {
        let dir = tempfile::TempDir::new().unwrap();
        let table = GlyphTable::seeded();
        let applied = table.load_calibration(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(applied, 0);
    }

    #[test]
    fn glyph_kind_parses() {
        assert_eq!("operator".parse::<GlyphKind>().unwrap(), GlyphKind::Operator);
        assert_eq!("Payload".parse::<GlyphKind>().unwrap(), GlyphKind::Payload);
        assert!("verb".parse::<GlyphKind>().is_err());
    }
}
