//! Persistence tests: calibration survives reopen, ledger accumulates.

use tempfile::TempDir;

use usk::decoder::{Decoder, DecoderConfig};
use usk::table::GlyphKind;

fn decoder_at(dir: &TempDir) -> Decoder {
    Decoder::new(DecoderConfig {
        data_dir: Some(dir.path().to_path_buf()),
    })
    .unwrap()
}

#[test]
fn calibration_survives_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let decoder = decoder_at(&dir);
        decoder.learn("p", GlyphKind::Operator, 0.1).unwrap();
    }

    let reopened = decoder_at(&dir);
    let p = reopened.table().lookup("p", GlyphKind::Operator).unwrap();
    assert!((p.confidence - 0.90).abs() < 1e-9);
}

#[test]
fn uncalibrated_glyphs_keep_seed_values_after_reopen() {
    let dir = TempDir::new().unwrap();
    decoder_at(&dir).learn("p", GlyphKind::Operator, 0.1).unwrap();

    let reopened = decoder_at(&dir);
    let s = reopened.table().lookup("s", GlyphKind::Operator).unwrap();
    assert_eq!(s.confidence, 0.95);
}

#[test]
fn recorded_decodes_accumulate_in_the_ledger() {
    let dir = TempDir::new().unwrap();
    let decoder = decoder_at(&dir);

    for word in ["ask", "give", "ox"] {
        let program = decoder.decode(word).unwrap();
        decoder.record(&program).unwrap();
    }

    let records = decoder.ledger().unwrap().read_all().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].surface, "ask");
    assert_eq!(records[0].gloss, "stream → clamp (base_type)");
    assert_eq!(records[2].operators, vec!["x"]);
    assert!(records[0].provenance.starts_with("usk "));
}

#[test]
fn ledger_survives_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let decoder = decoder_at(&dir);
        let program = decoder.decode("ask").unwrap();
        decoder.record(&program).unwrap();
    }

    let reopened = decoder_at(&dir);
    let program = reopened.decode("give").unwrap();
    reopened.record(&program).unwrap();

    let records = reopened.ledger().unwrap().read_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].surface, "ask");
    assert_eq!(records[1].surface, "give");
}

#[test]
fn calibrated_confidence_flows_into_new_records() {
    let dir = TempDir::new().unwrap();
    let decoder = decoder_at(&dir);

    let before = decoder.decode("pat").unwrap();
    decoder.learn("p", GlyphKind::Operator, 0.1).unwrap();
    let after = decoder.decode("pat").unwrap();

    decoder.record(&before).unwrap();
    decoder.record(&after).unwrap();

    let records = decoder.ledger().unwrap().read_all().unwrap();
    assert!(records[1].confidence > records[0].confidence);
}
