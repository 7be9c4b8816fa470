//! Program composition: position tags, confidence aggregation, gloss text.

use serde::Serialize;

use crate::bind::BinderInput;
use crate::pair::Pairing;

/// Position of a step within its program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Initial,
    Medial,
    Final,
    /// Single-step program: simultaneously initial and final.
    Sole,
}

impl Position {
    pub fn is_initial(self) -> bool {
        matches!(self, Position::Initial | Position::Sole)
    }

    pub fn is_final(self) -> bool {
        matches!(self, Position::Final | Position::Sole)
    }
}

/// One step of a decoded program.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    /// 0-based position within the program.
    pub index: usize,
    pub operator: Option<crate::resolve::Token>,
    pub payload: Option<crate::resolve::Token>,
    pub position: Position,
    /// Mean of the operator and payload confidences when both sides are
    /// present, otherwise the present side's confidence alone.
    pub confidence: f64,
}

/// A fully decoded wordform.
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    /// The normalized surface this program was decoded from.
    pub surface: String,
    pub steps: Vec<Step>,
    /// Deterministic one-line reading of the program.
    pub gloss: String,
    /// Arithmetic mean of the step confidences.
    pub confidence: f64,
}

impl Program {
    /// Matched operator surfaces, in step order.
    pub fn operators(&self) -> Vec<String> {
        self.steps
            .iter()
            .filter_map(|s| s.operator.as_ref().map(|t| t.text.clone()))
            .collect()
    }

    /// Matched payload surfaces, in step order.
    pub fn payloads(&self) -> Vec<String> {
        self.steps
            .iter()
            .filter_map(|s| s.payload.as_ref().map(|t| t.text.clone()))
            .collect()
    }

    /// Export for the external graph binder: operator descriptors and
    /// payload type names only.
    pub fn binder_input(&self) -> BinderInput {
        BinderInput {
            operator_path: self
                .steps
                .iter()
                .filter_map(|s| s.operator.as_ref().map(|t| t.entry.descriptor.clone()))
                .collect(),
            payload_schema: self
                .steps
                .iter()
                .filter_map(|s| s.payload.as_ref().map(|t| t.entry.descriptor.clone()))
                .collect(),
        }
    }
}

fn step_confidence(pairing: &Pairing) -> f64 {
    match (&pairing.operator, &pairing.payload) {
        (Some(op), Some(pl)) => (op.entry.confidence + pl.entry.confidence) / 2.0,
        (Some(op), None) => op.entry.confidence,
        (None, Some(pl)) => pl.entry.confidence,
        (None, None) => 0.0,
    }
}

fn position_of(index: usize, len: usize) -> Position {
    if len == 1 {
        Position::Sole
    } else if index == 0 {
        Position::Initial
    } else if index == len - 1 {
        Position::Final
    } else {
        Position::Medial
    }
}

/// Render the gloss: operator descriptors joined with ` → `, then the last
/// non-null payload descriptor appended parenthetically.
fn gloss(steps: &[Step]) -> String {
    let operators: Vec<&str> = steps
        .iter()
        .filter_map(|s| s.operator.as_ref().map(|t| t.entry.descriptor.as_str()))
        .collect();
    let payload = steps
        .iter()
        .rev()
        .find_map(|s| s.payload.as_ref().map(|t| t.entry.descriptor.as_str()));

    match (operators.is_empty(), payload) {
        (false, Some(p)) => format!("{} ({p})", operators.join(" → ")),
        (false, None) => operators.join(" → "),
        (true, Some(p)) => format!("({p})"),
        (true, None) => String::new(),
    }
}

/// Compose pairings into a [`Program`].
pub fn compose(surface: String, pairings: Vec<Pairing>) -> Program {
    let len = pairings.len();
    let steps: Vec<Step> = pairings
        .into_iter()
        .enumerate()
        .map(|(i, pairing)| {
            let confidence = step_confidence(&pairing);
            Step {
                index: i,
                operator: pairing.operator,
                payload: pairing.payload,
                position: position_of(i, len),
                confidence,
            }
        })
        .collect();

    let confidence = if steps.is_empty() {
        0.0
    } else {
        steps.iter().map(|s| s.confidence).sum::<f64>() / steps.len() as f64
    };
    let gloss = gloss(&steps);

    Program {
        surface,
        steps,
        gloss,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::pair;
    use crate::segment::{normalize, segment};
    use crate::table::GlyphTable;

    fn decode(word: &str) -> Program {
        let table = GlyphTable::seeded();
        let runs = segment(word).unwrap();
        let pairings = pair(&runs, &table);
        compose(normalize(word), pairings)
    }

    #[test]
    fn ask_gloss_names_the_cluster_and_payload() {
        let program = decode("ask");
        assert_eq!(program.gloss, "stream → clamp (base_type)");
        assert_eq!(program.operators(), vec!["sk"]);
        assert_eq!(program.payloads(), vec!["a"]);
    }

    #[test]
    fn give_positions_are_initial_and_final() {
        let program = decode("give");
        assert_eq!(program.steps.len(), 2);
        assert_eq!(program.steps[0].position, Position::Initial);
        assert_eq!(program.steps[1].position, Position::Final);
        assert!(program.steps[0].position.is_initial());
        assert!(!program.steps[0].position.is_final());
    }

    #[test]
    fn sole_step_is_both_initial_and_final() {
        let program = decode("go");
        assert_eq!(program.steps.len(), 1);
        assert_eq!(program.steps[0].position, Position::Sole);
        assert!(program.steps[0].position.is_initial());
        assert!(program.steps[0].position.is_final());
    }

    #[test]
    fn medial_positions_in_longer_words() {
        let program = decode("structure");
        let positions: Vec<Position> = program.steps.iter().map(|s| s.position).collect();
        assert_eq!(
            positions,
            vec![
                Position::Initial,
                Position::Medial,
                Position::Medial,
                Position::Final,
            ]
        );
        for (i, step) in program.steps.iter().enumerate() {
            assert_eq!(step.index, i);
        }
    }

    #[test]
    fn step_confidence_uses_present_side_alone() {
        let program = decode("ox");
        // Null-operator step carries the payload confidence of "o".
        assert!((program.steps[0].confidence - 0.90).abs() < 1e-9);
        // Null-payload step carries the operator confidence of "x".
        assert!((program.steps[1].confidence - 0.85).abs() < 1e-9);
        assert!((program.confidence - 0.875).abs() < 1e-9);
    }

    #[test]
    fn aggregate_confidence_is_mean_of_steps() {
        let program = decode("give");
        let expected: f64 = program.steps.iter().map(|s| s.confidence).sum::<f64>()
            / program.steps.len() as f64;
        assert!((program.confidence - expected).abs() < 1e-12);
    }

    #[test]
    fn all_vowel_word_glosses_payload_only() {
        let program = decode("eau");
        assert!(program.operators().is_empty());
        assert_eq!(program.gloss, "(relation+base_type+struct)");
    }

    #[test]
    fn binder_input_carries_descriptors_only() {
        let input = decode("ask").binder_input();
        assert_eq!(input.operator_path, vec!["stream → clamp"]);
        assert_eq!(input.payload_schema, vec!["base_type"]);
    }

    #[test]
    fn composition_is_deterministic() {
        let a = decode("strength");
        let b = decode("strength");
        assert_eq!(a.gloss, b.gloss);
        assert_eq!(a.confidence, b.confidence);
    }
}
