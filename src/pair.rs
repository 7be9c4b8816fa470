//! Adjacency pairing of operator and payload tokens.
//!
//! Runs are walked in source order. An operator token pairs with the vowel
//! run immediately following it; a vowel run is consumed by at most one
//! operator. In a multi-token consonant run only the last token may claim
//! the following vowel run; earlier tokens emit null-payload pairings. A
//! vowel run nothing claims (word-initial, or after a fully-emitted run)
//! stands alone as a null-operator pairing.

use crate::resolve::{resolve_operators, resolve_payload, Token};
use crate::segment::{Run, RunClass};
use crate::table::GlyphTable;

/// One operator/payload adjacency. At least one side is always present.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Pairing {
    pub operator: Option<Token>,
    pub payload: Option<Token>,
}

/// Pair the runs of a segmented word into ordered operator/payload steps.
pub fn pair(runs: &[Run], table: &GlyphTable) -> Vec<Pairing> {
    let mut pairings = Vec::new();
    let mut consumed_next_vowel = false;

    for (i, run) in runs.iter().enumerate() {
        match run.class {
            RunClass::Consonant => {
                let tokens = resolve_operators(run, table);
                let last = tokens.len().saturating_sub(1);
                for (j, token) in tokens.into_iter().enumerate() {
                    let payload = if j == last {
                        runs.get(i + 1)
                            .filter(|next| next.class == RunClass::Vowel)
                            .map(|next| {
                                consumed_next_vowel = true;
                                resolve_payload(next, table)
                            })
                    } else {
                        None
                    };
                    pairings.push(Pairing {
                        operator: Some(token),
                        payload,
                    });
                }
            }
            RunClass::Vowel => {
                if consumed_next_vowel {
                    consumed_next_vowel = false;
                } else {
                    pairings.push(Pairing {
                        operator: None,
                        payload: Some(resolve_payload(run, table)),
                    });
                }
            }
        }
    }

    pairings
}
