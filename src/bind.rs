//! Export surface for the external graph binder.
//!
//! The binder consumes only the ordered operator path and the payload type
//! schema of a decoded program. It never sees spans, confidences, or the
//! surface form; graph storage lives entirely outside this crate.

use serde::{Deserialize, Serialize};

/// Input handed to the graph binder for one decoded program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinderInput {
    /// Operator descriptors in step order.
    pub operator_path: Vec<String>,
    /// Payload type names in step order.
    pub payload_schema: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_lists() {
        let input = BinderInput {
            operator_path: vec!["stream → clamp".into()],
            payload_schema: vec!["base_type".into()],
        };
        let json = serde_json::to_string(&input).unwrap();
        let back: BinderInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, input);
    }
}
