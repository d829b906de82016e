use serde::{Deserialize, Serialize};

use super::range::HandlerRange;

/// A function the scanner believes a serverless runtime could invoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerCandidate {
    /// Fully qualified handler, e.g. `app.handler`
    pub handler_name: String,
    pub range: HandlerRange,
}

impl HandlerCandidate {
    pub fn new(handler_name: impl Into<String>, range: impl Into<HandlerRange>) -> Self {
        Self {
            handler_name: handler_name.into(),
            range: range.into(),
        }
    }
}
