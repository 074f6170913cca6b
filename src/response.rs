use serde::{Deserialize, Serialize};

/// Body returned by a successful shuffle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleResponse {
    pub shuffled_sequence: Vec<u64>,
}

impl ShuffleResponse {
    pub fn new(shuffled_sequence: Vec<u64>) -> Self {
        Self { shuffled_sequence }
    }
}
