use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledAddress {
    pub address: String,
    pub label: String,
}

/// Extra infrastructure addresses appended to the built-in tables at start-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub mixers: Vec<LabeledAddress>,
    pub bridges: Vec<LabeledAddress>,
    pub exchanges: Vec<LabeledAddress>,
}
