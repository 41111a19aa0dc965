use serde::Deserialize;

/// What a bound key does: the nudge actions are polled as held state once per
/// tick, `Shake` fires on the press edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Action {
    #[serde(rename = "LEFT")]
    NudgeLeft,
    #[serde(rename = "RIGHT")]
    NudgeRight,
    #[serde(rename = "UP")]
    NudgeUp,
    #[serde(rename = "DOWN")]
    NudgeDown,
    #[serde(rename = "SHAKE")]
    Shake,
}
