use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
/// The author of a message
pub enum Role {
    User,
    Assistant,
    System,
    /// Carries tool results only; never rendered on its own
    Tool,
}
