use crate::checklist::split_positions;
use serde::{Deserialize, Serialize};

/// Role carried in the stored user profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Elevated oversight role; may switch the list to all positions.
    #[serde(alias = "admin", alias = "command")]
    Oversight,
    /// Unrecognised stored roles fall back here.
    #[default]
    #[serde(other)]
    Member,
}

/// Serialized user profile kept in durable storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub positions: Vec<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserProfile {
    pub fn new(positions: Vec<String>, role: Role) -> Self {
        Self { positions, role }
    }

    /// Build a profile from a comma-joined position list.
    pub fn from_position_list(raw: &str, role: Role) -> Self {
        Self {
            positions: split_positions(raw).map(str::to_string).collect(),
            role,
        }
    }

    /// The first listed position.
    pub fn primary_position(&self) -> Option<&str> {
        self.positions
            .iter()
            .map(|p| p.trim())
            .find(|p| !p.is_empty())
    }

    pub fn can_view_all_positions(&self) -> bool {
        self.role == Role::Oversight
    }
}
