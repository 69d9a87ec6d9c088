use serde::{Deserialize, Serialize};

/// A trait carried by a mobile agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentTrait {
    /// Skill that scales the performance of deployed power equipment.
    PowerSkill { value: f32 },
    /// Any trait with no bearing on power equipment.
    Other { name: String },
}

/// A single-part mobile agent, such as a crew member on foot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MobileAgent {
    pub traits: Vec<AgentTrait>,
}

impl MobileAgent {
    pub fn with_power_skill(value: f32) -> Self {
        Self {
            traits: vec![AgentTrait::PowerSkill { value }],
        }
    }

    /// Modifier value of the first power skill, if any.
    pub fn power_skill(&self) -> Option<f32> {
        self.traits.iter().find_map(|t| match t {
            AgentTrait::PowerSkill { value } => Some(*value),
            AgentTrait::Other { .. } => None,
        })
    }
}
