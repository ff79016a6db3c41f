use serde::{Deserialize, Serialize};

use super::document::{Resource, nullable, patch, require_str};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Club {
    pub name: String,
    pub description: String,
    pub long_description: Option<String>,
    pub tag: String,
    /// 图标名称，例如 `Code`、`Music`
    pub icon: String,
    pub color: Option<String>,
    pub president: Option<String>,
    pub vice_president: Option<String>,
    /// 展示用文本，例如 `80+ active members`
    pub member_count: Option<String>,
    pub members: Vec<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClubPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub long_description: Option<Option<String>>,
    pub tag: Option<String>,
    pub icon: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub color: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub president: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub vice_president: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub member_count: Option<Option<String>>,
    pub members: Option<Vec<String>>,
    pub achievements: Option<Vec<String>>,
}

impl Resource for Club {
    const COLLECTION: &'static str = "clubs";
    type Patch = ClubPatch;

    fn validate(&self) -> Result<(), String> {
        require_str(&self.name, "name")?;
        require_str(&self.description, "description")?;
        require_str(&self.tag, "tag")?;
        require_str(&self.icon, "icon")
    }

    fn apply(&mut self, p: ClubPatch) {
        patch(&mut self.name, p.name);
        patch(&mut self.description, p.description);
        patch(&mut self.long_description, p.long_description);
        patch(&mut self.tag, p.tag);
        patch(&mut self.icon, p.icon);
        patch(&mut self.color, p.color);
        patch(&mut self.president, p.president);
        patch(&mut self.vice_president, p.vice_president);
        patch(&mut self.member_count, p.member_count);
        patch(&mut self.members, p.members);
        patch(&mut self.achievements, p.achievements);
    }
}
