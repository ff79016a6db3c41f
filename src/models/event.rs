use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::{Resource, nullable, patch, require_str};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub title: String,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventPatch {
    pub title: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub date: Option<Option<DateTime<Utc>>>,
    #[serde(deserialize_with = "nullable")]
    pub time: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub location: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub organizer: Option<Option<String>>,
}

impl Resource for Event {
    const COLLECTION: &'static str = "events";
    type Patch = EventPatch;

    fn validate(&self) -> Result<(), String> {
        require_str(&self.title, "Title")
    }

    fn apply(&mut self, p: EventPatch) {
        patch(&mut self.title, p.title);
        patch(&mut self.description, p.description);
        patch(&mut self.date, p.date);
        patch(&mut self.time, p.time);
        patch(&mut self.location, p.location);
        patch(&mut self.organizer, p.organizer);
    }
}
