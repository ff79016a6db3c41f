use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::{Document, Resource, nullable, patch, require_str};
use super::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityType {
    Internship,
    #[serde(rename = "Full-time")]
    FullTime,
    Contract,
    #[serde(rename = "Part-time")]
    PartTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Opportunity {
    pub title: String,
    pub company: String,
    pub role: String,
    pub location: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: Option<OpportunityType>,
    pub eligibility: Option<String>,
    pub skills: Vec<String>,
    pub details: Option<String>,
    /// 由会话用户填充，忽略请求体中的值
    pub posted_by: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OpportunityPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: Option<Option<OpportunityType>>,
    #[serde(deserialize_with = "nullable")]
    pub eligibility: Option<Option<String>>,
    pub skills: Option<Vec<String>>,
    #[serde(deserialize_with = "nullable")]
    pub details: Option<Option<String>>,
}

impl Resource for Opportunity {
    const COLLECTION: &'static str = "opportunities";
    type Patch = OpportunityPatch;

    fn validate(&self) -> Result<(), String> {
        require_str(&self.title, "title")?;
        require_str(&self.company, "company")?;
        require_str(&self.role, "role")?;
        require_str(&self.location, "location")?;
        require_str(&self.description, "description")?;
        if self.kind.is_none() {
            return Err("type is required".to_string());
        }
        if self.posted_by.is_nil() {
            return Err("posted_by is required".to_string());
        }
        Ok(())
    }

    fn apply(&mut self, p: OpportunityPatch) {
        patch(&mut self.title, p.title);
        patch(&mut self.company, p.company);
        patch(&mut self.role, p.role);
        patch(&mut self.location, p.location);
        patch(&mut self.description, p.description);
        patch(&mut self.kind, p.kind);
        patch(&mut self.eligibility, p.eligibility);
        patch(&mut self.skills, p.skills);
        patch(&mut self.details, p.details);
    }
}

/// 列表接口返回的机会，附带发布者信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityView {
    #[serde(flatten)]
    pub opportunity: Document<Opportunity>,
    pub posted_by_user: Option<UserSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Opportunity {
        serde_json::from_value(serde_json::json!({
            "title": "SDE Intern",
            "company": "Acme",
            "role": "Backend",
            "location": "Remote",
            "description": "Build APIs",
            "type": "Full-time",
            "skills": ["rust"]
        }))
        .unwrap()
    }

    #[test]
    fn type_uses_display_names() {
        let opportunity = sample();
        assert_eq!(opportunity.kind, Some(OpportunityType::FullTime));
        let json = serde_json::to_value(&opportunity).unwrap();
        assert_eq!(json["type"], "Full-time");
    }

    #[test]
    fn poster_is_required() {
        let mut opportunity = sample();
        assert!(opportunity.validate().is_err());
        opportunity.posted_by = Uuid::new_v4();
        assert!(opportunity.validate().is_ok());
    }

    #[test]
    fn patch_keeps_missing_fields() {
        let mut opportunity = sample();
        let patch: OpportunityPatch =
            serde_json::from_value(serde_json::json!({ "company": "Globex" })).unwrap();
        opportunity.apply(patch);
        assert_eq!(opportunity.company, "Globex");
        assert_eq!(opportunity.title, "SDE Intern");
        assert_eq!(opportunity.skills, vec!["rust".to_string()]);
    }

    #[test]
    fn patch_null_clears_optional_fields() {
        let mut opportunity = sample();
        opportunity.details = Some("Stipend".to_string());
        opportunity.eligibility = Some("2025 batch".to_string());
        let patch: OpportunityPatch = serde_json::from_value(serde_json::json!({
            "details": null,
            "eligibility": "Any batch"
        }))
        .unwrap();
        opportunity.apply(patch);
        assert_eq!(opportunity.details, None);
        assert_eq!(opportunity.eligibility.as_deref(), Some("Any batch"));
        assert_eq!(opportunity.kind, Some(OpportunityType::FullTime));
    }

    #[test]
    fn document_flattens_body() {
        let doc = Document::new(sample());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["id"], doc.id.to_string());
        assert_eq!(json["company"], "Acme");
        let back: Document<Opportunity> = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }
}
