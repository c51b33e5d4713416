use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Duck-typed document shape exchanged with the document store.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// A persistable record kind, naming the collection that backs it.
pub trait RecordKind: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;
}

/// Envelope around a record's domain fields. `id` is assigned by the store
/// on insert; the timestamps and ownership stamps by the repository.
/// `owner_id` and `owner_email` are written exactly once, at creation, and
/// preserved verbatim afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Record<F> {
    pub id: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(flatten)]
    pub fields: F,
}

// ========== TEAM MEMBER ==========
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_focus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_fact: Option<String>,
    #[serde(default)]
    pub social: SocialLinks,
}

impl RecordKind for TeamMember {
    const COLLECTION: &'static str = "team_members";
}

// ========== PROJECT ==========
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProjectLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: String, // planned | in-progress | completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub links: ProjectLinks,
}

impl RecordKind for Project {
    const COLLECTION: &'static str = "projects";
}

// ========== SKILL ==========
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level: String, // beginner | intermediate | advanced
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_level: Option<String>,
    #[serde(default)]
    pub related_careers: Vec<String>,
}

impl RecordKind for Skill {
    const COLLECTION: &'static str = "skills";
}
