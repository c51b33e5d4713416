use futures::future::try_join_all;
use orgboard_core::{
    Identity, Project, ProjectLinks, Record, RecordKind, Skill, SocialLinks, StoreError,
    TeamMember,
};
use serde_json::Value;

use crate::repository::Repository;
use crate::store::{DocumentStore, SortDirection};

/// Stable placeholder for the demo administrator's provider-assigned id.
pub const DEMO_ADMIN_USER_ID: &str = "demo-admin";
pub const DEMO_ADMIN_EMAIL: &str = "admin@u4.com";

/// A seed entry carries the ownership to stamp on the created record.
#[derive(Debug, Clone)]
pub struct SeedRecord<K> {
    pub owner_id: String,
    pub owner_email: Option<String>,
    pub fields: K,
}

impl<K> SeedRecord<K> {
    pub fn demo_admin(fields: K) -> Self {
        Self {
            owner_id: DEMO_ADMIN_USER_ID.to_string(),
            owner_email: Some(DEMO_ADMIN_EMAIL.to_string()),
            fields,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub team_members: Vec<SeedRecord<TeamMember>>,
    pub projects: Vec<SeedRecord<Project>>,
    pub skills: Vec<SeedRecord<Skill>>,
}

impl<S: DocumentStore> Repository<S> {
    /// Destructive clear-and-reseed of all three collections.
    ///
    /// Two phases, not atomic: if clearing fails partway the seed phase is
    /// never attempted, and a seed-phase failure leaves collections
    /// partially repopulated. Either way a single `StoreError` is surfaced;
    /// callers must re-fetch before presenting state after an error.
    pub async fn reinitialize(&self, seed: &SeedData) -> Result<(), StoreError> {
        tracing::info!("reinitializing all collections");
        self.clear_collection(TeamMember::COLLECTION).await?;
        self.clear_collection(Project::COLLECTION).await?;
        self.clear_collection(Skill::COLLECTION).await?;

        for entry in &seed.team_members {
            self.create_seeded(entry).await?;
        }
        for entry in &seed.projects {
            self.create_seeded(entry).await?;
        }
        for entry in &seed.skills {
            self.create_seeded(entry).await?;
        }
        tracing::info!(
            "seeded {} team members, {} projects, {} skills",
            seed.team_members.len(),
            seed.projects.len(),
            seed.skills.len()
        );
        Ok(())
    }

    async fn clear_collection(&self, collection: &str) -> Result<(), StoreError> {
        let docs = self
            .store()
            .scan_all(collection, "created_at", SortDirection::Descending)
            .await?;
        let deletes = docs
            .iter()
            .filter_map(|doc| doc.get("id").and_then(Value::as_str))
            .map(|id| self.store().delete(collection, id));
        try_join_all(deletes).await?;
        tracing::info!("cleared {} documents from {}", docs.len(), collection);
        Ok(())
    }

    async fn create_seeded<K: RecordKind>(
        &self,
        entry: &SeedRecord<K>,
    ) -> Result<Record<K>, StoreError> {
        let owner = Identity {
            user_id: entry.owner_id.clone(),
            email: entry.owner_email.clone(),
            display_name: None,
        };
        self.create(&owner, entry.fields.clone()).await
    }
}

/// The fixed demonstration seed set: one team member, one project and one
/// skill, all owned by the demo administrator.
pub fn default_seed() -> SeedData {
    SeedData {
        team_members: vec![SeedRecord::demo_admin(TeamMember {
            name: "Ana Garcia".to_string(),
            role: "Founder & General Coordinator".to_string(),
            bio: "Systems engineer with eight years of experience in web \
                  development and project leadership, focused on building \
                  inclusive spaces in tech."
                .to_string(),
            image: None,
            skills: vec![
                "JavaScript".to_string(),
                "Rust".to_string(),
                "Leadership".to_string(),
                "Mentoring".to_string(),
            ],
            experience: Some("8 years in web development and team management".to_string()),
            education: Some("Systems Engineering".to_string()),
            current_focus: Some(
                "Building a mentoring platform connecting newcomers with opportunities in tech"
                    .to_string(),
            ),
            fun_fact: Some("Learned to program at twelve writing game mods".to_string()),
            social: SocialLinks {
                linkedin: Some("https://linkedin.com/in/ana-garcia".to_string()),
                github: Some("https://github.com/ana-garcia".to_string()),
                email: Some("ana@example.org".to_string()),
            },
        })],
        projects: vec![SeedRecord::demo_admin(Project {
            title: "EduTech Platform".to_string(),
            description: "Online learning platform connecting mentors with students through \
                          interactive courses and personal progress tracking."
                .to_string(),
            image: None,
            category: "Education".to_string(),
            status: "completed".to_string(),
            start_date: Some("2024-01-15".to_string()),
            end_date: Some("2024-06-30".to_string()),
            technologies: vec![
                "React".to_string(),
                "Node.js".to_string(),
                "PostgreSQL".to_string(),
            ],
            objectives: vec![
                "Broaden access to quality technical education".to_string(),
                "Build a network of expert mentors".to_string(),
            ],
            target_audience: Some("Students aged 16-28 entering tech".to_string()),
            budget: Some("$45,000 USD".to_string()),
            team: vec!["Ana Garcia".to_string(), "Sofia Chen".to_string()],
            links: ProjectLinks {
                website: Some("https://edutech.example.org".to_string()),
                github: Some("https://github.com/example/edutech-platform".to_string()),
                documentation: None,
            },
        })],
        skills: vec![SeedRecord::demo_admin(Skill {
            name: "React.js".to_string(),
            category: "Programming".to_string(),
            description: "JavaScript library for building interactive user interfaces; a \
                          staple of modern frontend work."
                .to_string(),
            level: "intermediate".to_string(),
            resources: vec![
                "Official React documentation".to_string(),
                "The Complete React Developer Course".to_string(),
            ],
            prerequisites: vec![
                "JavaScript ES6+".to_string(),
                "HTML".to_string(),
                "CSS".to_string(),
            ],
            learning_time: Some("2-4 months".to_string()),
            demand_level: Some("very-high".to_string()),
            related_careers: vec![
                "Frontend Developer".to_string(),
                "Full Stack Developer".to_string(),
            ],
        })],
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use orgboard_core::Document;

    use super::*;
    use crate::memory::MemoryDocumentStore;

    #[tokio::test]
    async fn reinitialize_seeds_an_empty_store() {
        let repo = Repository::new(MemoryDocumentStore::new());
        repo.reinitialize(&default_seed()).await.unwrap();

        let members = repo.list::<TeamMember>().await.unwrap();
        let projects = repo.list::<Project>().await.unwrap();
        let skills = repo.list::<Skill>().await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(projects.len(), 1);
        assert_eq!(skills.len(), 1);

        for owner_email in [
            members[0].owner_email.as_deref(),
            projects[0].owner_email.as_deref(),
            skills[0].owner_email.as_deref(),
        ] {
            assert_eq!(owner_email, Some("admin@u4.com"));
        }
        assert!(!members[0].id.is_empty());
    }

    /// Fault-injecting wrapper: deletes can be made to fail outright, and
    /// inserts fail once the configured budget is spent.
    struct FailingStore {
        inner: MemoryDocumentStore,
        fail_deletes: bool,
        inserts_left: AtomicUsize,
    }

    impl FailingStore {
        fn new(fail_deletes: bool, inserts_left: usize) -> Self {
            Self {
                inner: MemoryDocumentStore::new(),
                fail_deletes,
                inserts_left: AtomicUsize::new(inserts_left),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn insert(&self, collection: &str, fields: Document) -> Result<String, StoreError> {
            if self.inserts_left.fetch_sub(1, Ordering::SeqCst) == 0 {
                return Err(StoreError::Transient("insert budget exhausted".to_string()));
            }
            self.inner.insert(collection, fields).await
        }

        async fn scan_all(
            &self,
            collection: &str,
            order_by: &str,
            direction: SortDirection,
        ) -> Result<Vec<Document>, StoreError> {
            self.inner.scan_all(collection, order_by, direction).await
        }

        async fn scan_where(
            &self,
            collection: &str,
            field: &str,
            equals: &str,
        ) -> Result<Vec<Document>, StoreError> {
            self.inner.scan_where(collection, field, equals).await
        }

        async fn update(
            &self,
            collection: &str,
            id: &str,
            patch: Document,
        ) -> Result<Document, StoreError> {
            self.inner.update(collection, id, patch).await
        }

        async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
            if self.fail_deletes {
                return Err(StoreError::Transient("delete refused".to_string()));
            }
            self.inner.delete(collection, id).await
        }
    }

    #[tokio::test]
    async fn clear_phase_failure_aborts_before_any_seeding() {
        let repo = Repository::new(FailingStore::new(true, usize::MAX));
        let stale_owner = Identity::new("stale-uid", None);
        let stale = repo
            .create(
                &stale_owner,
                Skill {
                    name: "stale".to_string(),
                    ..Skill::default()
                },
            )
            .await
            .unwrap();

        let err = repo.reinitialize(&default_seed()).await.unwrap_err();
        assert!(matches!(err, StoreError::Transient(_)));

        // Phase 2 was never attempted: the stale record is still the only
        // one, and no collection received a seed record.
        let skills = repo.list::<Skill>().await.unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].id, stale.id);
        assert!(repo.list::<TeamMember>().await.unwrap().is_empty());
        assert!(repo.list::<Project>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn seed_phase_failure_leaves_cleared_collections_partially_seeded() {
        // One insert for the stale record, one for the seed team member;
        // the seed project insert then fails.
        let repo = Repository::new(FailingStore::new(false, 2));
        let stale_owner = Identity::new("stale-uid", None);
        repo.create(
            &stale_owner,
            Skill {
                name: "stale".to_string(),
                ..Skill::default()
            },
        )
        .await
        .unwrap();

        let err = repo.reinitialize(&default_seed()).await.unwrap_err();
        assert!(matches!(err, StoreError::Transient(_)));

        // The clear phase ran to completion, so the stale skill is gone and
        // the seed skill was never reached; seeding stopped at the project.
        assert_eq!(repo.list::<TeamMember>().await.unwrap().len(), 1);
        assert!(repo.list::<Project>().await.unwrap().is_empty());
        assert!(repo.list::<Skill>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reinitialize_replaces_existing_records() {
        let repo = Repository::new(MemoryDocumentStore::new());
        let stale_owner = Identity::new("stale-uid", Some("old@example.org".to_string()));
        for name in ["one", "two", "three"] {
            repo.create(
                &stale_owner,
                Skill {
                    name: name.to_string(),
                    ..Skill::default()
                },
            )
            .await
            .unwrap();
        }

        repo.reinitialize(&default_seed()).await.unwrap();

        let skills = repo.list::<Skill>().await.unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].fields.name, "React.js");
        assert_eq!(skills[0].owner_id, DEMO_ADMIN_USER_ID);
    }
}
