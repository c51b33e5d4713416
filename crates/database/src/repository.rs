use orgboard_core::{
    Document, Identity, Project, Record, RecordKind, Skill, StoreError, TeamMember,
};
use serde_json::Value;

use crate::store::{DocumentStore, SortDirection};

/// Generic ownership-stamping CRUD over the record collections, plus the
/// per-owner aggregation. One repository serves all three kinds.
pub struct Repository<S> {
    store: S,
}

/// Everything a single owner has across the three collections.
#[derive(Debug, Clone)]
pub struct OwnedData {
    pub team_member: Option<Record<TeamMember>>,
    pub skills: Vec<Record<Skill>>,
    pub projects: Vec<Record<Project>>,
}

impl<S: DocumentStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert `fields` stamped with ownership from the acting identity and
    /// both timestamps. The caller receives the full record or nothing.
    pub async fn create<K: RecordKind>(
        &self,
        identity: &Identity,
        fields: K,
    ) -> Result<Record<K>, StoreError> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut doc = to_document(&fields)?;
        doc.insert(
            "owner_id".to_string(),
            Value::String(identity.user_id.clone()),
        );
        if let Some(email) = &identity.email {
            doc.insert("owner_email".to_string(), Value::String(email.clone()));
        }
        doc.insert("created_at".to_string(), Value::String(now.clone()));
        doc.insert("updated_at".to_string(), Value::String(now.clone()));

        let id = self.store.insert(K::COLLECTION, doc).await?;
        tracing::info!("created {} record {}", K::COLLECTION, id);
        Ok(Record {
            id,
            owner_id: identity.user_id.clone(),
            owner_email: identity.email.clone(),
            created_at: now.clone(),
            updated_at: now,
            fields,
        })
    }

    /// Partial update: fields absent from `patch` are left unchanged.
    /// `owner_id`, `owner_email` and `created_at` are immutable after
    /// creation by contract; callers must not pass them.
    pub async fn update<K: RecordKind>(
        &self,
        id: &str,
        mut patch: Document,
    ) -> Result<Record<K>, StoreError> {
        patch.insert(
            "updated_at".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        let merged = self.store.update(K::COLLECTION, id, patch).await?;
        from_document(merged)
    }

    pub async fn delete<K: RecordKind>(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(K::COLLECTION, id).await?;
        tracing::info!("deleted {} record {}", K::COLLECTION, id);
        Ok(())
    }

    /// All records, newest first; equal timestamps ordered by id ascending
    /// for determinism.
    pub async fn list<K: RecordKind>(&self) -> Result<Vec<Record<K>>, StoreError> {
        let docs = self
            .store
            .scan_all(K::COLLECTION, "created_at", SortDirection::Descending)
            .await?;
        docs.into_iter().map(from_document).collect()
    }

    /// Records owned by `owner_id`; order unspecified.
    pub async fn list_by_owner<K: RecordKind>(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Record<K>>, StoreError> {
        let docs = self
            .store
            .scan_where(K::COLLECTION, "owner_id", owner_id)
            .await?;
        docs.into_iter().map(from_document).collect()
    }

    /// Aggregate the three per-owner queries, issued concurrently. At most
    /// one team member is expected per owner; if duplicates exist an
    /// arbitrary one is returned, and preventing duplicates is on whoever
    /// creates them.
    pub async fn owned_data(&self, owner_id: &str) -> Result<OwnedData, StoreError> {
        let (members, skills, projects) = tokio::try_join!(
            self.list_by_owner::<TeamMember>(owner_id),
            self.list_by_owner::<Skill>(owner_id),
            self.list_by_owner::<Project>(owner_id),
        )?;
        Ok(OwnedData {
            team_member: members.into_iter().next(),
            skills,
            projects,
        })
    }
}

pub(crate) fn to_document<T: serde::Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::Malformed(
            "record did not serialize to an object".to_string(),
        )),
        Err(e) => Err(StoreError::Malformed(e.to_string())),
    }
}

pub(crate) fn from_document<K: RecordKind>(doc: Document) -> Result<Record<K>, StoreError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::memory::MemoryDocumentStore;

    fn admin() -> Identity {
        Identity {
            user_id: "admin-uid".to_string(),
            email: Some("admin@u4.com".to_string()),
            display_name: Some("Demo Administrator".to_string()),
        }
    }

    fn skill(name: &str) -> Skill {
        Skill {
            name: name.to_string(),
            category: "programming".to_string(),
            level: "intermediate".to_string(),
            ..Skill::default()
        }
    }

    fn member(name: &str) -> TeamMember {
        TeamMember {
            name: name.to_string(),
            role: "developer".to_string(),
            bio: "bio".to_string(),
            ..TeamMember::default()
        }
    }

    #[tokio::test]
    async fn create_stamps_ownership_and_timestamps() {
        let repo = Repository::new(MemoryDocumentStore::new());
        let record = repo.create(&admin(), skill("Rust")).await.unwrap();

        assert!(!record.id.is_empty());
        assert_eq!(record.owner_id, "admin-uid");
        assert_eq!(record.owner_email.as_deref(), Some("admin@u4.com"));
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(record.fields.name, "Rust");
    }

    #[tokio::test]
    async fn create_then_list_returns_the_new_record_first() {
        let repo = Repository::new(MemoryDocumentStore::new());
        repo.create(&admin(), skill("older")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let newest = repo.create(&admin(), skill("newer")).await.unwrap();

        let listed = repo.list::<Skill>().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newest.id);
        assert_eq!(listed[0].fields.name, "newer");
    }

    #[tokio::test]
    async fn update_changes_only_the_patched_fields() {
        let repo = Repository::new(MemoryDocumentStore::new());
        let before = repo.create(&admin(), member("Ana")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let mut patch = Document::new();
        patch.insert("name".to_string(), Value::String("X".to_string()));
        let after = repo.update::<TeamMember>(&before.id, patch).await.unwrap();

        assert_eq!(after.fields.name, "X");
        assert_eq!(after.fields.role, before.fields.role);
        assert_eq!(after.fields.bio, before.fields.bio);
        assert_eq!(after.owner_id, before.owner_id);
        assert_eq!(after.owner_email, before.owner_email);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn update_and_delete_on_missing_ids_fail_with_not_found() {
        let repo = Repository::new(MemoryDocumentStore::new());
        assert!(matches!(
            repo.update::<Skill>("missing", Document::new()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            repo.delete::<Skill>("missing").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let repo = Repository::new(MemoryDocumentStore::new());
        let record = repo.create(&admin(), skill("gone")).await.unwrap();
        repo.delete::<Skill>(&record.id).await.unwrap();
        assert!(repo.list::<Skill>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owned_data_aggregates_the_three_collections() {
        let repo = Repository::new(MemoryDocumentStore::new());
        let owner = admin();
        let other = Identity::new("other-uid", Some("team@u4.com".to_string()));

        repo.create(&owner, member("Ana")).await.unwrap();
        repo.create(&owner, skill("Rust")).await.unwrap();
        repo.create(&owner, skill("SQL")).await.unwrap();
        repo.create(
            &owner,
            Project {
                title: "Dashboard".to_string(),
                ..Project::default()
            },
        )
        .await
        .unwrap();
        repo.create(&other, skill("Go")).await.unwrap();

        let owned = repo.owned_data(&owner.user_id).await.unwrap();
        assert_eq!(
            owned.team_member.as_ref().map(|m| m.fields.name.as_str()),
            Some("Ana")
        );
        assert_eq!(owned.skills.len(), 2);
        assert_eq!(owned.projects.len(), 1);

        let empty = repo.owned_data("nobody").await.unwrap();
        assert!(empty.team_member.is_none());
        assert!(empty.skills.is_empty());
        assert!(empty.projects.is_empty());
    }

    #[tokio::test]
    async fn list_by_owner_filters_to_that_owner() {
        let repo = Repository::new(MemoryDocumentStore::new());
        let other = Identity::new("other-uid", None);
        repo.create(&admin(), skill("mine")).await.unwrap();
        repo.create(&other, skill("theirs")).await.unwrap();

        let mine = repo.list_by_owner::<Skill>("admin-uid").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].fields.name, "mine");

        // The other identity had no email, so no owner_email was stamped.
        let theirs = repo.list_by_owner::<Skill>("other-uid").await.unwrap();
        assert_eq!(theirs[0].owner_email, None);
    }
}
