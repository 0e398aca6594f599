//! Typed entity store over the key-value backend.
//!
//! # Responsibilities
//! - Config and ConfigGroup create/read/delete
//! - Group membership read-modify-write helpers
//! - Label-filtered reads and bulk deletes of group members
//!
//! # Design Decisions
//! - Uniqueness on create uses the backend's atomic put-if-absent; there
//!   is no read-then-write window on single-entity operations.
//! - Read-modify-write on a group holds a per-group lock (sharded table)
//!   for the whole fetch/mutate/persist sequence, so two concurrent
//!   membership writes to the same group cannot lose an update.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::labels::LabelQuery;
use crate::model::config::config_key;
use crate::model::group::group_key;
use crate::model::{Config, ConfigGroup};
use crate::store::KvBackend;

/// Number of group-lock shards. Contention is per shard, not per group,
/// so collisions only cost throughput, never correctness.
const GROUP_LOCK_SHARDS: usize = 64;

/// Typed store for configs and config groups.
#[derive(Clone)]
pub struct EntityStore {
    backend: Arc<dyn KvBackend>,
    group_locks: Arc<Vec<Mutex<()>>>,
}

impl EntityStore {
    /// Create a store over the given backend.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        let group_locks = (0..GROUP_LOCK_SHARDS).map(|_| Mutex::new(())).collect();
        Self {
            backend,
            group_locks: Arc::new(group_locks),
        }
    }

    fn group_lock(&self, name: &str, version: u64) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        version.hash(&mut hasher);
        let shard = (hasher.finish() as usize) % self.group_locks.len();
        &self.group_locks[shard]
    }

    /// Persist a new config. Fails `AlreadyExists` if `(name, version)`
    /// is taken; validation failures never touch the backend.
    pub async fn add_config(&self, config: &Config) -> Result<(), ApiError> {
        config.validate()?;
        let data = serde_json::to_vec(config)?;
        if !self.backend.put_if_absent(&config.key(), data).await? {
            return Err(ApiError::AlreadyExists(
                "Configuration with the given name and version already exists".into(),
            ));
        }
        Ok(())
    }

    /// Fetch a config by identity.
    pub async fn get_config(&self, name: &str, version: u64) -> Result<Config, ApiError> {
        let data = self
            .backend
            .get(&config_key(name, version))
            .await?
            .ok_or_else(|| ApiError::NotFound("config not found".into()))?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Remove a config by identity.
    pub async fn delete_config(&self, name: &str, version: u64) -> Result<(), ApiError> {
        if !self.backend.delete(&config_key(name, version)).await? {
            return Err(ApiError::NotFound("config not found".into()));
        }
        Ok(())
    }

    /// Insert a config into the standalone keyspace unless its identity is
    /// already taken. Used when embedding members into a group so that
    /// standalone lookups of members succeed independently.
    async fn upsert_config_if_absent(&self, config: &Config) -> Result<(), ApiError> {
        let data = serde_json::to_vec(config)?;
        self.backend.put_if_absent(&config.key(), data).await?;
        Ok(())
    }

    /// Persist a new group. Every member absent from the standalone
    /// keyspace is inserted there first; the group then claims its own
    /// key. A duplicate group identity fails `AlreadyExists`.
    pub async fn add_config_group(&self, group: &ConfigGroup) -> Result<(), ApiError> {
        group.validate()?;
        for member in &group.configurations {
            self.upsert_config_if_absent(member).await?;
        }
        let data = serde_json::to_vec(group)?;
        if !self.backend.put_if_absent(&group.key(), data).await? {
            return Err(ApiError::AlreadyExists(
                "Configuration group with the given name and version already exists".into(),
            ));
        }
        Ok(())
    }

    /// Fetch a group by identity.
    pub async fn get_config_group(&self, name: &str, version: u64) -> Result<ConfigGroup, ApiError> {
        let data = self
            .backend
            .get(&group_key(name, version))
            .await?
            .ok_or_else(|| ApiError::NotFound("config group not found".into()))?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Remove a group and everything stored under its key.
    pub async fn delete_config_group(&self, name: &str, version: u64) -> Result<(), ApiError> {
        let _guard = self.group_lock(name, version).lock().await;
        if self.backend.delete_tree(&group_key(name, version)).await? == 0 {
            return Err(ApiError::NotFound("config group not found".into()));
        }
        Ok(())
    }

    /// Append a config to a group's membership.
    ///
    /// Fails `NotFound` if the group is absent and `AlreadyExists` if a
    /// member with the same identity is present. The config is also
    /// upserted into the standalone keyspace.
    pub async fn add_config_to_group(
        &self,
        name: &str,
        version: u64,
        config: Config,
    ) -> Result<(), ApiError> {
        let _guard = self.group_lock(name, version).lock().await;

        let mut group = self.get_config_group(name, version).await?;
        if group.contains(&config.name, config.version) {
            return Err(ApiError::AlreadyExists(
                "Configuration already exists in the group".into(),
            ));
        }
        self.upsert_config_if_absent(&config).await?;
        group.configurations.push(config);
        let data = serde_json::to_vec(&group)?;
        self.backend.put(&group.key(), data).await
    }

    /// Remove the first member matching `(config_name, config_version)`
    /// from a group. Fails `NotFound` if the group or the member is
    /// absent.
    pub async fn delete_config_from_group(
        &self,
        group_name: &str,
        group_version: u64,
        config_name: &str,
        config_version: u64,
    ) -> Result<(), ApiError> {
        let _guard = self.group_lock(group_name, group_version).lock().await;

        let mut group = self.get_config_group(group_name, group_version).await?;
        let position = group
            .configurations
            .iter()
            .position(|c| c.name == config_name && c.version == config_version)
            .ok_or_else(|| ApiError::NotFound("config not found in group".into()))?;
        group.configurations.remove(position);
        let data = serde_json::to_vec(&group)?;
        self.backend.put(&group.key(), data).await
    }

    /// Return every member of a group whose label set equals the query
    /// exactly. Fails `NotFound` if the group is absent or nothing
    /// matches.
    pub async fn get_configs_from_group_by_label(
        &self,
        group_name: &str,
        group_version: u64,
        query: &LabelQuery,
    ) -> Result<Vec<Config>, ApiError> {
        let group = self.get_config_group(group_name, group_version).await?;
        let matches: Vec<Config> = group
            .configurations
            .into_iter()
            .filter(|c| query.matches(c))
            .collect();
        if matches.is_empty() {
            return Err(ApiError::NotFound("config not found".into()));
        }
        Ok(matches)
    }

    /// Remove every member of a group whose label set equals the query
    /// exactly and persist the reduced group. Fails `NotFound` without
    /// touching the group if nothing matched.
    pub async fn delete_configs_from_group_by_label(
        &self,
        group_name: &str,
        group_version: u64,
        query: &LabelQuery,
    ) -> Result<(), ApiError> {
        let _guard = self.group_lock(group_name, group_version).lock().await;

        let mut group = self.get_config_group(group_name, group_version).await?;
        let before = group.configurations.len();
        group.configurations.retain(|c| !query.matches(c));
        if group.configurations.len() == before {
            return Err(ApiError::NotFound("config not found".into()));
        }
        let data = serde_json::to_vec(&group)?;
        self.backend.put(&group.key(), data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use std::collections::BTreeMap;

    fn config(name: &str, version: u64, env: &str) -> Config {
        Config {
            name: name.into(),
            version,
            parameters: BTreeMap::from([("k".into(), "v".into())]),
            labels: BTreeMap::from([("env".into(), env.into())]),
        }
    }

    fn group(name: &str, version: u64, members: Vec<Config>) -> ConfigGroup {
        ConfigGroup {
            name: name.into(),
            version,
            configurations: members,
        }
    }

    fn store() -> EntityStore {
        EntityStore::new(Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn test_add_then_get_roundtrip() {
        let store = store();
        let c = config("db", 1, "prod");
        store.add_config(&c).await.unwrap();
        assert_eq!(store.get_config("db", 1).await.unwrap(), c);
    }

    #[tokio::test]
    async fn test_duplicate_add_rejected_first_write_wins() {
        let store = store();
        let first = config("db", 1, "prod");
        let mut second = first.clone();
        second.labels.insert("env".into(), "dev".into());

        store.add_config(&first).await.unwrap();
        let err = store.add_config(&second).await.unwrap_err();
        assert!(matches!(err, ApiError::AlreadyExists(_)));
        // State is still the first write.
        assert_eq!(store.get_config("db", 1).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_get_and_delete_missing() {
        let store = store();
        assert!(matches!(
            store.get_config("nope", 1).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            store.delete_config("nope", 1).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_invalid_config_never_touches_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let store = EntityStore::new(backend.clone());
        let mut c = config("db", 1, "prod");
        c.parameters.clear();
        assert!(store.add_config(&c).await.is_err());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_group_members_upserted_standalone() {
        let store = store();
        let g = group("g", 1, vec![config("c1", 1, "prod")]);
        store.add_config_group(&g).await.unwrap();

        // The member is reachable through the standalone keyspace.
        assert_eq!(
            store.get_config("c1", 1).await.unwrap(),
            config("c1", 1, "prod")
        );
    }

    #[tokio::test]
    async fn test_group_member_upsert_does_not_overwrite() {
        let store = store();
        let standalone = config("c1", 1, "prod");
        store.add_config(&standalone).await.unwrap();

        // The group embeds a different copy under the same identity.
        let g = group("g", 1, vec![config("c1", 1, "dev")]);
        store.add_config_group(&g).await.unwrap();

        // Standalone copy unchanged; group keeps its own copy.
        assert_eq!(store.get_config("c1", 1).await.unwrap(), standalone);
        let stored = store.get_config_group("g", 1).await.unwrap();
        assert_eq!(stored.configurations[0], config("c1", 1, "dev"));
    }

    #[tokio::test]
    async fn test_duplicate_group_rejected() {
        let store = store();
        let g = group("g", 1, vec![config("c1", 1, "prod")]);
        store.add_config_group(&g).await.unwrap();
        assert!(matches!(
            store.add_config_group(&g).await.unwrap_err(),
            ApiError::AlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_add_config_to_group() {
        let store = store();
        store
            .add_config_group(&group("g", 1, vec![config("c1", 1, "prod")]))
            .await
            .unwrap();

        store
            .add_config_to_group("g", 1, config("c2", 1, "dev"))
            .await
            .unwrap();
        let g = store.get_config_group("g", 1).await.unwrap();
        assert_eq!(g.configurations.len(), 2);
        // Appended member is also standalone now.
        assert!(store.get_config("c2", 1).await.is_ok());

        // Same identity again is a conflict.
        let err = store
            .add_config_to_group("g", 1, config("c2", 1, "dev"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_add_config_to_missing_group() {
        let store = store();
        let err = store
            .add_config_to_group("nope", 1, config("c", 1, "prod"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_config_from_group() {
        let store = store();
        store
            .add_config_group(&group(
                "g",
                1,
                vec![config("c1", 1, "prod"), config("c2", 1, "dev")],
            ))
            .await
            .unwrap();

        store.delete_config_from_group("g", 1, "c1", 1).await.unwrap();
        let g = store.get_config_group("g", 1).await.unwrap();
        assert_eq!(g.configurations.len(), 1);
        assert_eq!(g.configurations[0].name, "c2");

        let err = store
            .delete_config_from_group("g", 1, "c1", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_label_query_exact_match_only() {
        let store = store();
        store
            .add_config_group(&group(
                "g",
                1,
                vec![config("c1", 1, "prod"), config("c2", 1, "dev")],
            ))
            .await
            .unwrap();

        let q = LabelQuery::parse("env:prod").unwrap();
        let found = store
            .get_configs_from_group_by_label("g", 1, &q)
            .await
            .unwrap();
        assert_eq!(found, vec![config("c1", 1, "prod")]);

        // No member carries exactly this set.
        let q = LabelQuery::parse("env:prod;tier:web").unwrap();
        assert!(matches!(
            store
                .get_configs_from_group_by_label("g", 1, &q)
                .await
                .unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_label_delete_removes_all_matches() {
        let store = store();
        store
            .add_config_group(&group(
                "g",
                1,
                vec![
                    config("c1", 1, "prod"),
                    config("c2", 1, "prod"),
                    config("c3", 1, "dev"),
                ],
            ))
            .await
            .unwrap();

        let q = LabelQuery::parse("env:prod").unwrap();
        store
            .delete_configs_from_group_by_label("g", 1, &q)
            .await
            .unwrap();
        let g = store.get_config_group("g", 1).await.unwrap();
        assert_eq!(g.configurations.len(), 1);
        assert_eq!(g.configurations[0].name, "c3");

        // Nothing matches now; the group must stay unchanged.
        let err = store
            .delete_configs_from_group_by_label("g", 1, &q)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(
            store.get_config_group("g", 1).await.unwrap().configurations.len(),
            1
        );
    }

    #[tokio::test]
    async fn test_concurrent_member_adds_do_not_lose_updates() {
        let store = store();
        store
            .add_config_group(&group("g", 1, vec![config("seed", 1, "prod")]))
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .add_config_to_group("g", 1, config(&format!("c{}", i), 1, "prod"))
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let g = store.get_config_group("g", 1).await.unwrap();
        assert_eq!(g.configurations.len(), 17);
    }
}
