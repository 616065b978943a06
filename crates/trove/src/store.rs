//! Storage for users, collections and comparisons.
//!
//! Handlers talk to the [`UserStore`], [`CollectionStore`] and
//! [`ComparisonStore`] traits. The
//! in-memory implementations keep every record behind a `parking_lot`
//! lock and hand out monotonically increasing ids.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use parking_lot::RwLock;
use trove_core::{Role, TroveError, TroveResult};

use crate::models::{
    Collection, CollectionUpdate, Comparison, ComparisonUpdate, NewCollection, NewComparison,
    NewUser, User,
};

/// User persistence.
pub trait UserStore: Send + Sync + 'static {
    /// Looks a user up by Telegram id.
    fn find_by_telegram_id(&self, telegram_id: i64) -> TroveResult<Option<User>>;

    /// Looks a user up by internal id.
    fn find(&self, id: i64) -> TroveResult<Option<User>>;

    /// Inserts a new user. Fails with a conflict if the Telegram id is taken.
    fn create(&self, user: NewUser) -> TroveResult<User>;

    /// Stamps the user's last activity time.
    fn touch_last_active(&self, id: i64) -> TroveResult<()>;

    /// Lists all users ordered by id.
    fn list(&self) -> TroveResult<Vec<User>>;

    /// Changes a user's role.
    fn set_role(&self, id: i64, role: Role) -> TroveResult<User>;
}

/// Collection persistence. Every operation is scoped to an owner.
pub trait CollectionStore: Send + Sync + 'static {
    /// Creates a collection owned by `user_id`.
    fn create(&self, user_id: i64, collection: NewCollection) -> TroveResult<Collection>;

    /// Lists the owner's collections, pinned first then newest first.
    fn list_for(&self, user_id: i64) -> TroveResult<Vec<Collection>>;

    /// Fetches one collection if it belongs to `user_id`.
    fn get(&self, user_id: i64, id: i64) -> TroveResult<Option<Collection>>;

    /// Applies `update`. Returns `None` if the collection is missing or
    /// owned by someone else.
    fn update(
        &self,
        user_id: i64,
        id: i64,
        update: CollectionUpdate,
    ) -> TroveResult<Option<Collection>>;

    /// Deletes a collection. Returns whether anything was removed.
    fn delete(&self, user_id: i64, id: i64) -> TroveResult<bool>;
}

/// Comparison persistence. Owner-scoped except for the public link lookup.
pub trait ComparisonStore: Send + Sync + 'static {
    /// Creates a comparison owned by `user_id`. Weights are stored as given.
    fn create(&self, user_id: i64, comparison: NewComparison) -> TroveResult<Comparison>;

    /// Lists the owner's comparisons, newest first.
    fn list_for(&self, user_id: i64) -> TroveResult<Vec<Comparison>>;

    /// Fetches one comparison if it belongs to `user_id`.
    fn get(&self, user_id: i64, id: i64) -> TroveResult<Option<Comparison>>;

    /// Replaces name, items and weights. The public link is kept.
    fn update(
        &self,
        user_id: i64,
        id: i64,
        update: ComparisonUpdate,
    ) -> TroveResult<Option<Comparison>>;

    /// Deletes a comparison. Returns whether anything was removed.
    fn delete(&self, user_id: i64, id: i64) -> TroveResult<bool>;

    /// Sets or clears the public link. Fails with a conflict if another
    /// comparison already uses `link`.
    fn set_public_link(
        &self,
        user_id: i64,
        id: i64,
        link: Option<String>,
    ) -> TroveResult<Option<Comparison>>;

    /// Finds a shared comparison by its link. `link` may also be a full URL
    /// ending in the link.
    fn find_by_public_link(&self, link: &str) -> TroveResult<Option<Comparison>>;
}

/// In-memory [`UserStore`].
#[derive(Debug)]
pub struct MemoryUserStore {
    users: RwLock<BTreeMap<i64, User>>,
    next_id: AtomicI64,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl UserStore for MemoryUserStore {
    fn find_by_telegram_id(&self, telegram_id: i64) -> TroveResult<Option<User>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.telegram_id == telegram_id)
            .cloned())
    }

    fn find(&self, id: i64) -> TroveResult<Option<User>> {
        Ok(self.users.read().get(&id).cloned())
    }

    fn create(&self, user: NewUser) -> TroveResult<User> {
        let mut users = self.users.write();
        if users.values().any(|u| u.telegram_id == user.telegram_id) {
            return Err(TroveError::conflict(format!(
                "user with telegram id {} already exists",
                user.telegram_id
            )));
        }

        let now = Utc::now();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = User {
            id,
            telegram_id: user.telegram_id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            generated_name: user.generated_name,
            role: user.role,
            created_at: now,
            updated_at: now,
            last_active: None,
        };
        users.insert(id, record.clone());
        Ok(record)
    }

    fn touch_last_active(&self, id: i64) -> TroveResult<()> {
        let mut users = self.users.write();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| TroveError::not_found("User not found"))?;
        user.last_active = Some(Utc::now());
        Ok(())
    }

    fn list(&self) -> TroveResult<Vec<User>> {
        Ok(self.users.read().values().cloned().collect())
    }

    fn set_role(&self, id: i64, role: Role) -> TroveResult<User> {
        let mut users = self.users.write();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| TroveError::not_found("User not found"))?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

/// In-memory [`CollectionStore`].
#[derive(Debug)]
pub struct MemoryCollectionStore {
    collections: RwLock<BTreeMap<i64, Collection>>,
    next_id: AtomicI64,
}

impl Default for MemoryCollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCollectionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl CollectionStore for MemoryCollectionStore {
    fn create(&self, user_id: i64, collection: NewCollection) -> TroveResult<Collection> {
        let now = Utc::now();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = Collection {
            id,
            user_id,
            name: collection.name,
            is_pinned: collection.is_pinned,
            created_at: now,
            updated_at: now,
        };
        self.collections.write().insert(id, record.clone());
        Ok(record)
    }

    fn list_for(&self, user_id: i64) -> TroveResult<Vec<Collection>> {
        let mut owned: Vec<Collection> = self
            .collections
            .read()
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        // Ids break ties between collections created in the same instant.
        owned.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(owned)
    }

    fn get(&self, user_id: i64, id: i64) -> TroveResult<Option<Collection>> {
        Ok(self
            .collections
            .read()
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    fn update(
        &self,
        user_id: i64,
        id: i64,
        update: CollectionUpdate,
    ) -> TroveResult<Option<Collection>> {
        let mut collections = self.collections.write();
        let Some(collection) = collections.get_mut(&id).filter(|c| c.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            collection.name = name;
        }
        if let Some(is_pinned) = update.is_pinned {
            collection.is_pinned = is_pinned;
        }
        collection.updated_at = Utc::now();
        Ok(Some(collection.clone()))
    }

    fn delete(&self, user_id: i64, id: i64) -> TroveResult<bool> {
        let mut collections = self.collections.write();
        match collections.get(&id) {
            Some(c) if c.user_id == user_id => {
                collections.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// In-memory [`ComparisonStore`].
#[derive(Debug)]
pub struct MemoryComparisonStore {
    comparisons: RwLock<BTreeMap<i64, Comparison>>,
    next_id: AtomicI64,
}

impl Default for MemoryComparisonStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryComparisonStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            comparisons: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl ComparisonStore for MemoryComparisonStore {
    fn create(&self, user_id: i64, comparison: NewComparison) -> TroveResult<Comparison> {
        let now = Utc::now();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = Comparison {
            id,
            user_id,
            name: comparison.name,
            items: comparison.items,
            public_link: None,
            price_rating_weight: comparison.price_rating_weight,
            pros_cons_rating_weight: comparison.pros_cons_rating_weight,
            created_at: now,
            updated_at: now,
        };
        self.comparisons.write().insert(id, record.clone());
        Ok(record)
    }

    fn list_for(&self, user_id: i64) -> TroveResult<Vec<Comparison>> {
        let mut owned: Vec<Comparison> = self
            .comparisons
            .read()
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    fn get(&self, user_id: i64, id: i64) -> TroveResult<Option<Comparison>> {
        Ok(self
            .comparisons
            .read()
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    fn update(
        &self,
        user_id: i64,
        id: i64,
        update: ComparisonUpdate,
    ) -> TroveResult<Option<Comparison>> {
        let mut comparisons = self.comparisons.write();
        let Some(comparison) = comparisons.get_mut(&id).filter(|c| c.user_id == user_id) else {
            return Ok(None);
        };
        comparison.name = update.name;
        comparison.items = update.items;
        comparison.price_rating_weight = update.price_rating_weight;
        comparison.pros_cons_rating_weight = update.pros_cons_rating_weight;
        comparison.updated_at = Utc::now();
        Ok(Some(comparison.clone()))
    }

    fn delete(&self, user_id: i64, id: i64) -> TroveResult<bool> {
        let mut comparisons = self.comparisons.write();
        match comparisons.get(&id) {
            Some(c) if c.user_id == user_id => {
                comparisons.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn set_public_link(
        &self,
        user_id: i64,
        id: i64,
        link: Option<String>,
    ) -> TroveResult<Option<Comparison>> {
        let mut comparisons = self.comparisons.write();
        if let Some(link) = &link {
            let taken = comparisons
                .values()
                .any(|c| c.id != id && c.public_link.as_deref() == Some(link.as_str()));
            if taken {
                return Err(TroveError::conflict("public link already in use"));
            }
        }
        let Some(comparison) = comparisons.get_mut(&id).filter(|c| c.user_id == user_id) else {
            return Ok(None);
        };
        comparison.public_link = link;
        Ok(Some(comparison.clone()))
    }

    fn find_by_public_link(&self, link: &str) -> TroveResult<Option<Comparison>> {
        let comparisons = self.comparisons.read();
        // Exact match wins over a URL that merely ends in a link.
        let found = comparisons
            .values()
            .find(|c| c.public_link.as_deref() == Some(link))
            .or_else(|| {
                comparisons.values().find(|c| {
                    c.public_link
                        .as_deref()
                        .is_some_and(|public| link.ends_with(public))
                })
            })
            .cloned();
        Ok(found)
    }
}
