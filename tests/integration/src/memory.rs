//! In-memory implementation of the repository traits
//!
//! Mirrors the PostgreSQL repositories closely enough for service and HTTP
//! tests: case-insensitive email uniqueness, cascading user deletion under a
//! single lock, idempotent follows and the same orderings.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use microblog_core::entities::{
    validate_content, FollowEdge, Micropost, NewMicropost, NewUser, Relationship, User,
};
use microblog_core::traits::{
    MicropostRepository, PageQuery, RelationshipRepository, RepoResult, UserRepository,
};
use microblog_core::{DomainError, MicropostId, UserId};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, StoredUser>,
    microposts: BTreeMap<MicropostId, Micropost>,
    relationships: BTreeMap<(UserId, UserId), Relationship>,
    last_user_id: i64,
    last_micropost_id: i64,
}

impl State {
    fn user_mut(&mut self, id: UserId) -> RepoResult<&mut User> {
        self.users
            .get_mut(&id)
            .map(|stored| &mut stored.user)
            .ok_or(DomainError::UserNotFound(id))
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        let email = email.to_lowercase();
        self.users.values().any(|stored| {
            Some(stored.user.id) != except && stored.user.email.to_lowercase() == email
        })
    }

    fn posts_newest_first(&self, include: impl Fn(&Micropost) -> bool) -> Vec<Micropost> {
        let mut posts: Vec<Micropost> = self
            .microposts
            .values()
            .filter(|post| include(post))
            .cloned()
            .collect();
        posts.sort_by_key(|post| Reverse((post.created_at, post.id)));
        posts
    }

    fn edge_users(&self, pick: impl Fn(&Relationship) -> Option<UserId>) -> Vec<User> {
        let mut edges: Vec<(DateTime<Utc>, UserId)> = self
            .relationships
            .values()
            .filter_map(|edge| pick(edge).map(|id| (edge.created_at, id)))
            .collect();
        edges.sort_by_key(|(created_at, id)| (Reverse(*created_at), *id));
        edges
            .into_iter()
            .filter_map(|(_, id)| self.users.get(&id).map(|stored| stored.user.clone()))
            .collect()
    }
}

fn window<T>(items: Vec<T>, query: PageQuery) -> Vec<T> {
    let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Shared in-memory store. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of microposts whose `user_id` is `user_id`, deleted owner or not
    pub fn microposts_referencing(&self, user_id: UserId) -> usize {
        self.state
            .lock()
            .microposts
            .values()
            .filter(|post| post.user_id == user_id)
            .count()
    }

    /// Number of follow edges touching `user_id`
    pub fn edges_touching(&self, user_id: UserId) -> usize {
        self.state
            .lock()
            .relationships
            .keys()
            .filter(|(follower, followed)| *follower == user_id || *followed == user_id)
            .count()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.state.lock().users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .state
            .lock()
            .users
            .values()
            .find(|stored| stored.user.email.to_lowercase() == email)
            .map(|stored| stored.user.clone()))
    }

    async fn email_exists(&self, email: &str, except: Option<UserId>) -> RepoResult<bool> {
        Ok(self.state.lock().email_taken(email, except))
    }

    async fn create(&self, new_user: &NewUser, password_hash: &str) -> RepoResult<User> {
        let mut state = self.state.lock();
        if state.email_taken(&new_user.email, None) {
            return Err(DomainError::EmailAlreadyExists);
        }

        state.last_user_id += 1;
        let id = UserId::new(state.last_user_id);
        let mut user = User::new(id, new_user.name.clone(), &new_user.email);
        user.admin = new_user.admin;
        user.activation_digest = new_user.activation_digest.clone();

        state.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user)
    }

    async fn update_profile(&self, user: &User) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.email_taken(&user.email, Some(user.id)) {
            return Err(DomainError::EmailAlreadyExists);
        }
        let stored = state.user_mut(user.id)?;
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: UserId) -> RepoResult<u64> {
        let mut state = self.state.lock();
        if state.users.remove(&id).is_none() {
            return Err(DomainError::UserNotFound(id));
        }

        let before = state.microposts.len();
        state.microposts.retain(|_, post| post.user_id != id);
        let removed = before - state.microposts.len();

        state
            .relationships
            .retain(|(follower, followed), _| *follower != id && *followed != id);

        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        Ok(self
            .state
            .lock()
            .users
            .get(&id)
            .map(|stored| stored.password_hash.clone()))
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let mut state = self.state.lock();
        let stored = state.users.get_mut(&id).ok_or(DomainError::UserNotFound(id))?;
        stored.password_hash = password_hash.to_string();
        stored.user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_remember_digest(&self, id: UserId, digest: Option<&str>) -> RepoResult<()> {
        let mut state = self.state.lock();
        state.user_mut(id)?.remember_digest = digest.map(str::to_string);
        Ok(())
    }

    async fn activate(&self, id: UserId, activated_at: DateTime<Utc>) -> RepoResult<()> {
        let mut state = self.state.lock();
        state.user_mut(id)?.activate(activated_at);
        Ok(())
    }

    async fn update_reset_digest(
        &self,
        id: UserId,
        digest: Option<&str>,
        sent_at: Option<DateTime<Utc>>,
    ) -> RepoResult<()> {
        let mut state = self.state.lock();
        let user = state.user_mut(id)?;
        user.reset_digest = digest.map(str::to_string);
        user.reset_sent_at = sent_at;
        Ok(())
    }

    async fn set_admin(&self, id: UserId, admin: bool) -> RepoResult<()> {
        let mut state = self.state.lock();
        state.user_mut(id)?.admin = admin;
        Ok(())
    }

    async fn list_activated(&self, query: PageQuery) -> RepoResult<Vec<User>> {
        let state = self.state.lock();
        let users = state
            .users
            .values()
            .filter(|stored| stored.user.activated)
            .map(|stored| stored.user.clone())
            .collect();
        Ok(window(users, query))
    }

    async fn count_activated(&self) -> RepoResult<i64> {
        let state = self.state.lock();
        Ok(count(
            state.users.values().filter(|stored| stored.user.activated).count(),
        ))
    }
}

#[async_trait]
impl MicropostRepository for MemoryStore {
    async fn find_by_id(&self, id: MicropostId) -> RepoResult<Option<Micropost>> {
        Ok(self.state.lock().microposts.get(&id).cloned())
    }

    async fn create(&self, micropost: &NewMicropost) -> RepoResult<Micropost> {
        validate_content(&micropost.content)?;

        let mut state = self.state.lock();
        if !state.users.contains_key(&micropost.user_id) {
            return Err(DomainError::UserNotFound(micropost.user_id));
        }

        state.last_micropost_id += 1;
        let now = Utc::now();
        let post = Micropost {
            id: MicropostId::new(state.last_micropost_id),
            user_id: micropost.user_id,
            content: micropost.content.clone(),
            created_at: now,
            updated_at: now,
        };
        state.microposts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: MicropostId) -> RepoResult<()> {
        self.state
            .lock()
            .microposts
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::MicropostNotFound(id))
    }

    async fn find_by_user(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<Micropost>> {
        let state = self.state.lock();
        Ok(window(
            state.posts_newest_first(|post| post.user_id == user_id),
            query,
        ))
    }

    async fn count_by_user(&self, user_id: UserId) -> RepoResult<i64> {
        let state = self.state.lock();
        Ok(count(
            state
                .microposts
                .values()
                .filter(|post| post.user_id == user_id)
                .count(),
        ))
    }

    async fn feed(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<Micropost>> {
        let state = self.state.lock();
        let relationships = &state.relationships;
        let posts = state.posts_newest_first(|post| {
            post.user_id == user_id || relationships.contains_key(&(user_id, post.user_id))
        });
        Ok(window(posts, query))
    }

    async fn count_feed(&self, user_id: UserId) -> RepoResult<i64> {
        let state = self.state.lock();
        Ok(count(
            state
                .microposts
                .values()
                .filter(|post| {
                    post.user_id == user_id
                        || state.relationships.contains_key(&(user_id, post.user_id))
                })
                .count(),
        ))
    }
}

#[async_trait]
impl RelationshipRepository for MemoryStore {
    async fn follow(&self, edge: FollowEdge) -> RepoResult<bool> {
        let mut state = self.state.lock();
        for id in [edge.follower_id, edge.followed_id] {
            if !state.users.contains_key(&id) {
                return Err(DomainError::UserNotFound(id));
            }
        }

        let key = (edge.follower_id, edge.followed_id);
        if state.relationships.contains_key(&key) {
            return Ok(false);
        }
        state.relationships.insert(key, Relationship::new(edge));
        Ok(true)
    }

    async fn unfollow(&self, follower_id: UserId, followed_id: UserId) -> RepoResult<bool> {
        Ok(self
            .state
            .lock()
            .relationships
            .remove(&(follower_id, followed_id))
            .is_some())
    }

    async fn find(
        &self,
        follower_id: UserId,
        followed_id: UserId,
    ) -> RepoResult<Option<Relationship>> {
        Ok(self
            .state
            .lock()
            .relationships
            .get(&(follower_id, followed_id))
            .cloned())
    }

    async fn following(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<User>> {
        let state = self.state.lock();
        let users = state.edge_users(|edge| (edge.follower_id == user_id).then_some(edge.followed_id));
        Ok(window(users, query))
    }

    async fn followers(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<User>> {
        let state = self.state.lock();
        let users = state.edge_users(|edge| (edge.followed_id == user_id).then_some(edge.follower_id));
        Ok(window(users, query))
    }

    async fn count_following(&self, user_id: UserId) -> RepoResult<i64> {
        let state = self.state.lock();
        Ok(count(
            state
                .relationships
                .keys()
                .filter(|(follower, _)| *follower == user_id)
                .count(),
        ))
    }

    async fn count_followers(&self, user_id: UserId) -> RepoResult<i64> {
        let state = self.state.lock();
        Ok(count(
            state
                .relationships
                .keys()
                .filter(|(_, followed)| *followed == user_id)
                .count(),
        ))
    }
}
