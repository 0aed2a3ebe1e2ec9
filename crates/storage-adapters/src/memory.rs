//! # In-memory Store
//!
//! A `DashMap`-backed implementation of every persistence port. Uniqueness is
//! enforced through the map entry API and deletes cascade the same way the
//! PostgreSQL foreign keys do, so the HTTP layer behaves identically on either
//! backend. Nothing survives a restart.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::{mapref::entry::Entry, DashMap};
use domains::{
    Account, AccountRepo, AdminGrantRepo, Comment, CommentRepo, CommentView, Complaint, ComplaintRepo,
    DomainError, Like, LikeRepo, LikeSubject, ListingMode, NewAccount, Post, PostChanges, PostFilters,
    PostListing, PostQuery, PostRepo, Profile, Result,
};
use uuid::Uuid;

use crate::messages;

#[derive(Default)]
pub struct MemoryStore {
    accounts: DashMap<Uuid, Account>,
    emails: DashMap<String, Uuid>,
    handles: DashMap<String, Uuid>,
    handle_of: DashMap<Uuid, String>,
    admin_grants: DashMap<Uuid, bool>,
    posts: DashMap<Uuid, Post>,
    comments: DashMap<Uuid, Comment>,
    post_likes: DashMap<(Uuid, Uuid), Like>,
    comment_likes: DashMap<(Uuid, Uuid), Like>,
    complaints: DashMap<Uuid, Complaint>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Out-of-band grant management, the in-memory counterpart of the seed CLI.
    pub fn set_admin(&self, account_id: Uuid, is_admin: bool) -> Result<()> {
        if !self.accounts.contains_key(&account_id) {
            return Err(DomainError::not_found(messages::ACCOUNT_NOT_FOUND));
        }
        self.admin_grants.insert(account_id, is_admin);
        Ok(())
    }

    fn profile_of(&self, account: &Account) -> Profile {
        Profile {
            id: account.id,
            email: account.email.clone(),
            username: self.handle_of.get(&account.id).map(|h| h.value().clone()),
            is_blocked: account.is_blocked,
            created_at: account.created_at,
        }
    }

    fn view_of(&self, comment: Comment, viewer: Option<Uuid>) -> CommentView {
        let like_count = self
            .comment_likes
            .iter()
            .filter(|entry| entry.key().0 == comment.id)
            .count() as i64;
        let liked = viewer.is_some_and(|who| self.comment_likes.contains_key(&(comment.id, who)));
        CommentView {
            username: self.handle_of.get(&comment.author_id).map(|h| h.value().clone()),
            comment,
            like_count,
            liked,
        }
    }

    fn remove_comment_cascade(&self, id: Uuid) -> Option<Comment> {
        let (_, comment) = self.comments.remove(&id)?;
        self.comment_likes.retain(|(comment_id, _), _| *comment_id != id);
        self.complaints.retain(|_, c| c.comment_id != id);
        Some(comment)
    }
}

fn matches_filters(post: &Post, filters: &PostFilters) -> bool {
    let in_list = |value: &Option<String>, list: &[String]| {
        list.is_empty() || value.as_ref().is_some_and(|v| list.contains(v))
    };
    let search_hit = filters.search.as_ref().is_none_or(|term| {
        let term = term.to_lowercase();
        post.title.to_lowercase().contains(&term) || post.content.to_lowercase().contains(&term)
    });
    in_list(&post.bank_name, &filters.banks) && in_list(&post.category, &filters.categories) && search_hit
}

fn plan_listing(mut posts: Vec<Post>, mode: &ListingMode, today: NaiveDate) -> Vec<PostListing> {
    match mode {
        ListingMode::Filtered(filters) => {
            posts.retain(|p| p.is_active(today) && matches_filters(p, filters));
            posts.sort_by_key(|p| (p.remaining_days(today), p.id));
            posts
                .into_iter()
                .map(|post| PostListing { remaining_days: Some(post.remaining_days(today)), post })
                .collect()
        }
        ListingMode::Unfiltered => {
            posts.sort_by(|a, b| {
                let (a_active, b_active) = (a.is_active(today), b.is_active(today));
                b_active
                    .cmp(&a_active)
                    .then_with(|| match a_active {
                        true => a.end_date.cmp(&b.end_date),
                        false => b.end_date.cmp(&a.end_date),
                    })
                    .then_with(|| a.id.cmp(&b.id))
            });
            posts
                .into_iter()
                .map(|post| PostListing {
                    remaining_days: post.is_active(today).then(|| post.remaining_days(today)),
                    post,
                })
                .collect()
        }
    }
}

#[async_trait]
impl AccountRepo for MemoryStore {
    async fn create_with_handle(&self, new: NewAccount) -> Result<Profile> {
        // Both claims stay locked until the account row exists. Lock order is
        // always emails then handles.
        let Entry::Vacant(email_slot) = self.emails.entry(new.email.clone()) else {
            return Err(DomainError::Conflict(messages::EMAIL_TAKEN.into()));
        };
        let Entry::Vacant(handle_slot) = self.handles.entry(new.handle.clone()) else {
            return Err(DomainError::Conflict(messages::HANDLE_TAKEN.into()));
        };

        let account = Account {
            id: new.id,
            email: new.email,
            password_hash: new.password_hash,
            is_blocked: false,
            created_at: new.created_at,
        };
        self.handle_of.insert(new.id, new.handle);
        let profile = self.profile_of(&account);
        self.accounts.insert(new.id, account);
        handle_slot.insert(new.id);
        email_slot.insert(new.id);
        Ok(profile)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let Some(id) = self.emails.get(email).map(|e| *e.value()) else {
            return Ok(None);
        };
        Ok(self.accounts.get(&id).map(|a| a.value().clone()))
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let account = self.accounts.get(&id).map(|a| a.value().clone());
        Ok(account.map(|a| self.profile_of(&a)))
    }

    async fn set_blocked(&self, id: Uuid, blocked: bool) -> Result<Option<Profile>> {
        let updated = self.accounts.get_mut(&id).map(|mut a| {
            a.is_blocked = blocked;
            a.value().clone()
        });
        Ok(updated.map(|a| self.profile_of(&a)))
    }
}

#[async_trait]
impl AdminGrantRepo for MemoryStore {
    async fn is_admin(&self, account_id: Uuid) -> Result<bool> {
        Ok(self.admin_grants.get(&account_id).is_some_and(|g| *g.value()))
    }
}

#[async_trait]
impl PostRepo for MemoryStore {
    async fn list(&self, query: &PostQuery) -> Result<Vec<PostListing>> {
        let posts: Vec<Post> = self.posts.iter().map(|p| p.value().clone()).collect();
        Ok(plan_listing(posts, &query.mode, query.today)
            .into_iter()
            .skip(query.page.offset as usize)
            .take(query.page.limit as usize)
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|p| p.value().clone()))
    }

    async fn create(&self, post: Post) -> Result<Post> {
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        Ok(self.posts.get_mut(&id).map(|mut post| {
            post.title = changes.title;
            post.content = changes.content;
            post.image_url = changes.image_url;
            post.bank_name = changes.bank_name;
            post.category = changes.category;
            post.value().clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        if self.posts.remove(&id).is_none() {
            return Ok(false);
        }
        self.post_likes.retain(|(post_id, _), _| *post_id != id);
        let orphaned: Vec<Uuid> = self
            .comments
            .iter()
            .filter(|c| c.post_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in orphaned {
            self.remove_comment_cascade(comment_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl CommentRepo for MemoryStore {
    async fn list_for_post(&self, post_id: Uuid, viewer: Option<Uuid>) -> Result<Vec<CommentView>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.value().clone())
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(comments.into_iter().map(|c| self.view_of(c, viewer)).collect())
    }

    async fn create(&self, comment: Comment) -> Result<CommentView> {
        if !self.posts.contains_key(&comment.post_id) {
            return Err(DomainError::not_found(messages::POST_NOT_FOUND));
        }
        if !self.accounts.contains_key(&comment.author_id) {
            return Err(DomainError::not_found(messages::ACCOUNT_NOT_FOUND));
        }
        self.comments.insert(comment.id, comment.clone());
        Ok(self.view_of(comment, None))
    }

    async fn update_owned(&self, id: Uuid, author_id: Uuid, content: String) -> Result<Option<Comment>> {
        let Some(mut comment) = self.comments.get_mut(&id) else {
            return Ok(None);
        };
        if comment.author_id != author_id {
            return Ok(None);
        }
        comment.content = content;
        Ok(Some(comment.value().clone()))
    }

    async fn delete_owned(&self, id: Uuid, author_id: Uuid) -> Result<bool> {
        let owned = self.comments.get(&id).is_some_and(|c| c.author_id == author_id);
        Ok(owned && self.remove_comment_cascade(id).is_some())
    }

    async fn delete_any(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.remove_comment_cascade(id))
    }
}

#[async_trait]
impl LikeRepo for MemoryStore {
    async fn insert_if_absent(&self, like: Like) -> Result<Option<Like>> {
        let (likes, exists, missing) = match like.subject {
            LikeSubject::Post(id) => (&self.post_likes, self.posts.contains_key(&id), messages::POST_NOT_FOUND),
            LikeSubject::Comment(id) => {
                (&self.comment_likes, self.comments.contains_key(&id), messages::COMMENT_NOT_FOUND)
            }
        };
        if !exists {
            return Err(DomainError::not_found(missing));
        }
        if !self.accounts.contains_key(&like.account_id) {
            return Err(DomainError::not_found(messages::ACCOUNT_NOT_FOUND));
        }

        match likes.entry((like.subject.id(), like.account_id)) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => {
                slot.insert(like.clone());
                Ok(Some(like))
            }
        }
    }

    async fn delete(&self, subject: LikeSubject, account_id: Uuid) -> Result<bool> {
        let likes = match subject {
            LikeSubject::Post(_) => &self.post_likes,
            LikeSubject::Comment(_) => &self.comment_likes,
        };
        Ok(likes.remove(&(subject.id(), account_id)).is_some())
    }

    async fn count(&self, subject: LikeSubject) -> Result<i64> {
        let likes = match subject {
            LikeSubject::Post(_) => &self.post_likes,
            LikeSubject::Comment(_) => &self.comment_likes,
        };
        Ok(likes.iter().filter(|e| e.key().0 == subject.id()).count() as i64)
    }
}

#[async_trait]
impl ComplaintRepo for MemoryStore {
    async fn create(&self, complaint: Complaint) -> Result<Complaint> {
        if !self.comments.contains_key(&complaint.comment_id) {
            return Err(DomainError::not_found(messages::COMMENT_NOT_FOUND));
        }
        self.complaints.insert(complaint.id, complaint.clone());
        Ok(complaint)
    }

    async fn list(&self) -> Result<Vec<Complaint>> {
        let mut all: Vec<Complaint> = self.complaints.iter().map(|c| c.value().clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.complaints.remove(&id).is_some())
    }
}
