//! In-memory directory (for development and testing)

use super::Directory;
use async_trait::async_trait;
use postboard_core::{Account, AccountChanges, BoardError, BoardResult, Post, PostChanges};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Records are kept in insertion order; listings reverse it.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    accounts: RwLock<Vec<Account>>,
    posts: RwLock<Vec<Post>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_of(existing: &Account, candidate: &Account) -> Option<&'static str> {
    if existing.email == candidate.email {
        Some("email")
    } else if existing.username == candidate.username {
        Some("username")
    } else {
        None
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn insert_account(&self, account: Account) -> BoardResult<()> {
        let mut accounts = self.accounts.write().await;

        if let Some(field) = accounts.iter().find_map(|a| duplicate_of(a, &account)) {
            return Err(BoardError::conflict(
                format!("User with this {} already exists. Please login.", field),
                "memory_store",
            ));
        }

        debug!(user_id = %account.user_id, "Inserting account");
        accounts.push(account);
        Ok(())
    }

    async fn account_by_id(&self, user_id: &str) -> BoardResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.user_id == user_id).cloned())
    }

    async fn account_by_email(&self, email: &str) -> BoardResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn account_by_username(&self, username: &str) -> BoardResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn count_accounts_by_email(&self, email: &str) -> BoardResult<u64> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().filter(|a| a.email == email).count() as u64)
    }

    async fn count_accounts_by_username(&self, username: &str) -> BoardResult<u64> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().filter(|a| a.username == username).count() as u64)
    }

    async fn list_accounts(&self) -> BoardResult<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().rev().cloned().collect())
    }

    async fn update_account(
        &self,
        user_id: &str,
        changes: &AccountChanges,
    ) -> BoardResult<Option<Account>> {
        let mut accounts = self.accounts.write().await;

        let Some(index) = accounts.iter().position(|a| a.user_id == user_id) else {
            return Ok(None);
        };

        let mut updated = accounts[index].clone();
        changes.apply(&mut updated);

        let clash = accounts
            .iter()
            .filter(|a| a.user_id != user_id)
            .find_map(|a| duplicate_of(a, &updated));
        if let Some(field) = clash {
            return Err(BoardError::conflict(
                format!("User with this {} already exists.", field),
                "memory_store",
            ));
        }

        accounts[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_account(&self, user_id: &str) -> BoardResult<bool> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|a| a.user_id != user_id);

        let deleted = accounts.len() < before;
        if deleted {
            info!("User with {} deleted successfully.", user_id);
        } else {
            info!("No user found with id {}.", user_id);
        }
        Ok(deleted)
    }

    async fn insert_post(&self, post: Post) -> BoardResult<()> {
        debug!(post_id = %post.post_id, "Inserting post");
        self.posts.write().await.push(post);
        Ok(())
    }

    async fn post_by_id(&self, post_id: &str) -> BoardResult<Option<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.post_id == post_id).cloned())
    }

    async fn posts_by_username(&self, username: &str) -> BoardResult<Vec<Post>> {
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .rev()
            .filter(|p| p.username == username)
            .cloned()
            .collect())
    }

    async fn first_post_by_username(&self, username: &str) -> BoardResult<Option<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.username == username).cloned())
    }

    async fn list_posts(&self) -> BoardResult<Vec<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.iter().rev().cloned().collect())
    }

    async fn update_post(
        &self,
        post_id: &str,
        changes: &PostChanges,
    ) -> BoardResult<Option<Post>> {
        let mut posts = self.posts.write().await;
        Ok(posts.iter_mut().find(|p| p.post_id == post_id).map(|post| {
            changes.apply(post);
            post.clone()
        }))
    }

    async fn delete_post(&self, post_id: &str) -> BoardResult<bool> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.post_id != post_id);

        let deleted = posts.len() < before;
        if deleted {
            info!("Post with {} deleted successfully.", post_id);
        } else {
            info!("No post found with id {}.", post_id);
        }
        Ok(deleted)
    }
}
