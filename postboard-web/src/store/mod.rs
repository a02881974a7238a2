//! Account directory: persistence for accounts and posts
//!
//! Handlers only see the [`Directory`] trait. Two back ends are provided:
//! an in-memory store for development and tests, and MongoDB.

mod memory;
#[cfg(feature = "mongo")]
mod mongo;

pub use memory::MemoryDirectory;
#[cfg(feature = "mongo")]
pub use mongo::MongoDirectory;

use async_trait::async_trait;
use postboard_core::{Account, AccountChanges, BoardResult, Post, PostChanges};

/// Collection holding accounts
pub const USER_COLLECTION: &str = "users";
/// Collection holding posts
pub const POST_COLLECTION: &str = "posts";

/// Storage operations used by the resource handlers.
///
/// Listings are returned newest first. Inserting an account whose username or
/// email is already taken fails with a `Conflict` error.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn insert_account(&self, account: Account) -> BoardResult<()>;

    async fn account_by_id(&self, user_id: &str) -> BoardResult<Option<Account>>;

    async fn account_by_email(&self, email: &str) -> BoardResult<Option<Account>>;

    async fn account_by_username(&self, username: &str) -> BoardResult<Option<Account>>;

    async fn count_accounts_by_email(&self, email: &str) -> BoardResult<u64>;

    async fn count_accounts_by_username(&self, username: &str) -> BoardResult<u64>;

    async fn list_accounts(&self) -> BoardResult<Vec<Account>>;

    /// Returns the updated account, or `None` if it does not exist
    async fn update_account(
        &self,
        user_id: &str,
        changes: &AccountChanges,
    ) -> BoardResult<Option<Account>>;

    /// Returns `false` if nothing was deleted
    async fn delete_account(&self, user_id: &str) -> BoardResult<bool>;

    async fn insert_post(&self, post: Post) -> BoardResult<()>;

    async fn post_by_id(&self, post_id: &str) -> BoardResult<Option<Post>>;

    async fn posts_by_username(&self, username: &str) -> BoardResult<Vec<Post>>;

    /// Oldest post written under `username`
    async fn first_post_by_username(&self, username: &str) -> BoardResult<Option<Post>>;

    async fn list_posts(&self) -> BoardResult<Vec<Post>>;

    async fn update_post(&self, post_id: &str, changes: &PostChanges)
        -> BoardResult<Option<Post>>;

    async fn delete_post(&self, post_id: &str) -> BoardResult<bool>;
}
