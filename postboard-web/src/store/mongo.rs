//! MongoDB-backed directory

use super::{Directory, POST_COLLECTION, USER_COLLECTION};
use async_trait::async_trait;
use bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use postboard_core::{Account, AccountChanges, BoardError, BoardResult, Post, PostChanges, Role};
use serde::{Deserialize, Serialize};
use tracing::info;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountDoc {
    #[serde(rename = "_id")]
    user_id: String,
    username: String,
    email: String,
    password: String,
    usertype: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl From<Account> for AccountDoc {
    fn from(account: Account) -> Self {
        Self {
            user_id: account.user_id,
            username: account.username,
            email: account.email,
            password: account.password_hash,
            usertype: account.role.as_str().to_string(),
            created_at: account.created_at,
        }
    }
}

impl From<AccountDoc> for Account {
    fn from(doc: AccountDoc) -> Self {
        Self {
            user_id: doc.user_id,
            username: doc.username,
            email: doc.email,
            password_hash: doc.password,
            role: Role::parse(&doc.usertype),
            created_at: doc.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PostDoc {
    #[serde(rename = "_id")]
    post_id: String,
    username: String,
    email: String,
    title: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl From<Post> for PostDoc {
    fn from(post: Post) -> Self {
        Self {
            post_id: post.post_id,
            username: post.username,
            email: post.email,
            title: post.title,
            created_at: post.created_at,
        }
    }
}

impl From<PostDoc> for Post {
    fn from(doc: PostDoc) -> Self {
        Self {
            post_id: doc.post_id,
            username: doc.username,
            email: doc.email,
            title: doc.title,
            created_at: doc.created_at,
        }
    }
}

fn store_error(operation: &str, e: mongodb::error::Error) -> BoardError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = e.kind.as_ref() {
        if write_error.code == DUPLICATE_KEY {
            let field = if write_error.message.contains("email") {
                "email"
            } else {
                "username"
            };
            return BoardError::conflict(
                format!("User with this {} already exists.", field),
                "mongo_store",
            );
        }
    }

    BoardError::storage(format!("MongoDB {} failed", operation), e, "mongo_store")
}

fn account_updates(changes: &AccountChanges) -> Document {
    let mut set = Document::new();
    if let Some(username) = &changes.username {
        set.insert("username", username.as_str());
    }
    if let Some(email) = &changes.email {
        set.insert("email", email.as_str());
    }
    if let Some(hash) = &changes.password_hash {
        set.insert("password", hash.as_str());
    }
    if let Some(role) = changes.role {
        set.insert("usertype", role.as_str());
    }
    set
}

/// Directory stored in the `users` and `posts` collections of one database
#[derive(Clone)]
pub struct MongoDirectory {
    users: Collection<AccountDoc>,
    posts: Collection<PostDoc>,
}

impl MongoDirectory {
    /// Connect, verify the server answers and ensure the indexes exist
    pub async fn connect(uri: &str, database: &str) -> BoardResult<Self> {
        info!("Connecting to MongoDB database '{}'", database);

        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| store_error("connect", e))?;

        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| store_error("ping", e))?;

        let directory = Self {
            users: db.collection(USER_COLLECTION),
            posts: db.collection(POST_COLLECTION),
        };
        directory.apply_indexes().await?;

        info!("Connected to MongoDB database '{}'", database);
        Ok(directory)
    }

    async fn apply_indexes(&self) -> BoardResult<()> {
        let unique = |field: &str| {
            let mut keys = Document::new();
            keys.insert(field, 1);
            IndexModel::builder()
                .keys(keys)
                .options(Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name(format!("{}_unique", field))
                        .build(),
                ))
                .build()
        };

        self.users
            .create_indexes(vec![unique("email"), unique("username")])
            .await
            .map_err(|e| store_error("create_indexes", e))?;

        self.posts
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1, "created_at": 1 })
                    .build(),
            )
            .await
            .map_err(|e| store_error("create_indexes", e))?;

        Ok(())
    }

    async fn find_account(&self, filter: Document) -> BoardResult<Option<Account>> {
        let found = self
            .users
            .find_one(filter)
            .await
            .map_err(|e| store_error("find", e))?;
        Ok(found.map(Account::from))
    }

    async fn find_posts(&self, filter: Document) -> BoardResult<Vec<Post>> {
        let docs: Vec<PostDoc> = self
            .posts
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(|e| store_error("find", e))?
            .try_collect()
            .await
            .map_err(|e| store_error("find", e))?;
        Ok(docs.into_iter().map(Post::from).collect())
    }
}

#[async_trait]
impl Directory for MongoDirectory {
    async fn insert_account(&self, account: Account) -> BoardResult<()> {
        self.users
            .insert_one(AccountDoc::from(account))
            .await
            .map_err(|e| store_error("insert", e))?;
        Ok(())
    }

    async fn account_by_id(&self, user_id: &str) -> BoardResult<Option<Account>> {
        self.find_account(doc! { "_id": user_id }).await
    }

    async fn account_by_email(&self, email: &str) -> BoardResult<Option<Account>> {
        self.find_account(doc! { "email": email }).await
    }

    async fn account_by_username(&self, username: &str) -> BoardResult<Option<Account>> {
        self.find_account(doc! { "username": username }).await
    }

    async fn count_accounts_by_email(&self, email: &str) -> BoardResult<u64> {
        self.users
            .count_documents(doc! { "email": email })
            .await
            .map_err(|e| store_error("count", e))
    }

    async fn count_accounts_by_username(&self, username: &str) -> BoardResult<u64> {
        self.users
            .count_documents(doc! { "username": username })
            .await
            .map_err(|e| store_error("count", e))
    }

    async fn list_accounts(&self) -> BoardResult<Vec<Account>> {
        let docs: Vec<AccountDoc> = self
            .users
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(|e| store_error("find", e))?
            .try_collect()
            .await
            .map_err(|e| store_error("find", e))?;
        Ok(docs.into_iter().map(Account::from).collect())
    }

    async fn update_account(
        &self,
        user_id: &str,
        changes: &AccountChanges,
    ) -> BoardResult<Option<Account>> {
        let updates = account_updates(changes);
        if updates.is_empty() {
            return self.account_by_id(user_id).await;
        }

        let updated = self
            .users
            .find_one_and_update(doc! { "_id": user_id }, doc! { "$set": updates })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| store_error("update", e))?;
        Ok(updated.map(Account::from))
    }

    async fn delete_account(&self, user_id: &str) -> BoardResult<bool> {
        let result = self
            .users
            .delete_one(doc! { "_id": user_id })
            .await
            .map_err(|e| store_error("delete", e))?;

        if result.deleted_count > 0 {
            info!("User with {} deleted successfully.", user_id);
        } else {
            info!("No user found with id {}.", user_id);
        }
        Ok(result.deleted_count > 0)
    }

    async fn insert_post(&self, post: Post) -> BoardResult<()> {
        self.posts
            .insert_one(PostDoc::from(post))
            .await
            .map_err(|e| store_error("insert", e))?;
        Ok(())
    }

    async fn post_by_id(&self, post_id: &str) -> BoardResult<Option<Post>> {
        let found = self
            .posts
            .find_one(doc! { "_id": post_id })
            .await
            .map_err(|e| store_error("find", e))?;
        Ok(found.map(Post::from))
    }

    async fn posts_by_username(&self, username: &str) -> BoardResult<Vec<Post>> {
        self.find_posts(doc! { "username": username }).await
    }

    async fn first_post_by_username(&self, username: &str) -> BoardResult<Option<Post>> {
        let found = self
            .posts
            .find_one(doc! { "username": username })
            .sort(doc! { "created_at": 1 })
            .await
            .map_err(|e| store_error("find", e))?;
        Ok(found.map(Post::from))
    }

    async fn list_posts(&self) -> BoardResult<Vec<Post>> {
        self.find_posts(doc! {}).await
    }

    async fn update_post(
        &self,
        post_id: &str,
        changes: &PostChanges,
    ) -> BoardResult<Option<Post>> {
        let Some(title) = &changes.title else {
            return self.post_by_id(post_id).await;
        };

        let updated = self
            .posts
            .find_one_and_update(
                doc! { "_id": post_id },
                doc! { "$set": { "title": title.as_str() } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| store_error("update", e))?;
        Ok(updated.map(Post::from))
    }

    async fn delete_post(&self, post_id: &str) -> BoardResult<bool> {
        let result = self
            .posts
            .delete_one(doc! { "_id": post_id })
            .await
            .map_err(|e| store_error("delete", e))?;

        if result.deleted_count > 0 {
            info!("Post with {} deleted successfully.", post_id);
        } else {
            info!("No post found with id {}.", post_id);
        }
        Ok(result.deleted_count > 0)
    }
}
