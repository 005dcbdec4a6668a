//! Joke persistence.
//!
//! [`JokeStore`] is the seam the HTTP handlers talk to. [`PgJokeStore`] backs
//! it with PostgreSQL; [`MemoryJokeStore`] keeps everything in process and is
//! used when no database is configured.

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Joke, NewJoke};

const CREATE_JOKES_TABLE: &str = "CREATE TABLE IF NOT EXISTS jokes (
    id BIGSERIAL PRIMARY KEY,
    entry_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    author VARCHAR(255) NOT NULL,
    joke_text TEXT NOT NULL
)";

const SELECT_RANDOM_JOKE: &str =
    "SELECT id, entry_date, author, joke_text FROM jokes ORDER BY RANDOM() LIMIT 1";

const INSERT_JOKE: &str = "INSERT INTO jokes (author, joke_text) VALUES ($1, $2) \
     RETURNING id, entry_date, author, joke_text";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation timed out")]
    Timeout,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait JokeStore: Send + Sync {
    // One pseudo-random joke, None when the store is empty
    async fn random(&self) -> Result<Option<Joke>, StoreError>;

    // Insert and return the joke with its assigned id and entry date
    async fn insert(&self, joke: NewJoke) -> Result<Joke, StoreError>;
}

#[derive(Clone)]
pub struct PgJokeStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgJokeStore {
    pub async fn connect(db_url: &str, query_timeout: Duration) -> Result<Self, StoreError> {
        let pool = tokio::time::timeout(
            Duration::from_secs(2),
            PgPoolOptions::new().max_connections(8).connect(db_url),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;

        Ok(Self::from_pool(pool, query_timeout))
    }

    pub fn from_pool(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        tokio::time::timeout(
            Duration::from_secs(10),
            sqlx::query(CREATE_JOKES_TABLE).execute(&self.pool),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl JokeStore for PgJokeStore {
    async fn random(&self) -> Result<Option<Joke>, StoreError> {
        let joke = tokio::time::timeout(
            self.query_timeout,
            sqlx::query_as::<_, Joke>(SELECT_RANDOM_JOKE).fetch_optional(&self.pool),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;
        Ok(joke)
    }

    async fn insert(&self, joke: NewJoke) -> Result<Joke, StoreError> {
        let created = tokio::time::timeout(
            self.query_timeout,
            sqlx::query_as::<_, Joke>(INSERT_JOKE)
                .bind(joke.author())
                .bind(joke.joke_text())
                .fetch_one(&self.pool),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;
        Ok(created)
    }
}

#[derive(Default)]
pub struct MemoryJokeStore {
    jokes: Mutex<Vec<Joke>>,
}

impl MemoryJokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Joke>> {
        match self.jokes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl JokeStore for MemoryJokeStore {
    async fn random(&self) -> Result<Option<Joke>, StoreError> {
        let jokes = self.lock();
        Ok(jokes.choose(&mut rand::thread_rng()).cloned())
    }

    async fn insert(&self, joke: NewJoke) -> Result<Joke, StoreError> {
        let mut jokes = self.lock();
        let created = Joke {
            id: jokes.len() as i64 + 1,
            entry_date: Utc::now(),
            author: joke.author().to_string(),
            joke_text: joke.joke_text().to_string(),
        };
        jokes.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WriteRequest;

    fn new_joke(author: &str, joke_text: &str) -> NewJoke {
        NewJoke::parse(WriteRequest {
            author: author.to_string(),
            joke_text: joke_text.to_string(),
        })
        .expect("test joke should be valid")
    }

    #[tokio::test]
    async fn empty_memory_store_has_no_random_joke() {
        let store = MemoryJokeStore::new();
        assert!(store.random().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_store_assigns_increasing_ids() {
        let store = MemoryJokeStore::new();
        let first = store.insert(new_joke("Jane", "one")).await.unwrap();
        let second = store.insert(new_joke("Joe", "two")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.author, "Joe");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn random_returns_a_stored_joke() {
        let store = MemoryJokeStore::new();
        let created = store.insert(new_joke("Jane", "Valid text")).await.unwrap();
        let fetched = store.random().await.unwrap().expect("store has one joke");
        assert_eq!(fetched, created);
    }
}
