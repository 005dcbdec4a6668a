use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_AUTHOR_LEN: usize = 255;
pub const MAX_JOKE_TEXT_LEN: usize = 2000;

// Stored joke, as returned by GET /random and POST /write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Joke {
    pub id: i64,
    pub entry_date: DateTime<Utc>,
    pub author: String,
    pub joke_text: String,
}

// POST /write body; missing fields decode as empty and fail validation
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WriteRequest {
    pub author: String,
    pub joke_text: String,
}

// Joke that passed validation and can go to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJoke {
    author: String,
    joke_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Author cannot be empty.")]
    EmptyAuthor,
    #[error("Author exceeds maximum length of 255 characters.")]
    AuthorTooLong,
    #[error("Joke text cannot be empty.")]
    EmptyText,
    #[error("Joke text exceeds maximum length of 2000 characters.")]
    TextTooLong,
}

impl NewJoke {
    // Lengths are byte counts. Checked in order, first violation wins
    pub fn parse(req: WriteRequest) -> Result<Self, ValidationError> {
        if req.author.is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }
        if req.author.len() > MAX_AUTHOR_LEN {
            return Err(ValidationError::AuthorTooLong);
        }
        if req.joke_text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if req.joke_text.len() > MAX_JOKE_TEXT_LEN {
            return Err(ValidationError::TextTooLong);
        }

        Ok(Self {
            author: req.author,
            joke_text: req.joke_text,
        })
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn joke_text(&self) -> &str {
        &self.joke_text
    }
}
