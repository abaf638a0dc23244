use serde::{Deserialize, Serialize};

use crate::error::FeedError;

pub type PostId = u64;

/// A single feed entry as served by `GET /posts`.
///
/// The backend has shipped two spellings of the same record; the Spanish
/// field names are accepted on input, output always uses the English ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(alias = "usuario")]
    pub username: String,
    #[serde(rename = "image", alias = "foto")]
    pub image_url: String,
    #[serde(alias = "descripcion")]
    pub description: String,
    #[serde(rename = "likes", alias = "megusta", default)]
    pub like_count: u64,
    #[serde(alias = "comentarios", default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn is_liked(&self) -> bool {
        self.like_count > 0
    }

    /// Upper-cased first letter of the username, shown as the avatar.
    pub fn initial(&self) -> String {
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(alias = "usuario")]
    pub username: String,
    #[serde(alias = "texto")]
    pub text: String,
}

/// Body of `POST /posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub username: String,
    #[serde(rename = "image")]
    pub image_url: String,
    pub description: String,
}

impl NewPost {
    pub fn new(
        username: impl Into<String>,
        image_url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            image_url: image_url.into(),
            description: description.into(),
        }
    }

    /// First field that is empty or only whitespace, by wire name.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("username", &self.username),
            ("image", &self.image_url),
            ("description", &self.description),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }

    /// Presence check only.
    pub fn validate(&self) -> Result<(), FeedError> {
        match self.missing_field() {
            Some(field) => Err(FeedError::Validation { field }),
            None => Ok(()),
        }
    }

    pub fn trimmed(&self) -> Self {
        Self::new(
            self.username.trim(),
            self.image_url.trim(),
            self.description.trim(),
        )
    }
}

/// Response of `POST|DELETE /posts/{id}/like`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LikeResponse {
    pub likes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_schemas_decode_to_the_same_post() {
        let english = r#"{
            "id": 1,
            "username": "Ana",
            "image": "https://img.example/1.jpg",
            "description": "Sunset",
            "comments": [{"username": "Carlos", "text": "Nice"}],
            "likes": 1
        }"#;
        let spanish = r#"{
            "id": 1,
            "usuario": "Ana",
            "foto": "https://img.example/1.jpg",
            "descripcion": "Sunset",
            "comentarios": [{"usuario": "Carlos", "texto": "Nice"}],
            "megusta": 1
        }"#;
        let a: Post = serde_json::from_str(english).unwrap();
        let b: Post = serde_json::from_str(spanish).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.comments.len(), 1);
        assert!(a.is_liked());
    }

    #[test]
    fn missing_likes_and_comments_default() {
        let post: Post = serde_json::from_str(
            r#"{"id": 7, "username": "bo", "image": "x.png", "description": "d"}"#,
        )
        .unwrap();
        assert_eq!(post.like_count, 0);
        assert!(post.comments.is_empty());
        assert_eq!(post.initial(), "B");
    }

    #[test]
    fn new_post_serializes_with_wire_names() {
        let body = serde_json::to_value(NewPost::new("ana", "https://i/1.png", "hi")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"username": "ana", "image": "https://i/1.png", "description": "hi"})
        );
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let err = NewPost::new("ana", "   ", "hi").validate().unwrap_err();
        assert!(matches!(err, FeedError::Validation { field: "image" }));
        assert!(NewPost::default().validate().is_err());
        assert!(NewPost::new("a", "b", "c").validate().is_ok());
    }
}
