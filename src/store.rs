use std::collections::HashSet;

use crate::post::{Post, PostId};

/// Ordered posts for the current session. Order is render order and ids are
/// unique.
#[derive(Debug, Default)]
pub struct PostStore {
    posts: Vec<Post>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Replaces the whole collection, keeping server order. A repeated id keeps
    /// its first occurrence.
    pub fn replace_all(&mut self, posts: Vec<Post>) {
        let mut seen = HashSet::with_capacity(posts.len());
        let mut kept = Vec::with_capacity(posts.len());
        for post in posts {
            if seen.insert(post.id) {
                kept.push(post);
            } else {
                tracing::warn!(post_id = post.id, "dropping duplicate post from feed");
            }
        }
        self.posts = kept;
    }

    pub fn prepend(&mut self, post: Post) {
        self.posts.retain(|p| p.id != post.id);
        self.posts.insert(0, post);
    }

    pub fn find_by_id(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Returns false when no post has `id`.
    pub fn set_like_count(&mut self, id: PostId, count: u64) -> bool {
        match self.posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                post.like_count = count;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: PostId, username: &str) -> Post {
        Post {
            id,
            username: username.to_string(),
            image_url: format!("https://img.example/{id}.jpg"),
            description: format!("post {id}"),
            like_count: 0,
            comments: Vec::new(),
        }
    }

    fn ids(store: &PostStore) -> Vec<PostId> {
        store.posts().iter().map(|p| p.id).collect()
    }

    #[test]
    fn replace_all_keeps_order_and_first_duplicate() {
        let mut store = PostStore::new();
        store.replace_all(vec![post(3, "a"), post(1, "b"), post(3, "c"), post(2, "d")]);
        assert_eq!(ids(&store), vec![3, 1, 2]);
        assert_eq!(store.find_by_id(3).unwrap().username, "a");

        store.replace_all(Vec::new());
        assert!(store.is_empty());
    }

    #[test]
    fn prepend_puts_newest_first_without_duplicating() {
        let mut store = PostStore::new();
        store.replace_all(vec![post(1, "a"), post(2, "b")]);
        store.prepend(post(5, "new"));
        assert_eq!(ids(&store), vec![5, 1, 2]);

        store.prepend(post(2, "edited"));
        assert_eq!(ids(&store), vec![2, 5, 1]);
        assert_eq!(store.find_by_id(2).unwrap().username, "edited");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn set_like_count_targets_one_post() {
        let mut store = PostStore::new();
        store.replace_all(vec![post(1, "a"), post(2, "b")]);
        assert!(store.set_like_count(2, 1));
        assert_eq!(store.find_by_id(2).unwrap().like_count, 1);
        assert_eq!(store.find_by_id(1).unwrap().like_count, 0);
        assert!(!store.set_like_count(9, 1));
        assert!(store.find_by_id(9).is_none());
    }
}
