use std::collections::HashMap;

use anyhow::{Context as _, anyhow};
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::builtin;
use crate::event::UiEvent;
use crate::post::{NewPost, Post, PostId};

pub const LIKED_GLYPH: &str = "❤️";
pub const NOT_LIKED_GLYPH: &str = "🤍";
pub const EMPTY_FEED_MESSAGE: &str = "No posts available";
pub const LOADING_MESSAGE: &str = "Loading posts...";

pub fn like_glyph(count: u64) -> &'static str {
    if count > 0 { LIKED_GLYPH } else { NOT_LIKED_GLYPH }
}

/// The page document and the handles needed to update it in place.
///
/// Post controls are found through maps filled at render time, keyed by post
/// id. They are rebuilt by every [`FeedView::render_all`], so a handle never
/// outlives the node it points to.
pub struct FeedView {
    document: NodeRef,
    feed: NodeRef,
    refresh_button: NodeRef,
    form: NodeRef,
    like_controls: HashMap<PostId, NodeRef>,
    images: HashMap<PostId, NodeRef>,
    placeholder_image: String,
    alerts: Vec<String>,
}

impl FeedView {
    pub fn new(placeholder_image: &str) -> anyhow::Result<Self> {
        let document = kuchiki::parse_html().one(page_shell(placeholder_image).into_string());
        let feed = select_node(&document, "#feed")?;
        let refresh_button = select_node(&document, "#refreshBtn")?;
        let form = select_node(&document, "#newPostForm")?;
        Ok(Self {
            document,
            feed,
            refresh_button,
            form,
            like_controls: HashMap::new(),
            images: HashMap::new(),
            placeholder_image: placeholder_image.to_string(),
            alerts: Vec::new(),
        })
    }

    pub fn render_all(&mut self, posts: &[Post]) {
        self.clear_feed();
        if posts.is_empty() {
            self.show_status("loading", EMPTY_FEED_MESSAGE);
            return;
        }

        for (index, post) in posts.iter().enumerate() {
            let markup = render_post(post, index, &self.placeholder_image);
            let Some(article) = parse_element(markup, "article.post") else {
                tracing::error!(post_id = post.id, "post markup produced no article");
                continue;
            };
            if let Ok(button) = article.select_first(".like-btn") {
                self.like_controls.insert(post.id, button.as_node().clone());
            }
            if let Ok(img) = article.select_first("img.post-image") {
                self.images.insert(post.id, img.as_node().clone());
            }
            self.feed.append(article);
        }
        tracing::debug!(count = posts.len(), "rendered feed");
    }

    /// Updates the icon and count of one like button. Returns false when no
    /// control is rendered for `post_id`.
    pub fn render_like_control(&mut self, post_id: PostId, count: u64) -> bool {
        let Some(button) = self.like_controls.get(&post_id) else {
            return false;
        };
        if let Ok(icon) = button.select_first(".like-icon") {
            set_text(icon.as_node(), like_glyph(count));
        }
        if let Ok(counter) = button.select_first(".like-count") {
            set_text(counter.as_node(), &count.to_string());
        }
        true
    }

    pub fn render_loading(&mut self) {
        self.set_refreshing(true);
        self.clear_feed();
        self.show_status("loading", LOADING_MESSAGE);
    }

    pub fn render_error(&mut self, message: &str) {
        self.clear_feed();
        self.show_status("error", message);
    }

    pub fn set_refreshing(&mut self, refreshing: bool) {
        toggle_class(&self.refresh_button, "loading", refreshing);
    }

    pub fn is_refreshing(&self) -> bool {
        has_class(&self.refresh_button, "loading")
    }

    /// Swaps a post's image for the placeholder after a failed load.
    pub fn fallback_image(&mut self, post_id: PostId) -> bool {
        let Some(img) = self.images.get(&post_id) else {
            return false;
        };
        if let Some(el) = img.as_element() {
            el.attributes
                .borrow_mut()
                .insert("src", self.placeholder_image.clone());
        }
        true
    }

    pub fn set_form_open(&mut self, open: bool) {
        if let Some(el) = self.form.as_element() {
            let mut attrs = el.attributes.borrow_mut();
            if open {
                attrs.remove("hidden");
            } else {
                attrs.insert("hidden", String::new());
            }
        }
    }

    pub fn is_form_open(&self) -> bool {
        self.form
            .as_element()
            .is_some_and(|el| !el.attributes.borrow().contains("hidden"))
    }

    pub fn set_form_values(&mut self, draft: &NewPost) {
        for (selector, value) in [
            ("#postUsername", &draft.username),
            ("#postImage", &draft.image_url),
        ] {
            if let Ok(input) = self.form.select_first(selector) {
                input.attributes.borrow_mut().insert("value", value.clone());
            }
        }
        if let Ok(textarea) = self.form.select_first("#postDescription") {
            set_text(textarea.as_node(), &draft.description);
        }
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(alert = %message, "user alert");
        self.alerts.push(message);
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn like_control(&self, post_id: PostId) -> Option<&NodeRef> {
        self.like_controls.get(&post_id)
    }

    /// Resolves a clicked node to the event named by its nearest
    /// `data-action` ancestor.
    pub fn action_for(&self, target: &NodeRef) -> Option<UiEvent> {
        for node in target.inclusive_ancestors() {
            let Some(el) = node.as_element() else {
                continue;
            };
            let attrs = el.attributes.borrow();
            let Some(action) = attrs.get("data-action") else {
                continue;
            };
            let post_id = attrs
                .get("data-post-id")
                .and_then(|v| v.parse::<PostId>().ok());
            return match (action, post_id) {
                ("like", Some(id)) => Some(UiEvent::Like(id)),
                ("share", Some(id)) => Some(UiEvent::Share(id)),
                ("image", Some(id)) => Some(UiEvent::ImageFailed(id)),
                ("refresh", _) => Some(UiEvent::Refresh),
                ("open-form", _) => Some(UiEvent::OpenForm),
                ("cancel-form", _) => Some(UiEvent::CancelForm),
                ("submit-form", _) => Some(UiEvent::SubmitForm),
                _ => None,
            };
        }
        None
    }

    pub fn html(&self) -> anyhow::Result<String> {
        let mut out = Vec::new();
        self.document.serialize(&mut out).context("serialize page")?;
        String::from_utf8(out).context("page html not utf-8")
    }

    pub fn feed_text(&self) -> String {
        self.feed.text_contents()
    }

    pub fn rendered_post_ids(&self) -> Vec<PostId> {
        self.post_texts().into_iter().map(|(id, _)| id).collect()
    }

    /// `(post id, text content)` for every rendered post, in page order.
    pub fn post_texts(&self) -> Vec<(PostId, String)> {
        let Ok(articles) = self.feed.select("article.post") else {
            return Vec::new();
        };
        articles
            .filter_map(|article| {
                let id = article
                    .attributes
                    .borrow()
                    .get("data-post-id")?
                    .parse::<PostId>()
                    .ok()?;
                Some((id, article.as_node().text_contents()))
            })
            .collect()
    }

    pub fn status_messages(&self) -> Vec<String> {
        let Ok(nodes) = self.feed.select(".loading, .error") else {
            return Vec::new();
        };
        nodes
            .map(|n| collapse_whitespace(&n.as_node().text_contents()))
            .collect()
    }

    /// Plain-text rendering of the feed area for terminals.
    pub fn summary(&self) -> String {
        let Ok(articles) = self.feed.select("article.post") else {
            return String::new();
        };
        let mut lines = Vec::new();
        for article in articles {
            let node = article.as_node();
            let id = article
                .attributes
                .borrow()
                .get("data-post-id")
                .unwrap_or("?")
                .to_string();
            lines.push(format!(
                "[{id}] {}: {}  {} {}  {}",
                text_of(node, ".user-name"),
                text_of(node, ".post-description"),
                text_of(node, ".like-icon"),
                text_of(node, ".like-count"),
                text_of(node, ".comments-count"),
            ));
        }
        if lines.is_empty() {
            lines = self.status_messages();
        }
        lines.join("\n")
    }

    fn clear_feed(&mut self) {
        self.like_controls.clear();
        self.images.clear();
        for child in self.feed.children().collect::<Vec<_>>() {
            child.detach();
        }
    }

    fn show_status(&mut self, class: &str, message: &str) {
        let markup = html! { div class=(class) { (message) } };
        match parse_element(markup, "div") {
            Some(node) => self.feed.append(node),
            None => self.feed.append(NodeRef::new_text(message)),
        }
    }
}

fn page_shell(placeholder_image: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Mini Social" }
                style { (PreEscaped(builtin::FEED_CSS)) }
            }
            body data-placeholder-image=(placeholder_image) {
                header class="app-header" {
                    h1 { "Mini Social" }
                    div class="header-actions" {
                        button type="button" id="newPostBtn" class="new-post-btn" data-action="open-form" { "＋ New post" }
                        button type="button" id="refreshBtn" class="refresh-btn" data-action="refresh" { "⟳ Refresh" }
                    }
                }
                form id="newPostForm" class="new-post-form" hidden {
                    input type="text" id="postUsername" name="username" placeholder="Your name";
                    input type="url" id="postImage" name="image" placeholder="Image URL";
                    textarea id="postDescription" name="description" placeholder="What's on your mind?" {}
                    div class="form-actions" {
                        button type="button" data-action="cancel-form" { "Cancel" }
                        button type="submit" data-action="submit-form" { "Publish" }
                    }
                }
                main id="feed" class="feed" {}
                script { (PreEscaped(builtin::IMAGE_FALLBACK_JS)) }
            }
        }
    }
}

fn render_post(post: &Post, index: usize, placeholder_image: &str) -> Markup {
    let delay = format!("animation-delay: {:.1}s", index as f64 * 0.1);
    let comment_count = post.comments.len();
    let comment_label = if comment_count == 1 { "comment" } else { "comments" };

    html! {
        article class="post" data-post-id=(post.id) style=(delay) {
            img class="post-image" src=(post.image_url) alt="Post image"
                data-action="image" data-post-id=(post.id)
                onerror=(builtin::image_onerror(placeholder_image));
            div class="post-content" {
                div class="post-user" {
                    div class="user-avatar" { (post.initial()) }
                    div class="user-name" { (post.username) }
                }
                div class="post-description" { (post.description) }
                div class="post-actions" {
                    button type="button" class="action-btn like-btn" data-action="like" data-post-id=(post.id) {
                        span class="like-icon" { (like_glyph(post.like_count)) }
                        " "
                        span class="like-count" { (post.like_count) }
                    }
                    div class="comments-count" { "💬 " (comment_count) " " (comment_label) }
                    button type="button" class="action-btn share-btn" data-action="share" data-post-id=(post.id) {
                        "📤 Share"
                    }
                }
                @if !post.comments.is_empty() {
                    ul class="post-comments" {
                        @for comment in &post.comments {
                            li {
                                span class="comment-author" { (comment.username) }
                                (comment.text)
                            }
                        }
                    }
                }
            }
        }
    }
}

fn select_node(root: &NodeRef, selector: &str) -> anyhow::Result<NodeRef> {
    root.select_first(selector)
        .map(|n| n.as_node().clone())
        .map_err(|()| anyhow!("page shell has no {selector}"))
}

/// Parses a standalone fragment and detaches the first match of `selector`.
fn parse_element(markup: Markup, selector: &str) -> Option<NodeRef> {
    let doc = kuchiki::parse_html().one(markup.into_string());
    let node = doc.select_first(selector).ok()?.as_node().clone();
    node.detach();
    Some(node)
}

fn set_text(node: &NodeRef, text: &str) {
    for child in node.children().collect::<Vec<_>>() {
        child.detach();
    }
    node.append(NodeRef::new_text(text));
}

fn has_class(node: &NodeRef, class: &str) -> bool {
    node.as_element().is_some_and(|el| {
        el.attributes
            .borrow()
            .get("class")
            .is_some_and(|v| v.split_whitespace().any(|c| c == class))
    })
}

fn toggle_class(node: &NodeRef, class: &str, on: bool) {
    let Some(el) = node.as_element() else {
        return;
    };
    let mut attrs = el.attributes.borrow_mut();
    let mut classes: Vec<String> = attrs
        .get("class")
        .unwrap_or("")
        .split_whitespace()
        .filter(|c| *c != class)
        .map(str::to_string)
        .collect();
    if on {
        classes.push(class.to_string());
    }
    attrs.insert("class", classes.join(" "));
}

fn text_of(node: &NodeRef, selector: &str) -> String {
    node.select_first(selector)
        .map(|n| collapse_whitespace(&n.as_node().text_contents()))
        .unwrap_or_default()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
