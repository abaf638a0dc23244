use std::cell::{Cell, Ref, RefCell};
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::client::FeedClient;
use crate::event::{FormField, UiEvent};
use crate::post::{NewPost, Post, PostId};
use crate::render::FeedView;
use crate::store::PostStore;

pub const LOAD_ERROR_MESSAGE: &str = "Could not load posts. Is the backend running?";
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in every field before publishing.";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Loaded(usize),
    Failed,
    /// A reload was already in flight.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Updated { likes: u64 },
    UnknownPost,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(PostId),
    Invalid(&'static str),
    Failed,
}

/// Application state for one session, driven by UI events.
///
/// Every method takes `&self`; state lives in `Cell`/`RefCell` and no borrow
/// is held across an `.await`, so several operations may be polled at once on
/// the same thread. Only the feed reload is single-flight.
pub struct Controller {
    client: FeedClient,
    store: RefCell<PostStore>,
    view: RefCell<FeedView>,
    draft: RefCell<NewPost>,
    form_open: Cell<bool>,
    loading: Cell<bool>,
}

/// Clears the loading flag even when the reload future is dropped mid-flight.
struct InFlight<'a> {
    controller: &'a Controller,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.controller.loading.set(false);
        if let Ok(mut view) = self.controller.view.try_borrow_mut() {
            view.set_refreshing(false);
        }
    }
}

impl Controller {
    pub fn new(client: FeedClient, view: FeedView) -> Self {
        Self {
            client,
            store: RefCell::new(PostStore::new()),
            view: RefCell::new(view),
            draft: RefCell::new(NewPost::default()),
            form_open: Cell::new(false),
            loading: Cell::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open.get()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.store.borrow().posts().to_vec()
    }

    pub fn draft(&self) -> NewPost {
        self.draft.borrow().clone()
    }

    pub fn view(&self) -> Ref<'_, FeedView> {
        self.view.borrow()
    }

    pub fn take_alerts(&self) -> Vec<String> {
        self.view.borrow_mut().take_alerts()
    }

    pub async fn dispatch(&self, event: UiEvent) {
        tracing::debug!(?event, "dispatch");
        match event {
            UiEvent::Refresh => {
                self.refresh().await;
            }
            UiEvent::AutoRefresh => {
                self.auto_refresh().await;
            }
            UiEvent::OpenForm => self.open_form(),
            UiEvent::CancelForm => self.cancel_form(),
            UiEvent::SetField(field, value) => self.set_field(field, value),
            UiEvent::SubmitForm => {
                self.submit_post().await;
            }
            UiEvent::Like(id) => {
                self.toggle_like(id).await;
            }
            UiEvent::Share(id) => self.share(id),
            UiEvent::ImageFailed(id) => self.image_failed(id),
        }
    }

    /// Reloads the feed unless a reload is already running.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self.loading.get() {
            tracing::debug!("reload already in flight; ignoring");
            return RefreshOutcome::Skipped;
        }
        self.loading.set(true);
        let _in_flight = InFlight { controller: self };

        self.view.borrow_mut().render_loading();

        match self.client.list_posts().await {
            Ok(posts) => {
                let mut store = self.store.borrow_mut();
                store.replace_all(posts);
                self.view.borrow_mut().render_all(store.posts());
                tracing::info!(count = store.len(), "feed loaded");
                RefreshOutcome::Loaded(store.len())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load feed");
                self.view.borrow_mut().render_error(LOAD_ERROR_MESSAGE);
                RefreshOutcome::Failed
            }
        }
    }

    pub async fn auto_refresh(&self) -> RefreshOutcome {
        if self.loading.get() {
            tracing::debug!("auto-refresh skipped; reload in flight");
            return RefreshOutcome::Skipped;
        }
        self.refresh().await
    }

    /// Auto-refreshes every `period` until `on_refresh` breaks. The first tick
    /// is skipped since the initial load already ran.
    pub async fn run_auto_refresh<F, B>(&self, period: Duration, mut on_refresh: F) -> B
    where
        F: FnMut(RefreshOutcome) -> ControlFlow<B>,
    {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let outcome = self.auto_refresh().await;
            if let ControlFlow::Break(value) = on_refresh(outcome) {
                return value;
            }
        }
    }

    /// Flips the like state of `post_id`: adds a like when the local count is
    /// zero, removes it otherwise. Local state changes only after the server
    /// confirms.
    pub async fn toggle_like(&self, post_id: PostId) -> LikeOutcome {
        let current = match self.store.borrow().find_by_id(post_id) {
            Some(post) => post.like_count,
            None => {
                tracing::debug!(post_id, "like on unknown post");
                return LikeOutcome::UnknownPost;
            }
        };
        let desired = current == 0;

        match self.client.set_like(post_id, desired).await {
            Ok(likes) => {
                if !self.store.borrow_mut().set_like_count(post_id, likes) {
                    tracing::debug!(post_id, "post left the feed before like confirmed");
                }
                self.view.borrow_mut().render_like_control(post_id, likes);
                LikeOutcome::Updated { likes }
            }
            Err(err) => {
                tracing::warn!(post_id, desired, error = %err, "failed to update like");
                LikeOutcome::Failed
            }
        }
    }

    pub fn open_form(&self) {
        self.form_open.set(true);
        self.view.borrow_mut().set_form_open(true);
    }

    /// Closes the form and discards the draft.
    pub fn cancel_form(&self) {
        self.close_form();
    }

    pub fn set_field(&self, field: FormField, value: String) {
        let mut draft = self.draft.borrow_mut();
        match field {
            FormField::Username => draft.username = value,
            FormField::Image => draft.image_url = value,
            FormField::Description => draft.description = value,
        }
        self.view.borrow_mut().set_form_values(&draft);
    }

    pub async fn submit_post(&self) -> SubmitOutcome {
        let draft = self.draft.borrow().clone();
        if let Some(field) = draft.missing_field() {
            tracing::debug!(field, "rejected new post with empty field");
            self.view.borrow_mut().alert(MISSING_FIELDS_MESSAGE);
            return SubmitOutcome::Invalid(field);
        }

        match self.client.create_post(&draft).await {
            Ok(post) => {
                let id = post.id;
                let mut store = self.store.borrow_mut();
                store.prepend(post);
                self.view.borrow_mut().render_all(store.posts());
                drop(store);
                self.close_form();
                tracing::info!(post_id = id, "post published");
                SubmitOutcome::Created(id)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to publish post");
                self.view
                    .borrow_mut()
                    .alert(format!("Could not publish the post: {err}"));
                SubmitOutcome::Failed
            }
        }
    }

    pub fn share(&self, post_id: PostId) {
        let username = self
            .store
            .borrow()
            .find_by_id(post_id)
            .map(|p| p.username.clone());
        match username {
            Some(username) => self
                .view
                .borrow_mut()
                .alert(format!("Sharing post by {username}!")),
            None => tracing::debug!(post_id, "share on unknown post"),
        }
    }

    pub fn image_failed(&self, post_id: PostId) {
        if !self.view.borrow_mut().fallback_image(post_id) {
            tracing::debug!(post_id, "image failure for unrendered post");
        }
    }

    fn close_form(&self) {
        self.form_open.set(false);
        let mut draft = self.draft.borrow_mut();
        *draft = NewPost::default();
        let mut view = self.view.borrow_mut();
        view.set_form_values(&draft);
        view.set_form_open(false);
    }
}
