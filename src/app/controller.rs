//! Glue between the pure state machines and the outside world.
//!
//! `AppController` owns the session gate, router, editor and save queue,
//! executes the load requests the router emits, and mirrors results into
//! [`AppState`]. RefCell borrows are never held across an `.await`.

use std::cell::RefCell;

use leptos::prelude::*;
use thiserror::Error;

use crate::editor::{EditorController, SaveQueue, SaveRequest};
use crate::identity::{AuthError, IdentityProvider};
use crate::list::{remove_entry, render_entries};
use crate::location::{History, LocationCodec};
use crate::models::{Identity, ViewKind, ViewState};
use crate::repository::{NoteRepository, RepositoryError};
use crate::router::{Load, LoadRequest, RouteError, Transition, ViewRouter};
use crate::session::{SessionEvent, SessionGate, SessionStatus};
use crate::state::AppState;
use crate::store::DocumentStore;

pub(crate) const NOT_FOUND_MESSAGE: &str = "Note not found, returning to list";
pub(crate) const DELETED_MESSAGE: &str = "Note deleted";
pub(crate) const AUTOSAVE_FAILED_MESSAGE: &str = "Auto-save failed";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Route(#[from] RouteError),
}

pub(crate) struct AppController<I, S, H> {
    state: AppState,
    identity: I,
    store: S,
    session: RefCell<SessionGate>,
    router: RefCell<ViewRouter<H>>,
    editor: RefCell<EditorController>,
    saves: RefCell<SaveQueue>,
}

impl<I, S, H> AppController<I, S, H>
where
    I: IdentityProvider,
    S: DocumentStore,
    H: History,
{
    pub fn new(state: AppState, identity: I, store: S, codec: LocationCodec, history: H) -> Self {
        Self {
            state,
            identity,
            store,
            session: RefCell::new(SessionGate::default()),
            router: RefCell::new(ViewRouter::new(codec, history)),
            editor: RefCell::new(EditorController::default()),
            saves: RefCell::new(SaveQueue::default()),
        }
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    fn owner(&self) -> Option<Identity> {
        self.session.borrow().identity().cloned()
    }

    /// Identity provider notification.
    pub async fn on_identity(&self, identity: Option<Identity>) {
        let event = self.session.borrow_mut().observe(identity);
        let status = self.session.borrow().status();
        self.state.session_ready.set(status != SessionStatus::Pending);
        self.state.identity.set(self.owner());
        let Some(event) = event else {
            return;
        };
        match &event {
            SessionEvent::Authenticated(who) => tracing::info!(uid = %who.uid, "session started"),
            SessionEvent::Unauthenticated => tracing::info!("session ended"),
        }
        let transition = self.router.borrow_mut().on_session(&event);
        self.apply(transition).await;
    }

    pub async fn navigate_to(&self, target: ViewKind, note_id: Option<&str>) -> Result<(), AppError> {
        let transition = self.router.borrow_mut().navigate_to(target, note_id)?;
        self.apply(transition).await;
        Ok(())
    }

    /// Back/forward or initial deep link.
    pub async fn on_location_changed(&self) {
        let transition = self.router.borrow_mut().on_location_changed();
        self.apply(transition).await;
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AppError> {
        self.identity.sign_in(email, password).await?;
        Ok(())
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), AppError> {
        self.identity.sign_up(email, password).await?;
        Ok(())
    }

    /// Federated sign-in; from the list view this switches accounts.
    pub async fn sign_in_interactive(&self) -> Result<(), AppError> {
        self.identity.sign_in_interactive().await?;
        Ok(())
    }

    /// Create an empty note and open it.
    pub async fn create_note(&self) {
        let owner = self.owner();
        let created = NoteRepository::new(&self.store, owner.as_ref()).create().await;
        match created {
            Ok(note) => {
                tracing::debug!(id = %note.id, "note created");
                if let Err(e) = self.navigate_to(ViewKind::Editor, Some(&note.id)).await {
                    tracing::warn!(error = %e, "opening new note failed");
                }
            }
            Err(e) => self.on_repository_error(e).await,
        }
    }

    pub async fn delete_note(&self, id: &str) {
        let owner = self.owner();
        let deleted = NoteRepository::new(&self.store, owner.as_ref()).delete(id).await;
        match deleted {
            Ok(()) => {
                self.state.entries.update(|entries| {
                    remove_entry(entries, id);
                });
                self.state.show_toast(DELETED_MESSAGE);
            }
            Err(e) => self.on_repository_error(e).await,
        }
    }

    /// Title or content changed in the editor. `text` is the surface's
    /// rendered text, used for the title fallback.
    pub async fn save_editor(&self, title_field: &str, content: &str, text: &str) {
        let Some(owner) = self.owner() else {
            return;
        };
        let request = self
            .editor
            .borrow()
            .save_request(&owner.uid, title_field, content, text);
        let Some(request) = request else {
            return;
        };
        let queued = self.saves.borrow_mut().enqueue(request);
        let Some(mut next) = queued else {
            return;
        };
        loop {
            self.write(&next).await;
            let following = self.saves.borrow_mut().complete();
            match following {
                Some(request) => next = request,
                None => break,
            }
        }
    }

    async fn write(&self, request: &SaveRequest) {
        let owner = self.owner();
        if owner.as_ref().map(|o| o.uid.as_str()) != Some(request.uid.as_str()) {
            tracing::debug!(id = %request.note_id, "dropping save queued by a previous account");
            return;
        }
        let saved = NoteRepository::new(&self.store, owner.as_ref())
            .save(&request.note_id, &request.title, &request.content)
            .await;
        match saved {
            Ok(updated_at) => {
                tracing::debug!(id = %request.note_id, updated_at, "note saved");
            }
            Err(e) => {
                tracing::warn!(id = %request.note_id, error = %e, "auto-save failed");
                self.state.show_toast(AUTOSAVE_FAILED_MESSAGE);
            }
        }
    }

    async fn apply(&self, transition: Transition) {
        let Transition { view, load } = transition;
        // Nothing is editable until the requested note arrives.
        self.editor.borrow_mut().close();
        match &view {
            ViewState::List => self.state.entries.set(vec![]),
            ViewState::Editor(_) => self.state.clear_editor(),
            ViewState::Login => {}
        }
        self.state.view.set(view);
        if let Some(request) = load {
            self.load(request).await;
        }
    }

    async fn load(&self, request: LoadRequest) {
        let owner = self.owner();
        let repo = NoteRepository::new(&self.store, owner.as_ref());
        match request.load {
            Load::List => {
                let listed = repo.list().await;
                if !self.is_current(request.generation) {
                    tracing::debug!(generation = request.generation, "discarding stale list");
                    return;
                }
                match listed {
                    Ok(notes) => self.state.entries.set(render_entries(&notes)),
                    Err(e) => self.on_repository_error(e).await,
                }
            }
            Load::Note(id) => {
                let fetched = repo.get(&id).await;
                if !self.is_current(request.generation) {
                    tracing::debug!(%id, generation = request.generation, "discarding stale note");
                    return;
                }
                match fetched {
                    Ok(note) => {
                        self.editor.borrow_mut().open(&note);
                        self.state.editor_title.set(note.title);
                        self.state.editor_content.set(note.content);
                        self.state.editor_revision.update(|r| *r += 1);
                    }
                    Err(e) => self.on_repository_error(e).await,
                }
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.router.borrow().is_current(generation)
    }

    async fn on_repository_error(&self, error: RepositoryError) {
        match error {
            RepositoryError::NotFound(id) => {
                tracing::debug!(%id, "note missing; back to list");
                self.state.show_toast(NOT_FOUND_MESSAGE);
                let transition = self.router.borrow_mut().redirect(ViewState::List);
                Box::pin(self.apply(transition)).await;
            }
            RepositoryError::NoIdentity => {
                Box::pin(self.on_identity(None)).await;
            }
            RepositoryError::Store(e) => {
                tracing::warn!(error = %e, "store request failed");
                self.state.show_toast(e.to_string());
            }
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::identity::MemoryIdentity;
    use crate::list::UNTITLED;
    use crate::location::MemoryHistory;
    use crate::store::{CollectionPath, MemoryStore};
    use serde_json::json;

    type TestController = AppController<MemoryIdentity, MemoryStore, MemoryHistory>;

    fn controller(start: &str) -> TestController {
        AppController::new(
            AppState::new(),
            MemoryIdentity::default().with_account("a@b.c", "secret", "u1"),
            MemoryStore::default(),
            LocationCodec::Hash,
            MemoryHistory::starting_at(start),
        )
    }

    async fn signed_in(start: &str) -> TestController {
        let c = controller(start);
        c.on_identity(Some(Identity::new("u1"))).await;
        c
    }

    fn url(c: &TestController) -> String {
        c.router.borrow().history().current_url().to_string()
    }

    fn seed(c: &TestController, id: &str, title: &str, content: &str, updated: i64) {
        let path = CollectionPath::root("users")
            .doc("u1")
            .collection("memos")
            .doc(id);
        let mut fields = crate::store::Fields::new();
        fields.insert("title".into(), json!(title));
        fields.insert("content".into(), json!(content));
        fields.insert("updated".into(), json!(updated));
        c.store.insert(&path, fields);
    }

    fn stored_title(c: &TestController, id: &str) -> String {
        let path = CollectionPath::root("users")
            .doc("u1")
            .collection("memos")
            .doc(id);
        c.store.fields(&path).unwrap()["title"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn deep_link_while_signed_out_resumes_after_sign_in() {
        let c = controller("#/editor/abc123");
        seed(&c, "abc123", "Kept", "<div>body</div>", 1);

        c.on_identity(None).await;
        assert_eq!(c.state.view.get_untracked(), ViewState::Login);
        assert!(c.editor.borrow().active().is_none());
        assert_eq!(c.state.editor_title.get_untracked(), "");

        c.sign_in("a@b.c", "secret").await.unwrap();
        // The provider reports through observe; forward it like the app shell does.
        c.on_identity(Some(Identity::new("u1"))).await;

        assert_eq!(c.state.view.get_untracked(), ViewState::Editor("abc123".into()));
        assert_eq!(url(&c), "#/editor/abc123");
        assert_eq!(c.state.editor_title.get_untracked(), "Kept");
        assert_eq!(c.editor.borrow().active(), Some("abc123"));
    }

    #[tokio::test]
    async fn failed_sign_in_surfaces_provider_code() {
        let c = controller("#/");
        c.on_identity(None).await;
        let err = c.sign_in("a@b.c", "nope").await.unwrap_err();
        assert_eq!(err, AppError::Auth(AuthError::new("auth/wrong-password")));
        assert_eq!(c.state.view.get_untracked(), ViewState::Login);
    }

    #[tokio::test]
    async fn list_renders_newest_first_with_placeholder() {
        let c = controller("#/list");
        seed(&c, "a", "Older", "", 100);
        seed(&c, "b", "", "", 200);
        c.on_identity(Some(Identity::new("u1"))).await;

        let entries = c.state.entries.get_untracked();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "b");
        assert_eq!(entries[0].title, UNTITLED);
        assert_eq!(entries[1].title, "Older");
    }

    #[tokio::test]
    async fn login_location_redirects_to_list_once_signed_in() {
        let c = signed_in("#/").await;
        assert_eq!(c.state.view.get_untracked(), ViewState::List);
        assert_eq!(url(&c), "#/list");
    }

    #[tokio::test]
    async fn delete_removes_entry_without_reload_and_toasts() {
        let c = controller("#/list");
        seed(&c, "x", "X", "", 1);
        seed(&c, "y", "Y", "", 2);
        c.on_identity(Some(Identity::new("u1"))).await;

        c.delete_note("x").await;

        let ids: Vec<String> = c.state.entries.get_untracked().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["y"]);
        assert_eq!(
            c.state.toast.get_untracked().map(|t| t.message).as_deref(),
            Some(DELETED_MESSAGE)
        );
        let owner = Identity::new("u1");
        let listed = NoteRepository::new(&c.store, Some(&owner)).list().await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn create_note_opens_editor_on_new_note() {
        let c = signed_in("#/list").await;
        c.create_note().await;

        let view = c.state.view.get_untracked();
        let ViewState::Editor(id) = view else {
            panic!("expected editor, got {view:?}");
        };
        assert_eq!(url(&c), format!("#/editor/{id}"));
        assert_eq!(c.editor.borrow().active(), Some(id.as_str()));
        assert_eq!(c.state.editor_title.get_untracked(), "");
    }

    #[tokio::test]
    async fn empty_title_falls_back_to_first_line() {
        let c = controller("#/editor/n1");
        seed(&c, "n1", "", "", 1);
        c.on_identity(Some(Identity::new("u1"))).await;

        c.save_editor("", "Hello world<div>more</div>", "Hello world\nmore")
            .await;
        assert_eq!(stored_title(&c, "n1"), "Hello world");
    }

    #[tokio::test]
    async fn sequential_edits_end_with_latest_title() {
        let c = controller("#/editor/n1");
        seed(&c, "n1", "", "", 1);
        c.on_identity(Some(Identity::new("u1"))).await;

        c.save_editor("A", "", "").await;
        c.save_editor("AB", "", "").await;
        assert_eq!(stored_title(&c, "n1"), "AB");
    }

    #[tokio::test]
    async fn saves_are_ignored_outside_an_open_note() {
        let c = signed_in("#/list").await;
        c.save_editor("Title", "Body", "Body").await;
        assert!(c.store.writes().is_empty());
    }

    #[tokio::test]
    async fn missing_note_redirects_to_list_with_toast() {
        let c = signed_in("#/list").await;
        c.navigate_to(ViewKind::Editor, Some("gone")).await.unwrap();

        assert_eq!(c.state.view.get_untracked(), ViewState::List);
        assert_eq!(url(&c), "#/list");
        assert_eq!(
            c.state.toast.get_untracked().map(|t| t.message).as_deref(),
            Some(NOT_FOUND_MESSAGE)
        );
        assert!(c.editor.borrow().active().is_none());
    }

    #[tokio::test]
    async fn editor_without_id_is_rejected() {
        let c = signed_in("#/list").await;
        assert_eq!(
            c.navigate_to(ViewKind::Editor, None).await,
            Err(AppError::Route(RouteError::MissingNoteId))
        );
        assert_eq!(c.state.view.get_untracked(), ViewState::List);
    }

    #[tokio::test]
    async fn autosave_failure_is_toasted_not_fatal() {
        let c = controller("#/editor/n1");
        seed(&c, "n1", "T", "", 1);
        c.on_identity(Some(Identity::new("u1"))).await;

        c.store.fail_writes(true);
        c.save_editor("T2", "", "").await;
        assert_eq!(
            c.state.toast.get_untracked().map(|t| t.message).as_deref(),
            Some(AUTOSAVE_FAILED_MESSAGE)
        );
        assert_eq!(stored_title(&c, "n1"), "T");

        c.store.fail_writes(false);
        c.save_editor("T3", "", "").await;
        assert_eq!(stored_title(&c, "n1"), "T3");
    }

    #[tokio::test]
    async fn back_navigation_reloads_previous_view() {
        let c = controller("#/list");
        seed(&c, "n1", "One", "", 1);
        c.on_identity(Some(Identity::new("u1"))).await;
        c.navigate_to(ViewKind::Editor, Some("n1")).await.unwrap();
        assert_eq!(c.state.view.get_untracked(), ViewState::Editor("n1".into()));

        assert!(c.router.borrow_mut().history_mut().back());
        c.on_location_changed().await;
        assert_eq!(c.state.view.get_untracked(), ViewState::List);
        assert_eq!(c.state.entries.get_untracked().len(), 1);
        assert!(c.editor.borrow().active().is_none());
    }

    #[tokio::test]
    async fn sign_out_forces_login_and_clears_editor() {
        let c = controller("#/editor/n1");
        seed(&c, "n1", "One", "", 1);
        c.on_identity(Some(Identity::new("u1"))).await;
        assert!(c.editor.borrow().active().is_some());

        c.on_identity(None).await;
        assert_eq!(c.state.view.get_untracked(), ViewState::Login);
        assert!(c.editor.borrow().active().is_none());
        assert!(c.state.identity.get_untracked().is_none());
        assert_eq!(url(&c), "#/");
    }

    #[tokio::test]
    async fn interactive_sign_in_switches_accounts() {
        let c = signed_in("#/list").await;
        c.identity
            .script_interactive(Ok(Identity::new("u2")));
        c.sign_in_interactive().await.unwrap();
        c.on_identity(Some(Identity::new("u2"))).await;
        assert_eq!(
            c.state.identity.get_untracked().map(|i| i.uid).as_deref(),
            Some("u2")
        );
        assert!(c.state.entries.get_untracked().is_empty());
    }

    fn written_titles(c: &TestController) -> Vec<String> {
        c.store
            .writes()
            .iter()
            .map(|(_, fields)| fields["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn slow_note_load_is_discarded_once_another_note_opens() {
        let c = controller("#/list");
        seed(&c, "slow", "Slow", "", 1);
        seed(&c, "fast", "Fast", "", 2);
        c.on_identity(Some(Identity::new("u1"))).await;
        c.store.slow_read("slow");

        let (first, second) = tokio::join!(
            c.navigate_to(ViewKind::Editor, Some("slow")),
            c.navigate_to(ViewKind::Editor, Some("fast")),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(c.state.view.get_untracked(), ViewState::Editor("fast".into()));
        assert_eq!(c.state.editor_title.get_untracked(), "Fast");
        assert_eq!(c.editor.borrow().active(), Some("fast"));
        assert_eq!(url(&c), "#/editor/fast");
    }

    #[tokio::test]
    async fn overlapping_saves_send_first_and_latest_only() {
        let c = controller("#/editor/n1");
        seed(&c, "n1", "", "", 1);
        c.on_identity(Some(Identity::new("u1"))).await;
        c.store.slow_writes(true);

        tokio::join!(
            c.save_editor("A", "", ""),
            c.save_editor("AB", "", ""),
            c.save_editor("ABC", "", ""),
        );

        assert_eq!(written_titles(&c), ["A", "ABC"]);
        assert_eq!(stored_title(&c, "n1"), "ABC");
    }

    #[tokio::test]
    async fn queued_save_is_dropped_after_account_switch() {
        let c = controller("#/editor/n1");
        seed(&c, "n1", "T", "", 1);
        c.on_identity(Some(Identity::new("u1"))).await;
        c.store.slow_writes(true);

        tokio::join!(c.save_editor("A", "", ""), async {
            c.save_editor("AB", "", "").await;
            c.on_identity(Some(Identity::new("u2"))).await;
        });

        assert_eq!(written_titles(&c), ["A"]);
        assert_eq!(stored_title(&c, "n1"), "A");
        let foreign = CollectionPath::root("users")
            .doc("u2")
            .collection("memos")
            .doc("n1");
        assert!(c.store.fields(&foreign).is_none());
    }

    #[tokio::test]
    async fn session_is_not_ready_until_the_provider_reports() {
        let c = controller("#/list");
        assert!(!c.state.session_ready.get_untracked());
        c.on_identity(None).await;
        assert!(c.state.session_ready.get_untracked());
    }
}
