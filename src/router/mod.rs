//! View state machine.
//!
//! The router owns the session history and decides which view is visible.
//! It never talks to the store itself: activating the list or an editor
//! yields a [`LoadRequest`] stamped with a generation, and the caller applies
//! the response only while [`ViewRouter::is_current`] still holds for it.

use thiserror::Error;

use crate::location::{History, LocationCodec};
use crate::models::{ViewKind, ViewState};
use crate::session::{SessionEvent, SessionStatus};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum RouteError {
    #[error("the editor view requires a note id")]
    MissingNoteId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Load {
    List,
    Note(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LoadRequest {
    pub generation: u64,
    pub load: Load,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Transition {
    pub view: ViewState,
    pub load: Option<LoadRequest>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Write {
    Push,
    Replace,
    Keep,
}

pub(crate) struct ViewRouter<H> {
    codec: LocationCodec,
    history: H,
    view: ViewState,
    status: SessionStatus,
    /// Location requested while signed out, entered after the next sign-in.
    resume: Option<ViewState>,
    generation: u64,
}

impl<H: History> ViewRouter<H> {
    pub fn new(codec: LocationCodec, history: H) -> Self {
        Self {
            codec,
            history,
            view: ViewState::Login,
            status: SessionStatus::Pending,
            resume: None,
            generation: 0,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn navigate_to(
        &mut self,
        target: ViewKind,
        note_id: Option<&str>,
    ) -> Result<Transition, RouteError> {
        let requested = match target {
            ViewKind::Login => ViewState::Login,
            ViewKind::List => ViewState::List,
            ViewKind::Editor => match note_id {
                Some(id) if !id.is_empty() => ViewState::Editor(id.to_string()),
                _ => return Err(RouteError::MissingNoteId),
            },
        };
        Ok(self.activate(requested, Write::Push))
    }

    /// Back/forward or a fresh page load: the location already changed.
    pub fn on_location_changed(&mut self) -> Transition {
        let requested = self.codec.parse(&self.history.location());
        self.activate(requested, Write::Keep)
    }

    /// Move to `state` without adding a history entry.
    pub fn redirect(&mut self, state: ViewState) -> Transition {
        self.activate(state, Write::Replace)
    }

    pub fn on_session(&mut self, event: &SessionEvent) -> Transition {
        match event {
            SessionEvent::Authenticated(_) => {
                self.status = SessionStatus::SignedIn;
                match self.resume.take() {
                    Some(state) => self.activate(state, Write::Replace),
                    None => {
                        let current = self.codec.parse(&self.history.location());
                        self.activate(current, Write::Keep)
                    }
                }
            }
            SessionEvent::Unauthenticated => {
                self.status = SessionStatus::SignedOut;
                let current = self.codec.parse(&self.history.location());
                tracing::debug!(?current, "signed out; gating location");
                self.activate(current, Write::Keep)
            }
        }
    }

    fn activate(&mut self, requested: ViewState, write: Write) -> Transition {
        // Any load still in flight belongs to the view being left.
        self.generation += 1;

        match self.status {
            SessionStatus::SignedIn => {}
            SessionStatus::Pending => {
                // Identity unknown yet; leave the location alone so a restored
                // session can still enter it.
                if write == Write::Push {
                    self.write(&requested, write);
                }
                return self.show(ViewState::Login, None);
            }
            SessionStatus::SignedOut => {
                if requested != ViewState::Login {
                    self.resume = Some(requested);
                }
                let login = ViewState::Login;
                if self.codec.parse(&self.history.location()) != login {
                    self.write(&login, Write::Replace);
                }
                return self.show(login, None);
            }
        }

        let (state, write) = match requested {
            ViewState::Login => (ViewState::List, Write::Replace),
            other => (other, write),
        };
        self.write(&state, write);

        let load = match &state {
            ViewState::Login => None,
            ViewState::List => Some(Load::List),
            ViewState::Editor(id) => Some(Load::Note(id.clone())),
        };
        let load = load.map(|load| LoadRequest {
            generation: self.generation,
            load,
        });
        self.show(state, load)
    }

    fn write(&mut self, state: &ViewState, write: Write) {
        let url = self.codec.serialize(state);
        match write {
            Write::Push => self.history.push(&url),
            Write::Replace => self.history.replace(&url),
            Write::Keep => {}
        }
    }

    fn show(&mut self, view: ViewState, load: Option<LoadRequest>) -> Transition {
        tracing::debug!(?view, generation = self.generation, "view activated");
        self.view = view.clone();
        Transition { view, load }
    }
}
