use serde::{Deserialize, Serialize};

/// Signed-in user as reported by the identity provider.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Identity {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            photo_url: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Note {
    pub id: String,
    pub title: String,
    /// Raw editor markup.
    pub content: String,
    /// Milliseconds since the epoch of the last write.
    pub updated_at: i64,
}

/// Which of the three screens is showing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ViewState {
    Login,
    List,
    Editor(String),
}

/// Navigation target without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ViewKind {
    Login,
    List,
    Editor,
}

impl ViewState {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewState::Login => ViewKind::Login,
            ViewState::List => ViewKind::List,
            ViewState::Editor(_) => ViewKind::Editor,
        }
    }
}
