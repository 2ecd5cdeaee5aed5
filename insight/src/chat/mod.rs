use serde::{Deserialize, Serialize};

use crate::store::Article;

pub mod websocket;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Per-connection conversation state: the currently selected article and
/// the ordered transcript bound to it. Created when a client connects,
/// discarded on disconnect; never persisted.
///
/// Two states: no article selected (initial) and article active. Selecting
/// an article always resets the transcript; there is no way back to the
/// unselected state.
#[derive(Debug, Default)]
pub struct ChatSession {
    active: Option<Article>,
    turns: Vec<Turn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active article and clear the transcript.
    pub fn select_article(&mut self, article: Article) {
        self.active = Some(article);
        self.turns.clear();
    }

    /// Append a turn to the transcript. Append-only, no size cap.
    pub fn append_turn(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
        });
    }

    pub fn active(&self) -> Option<&Article> {
        self.active.as_ref()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }
}
