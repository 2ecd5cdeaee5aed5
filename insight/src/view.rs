use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chat::{ChatSession, Turn};
use crate::datefmt;
use crate::store::Article;

/// Full view description for the two-pane dashboard, recomputed from
/// scratch on every user interaction. Serialized as-is for the frontend.
#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub feed: FeedView,
    pub chat: ChatPane,
}

/// The scrollable article feed: visible articles grouped under date
/// headers, plus an optional empty-state notice.
#[derive(Debug, Serialize)]
pub struct FeedView {
    pub sections: Vec<FeedSection>,
    pub notice: Option<String>,
}

/// One contiguous run of same-label articles under a single date header.
#[derive(Debug, Serialize)]
pub struct FeedSection {
    pub label: String,
    pub cards: Vec<ArticleCard>,
}

#[derive(Debug, Serialize)]
pub struct ArticleCard {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub is_favorite: bool,
    pub is_active: bool,
}

/// The sticky chat pane bound to the conversation session. Input is
/// disabled until an article is selected.
#[derive(Debug, Serialize)]
pub struct ChatPane {
    pub topic: Option<String>,
    pub turns: Vec<Turn>,
    pub input_enabled: bool,
}

/// Render the feed pane from a fresh store snapshot.
///
/// Hidden articles are excluded here, never by the store. The input list is
/// expected newest-first; a new section header is emitted whenever the date
/// label changes from the previous visible article, so each contiguous run
/// of same-label articles shares one header.
pub fn render_feed(articles: &[Article], active_id: Option<i64>, now: DateTime<Utc>) -> FeedView {
    let mut sections: Vec<FeedSection> = Vec::new();

    for article in articles.iter().filter(|a| !a.is_hidden) {
        let label = datefmt::friendly_date(&article.created_at, now);
        let card = ArticleCard {
            id: article.id,
            title: article.title.clone(),
            summary: clean_summary(&article.summary),
            url: article.url.clone(),
            is_favorite: article.is_favorite,
            is_active: active_id == Some(article.id),
        };

        match sections.last_mut() {
            Some(section) if section.label == label => section.cards.push(card),
            _ => sections.push(FeedSection {
                label,
                cards: vec![card],
            }),
        }
    }

    let notice = if sections.is_empty() {
        Some("No news yet.".to_string())
    } else {
        None
    };

    FeedView { sections, notice }
}

/// Feed rendered when the store cannot be reached: empty, with the failure
/// surfaced as a notice instead of an error page.
pub fn render_unavailable_feed(message: &str) -> FeedView {
    FeedView {
        sections: Vec::new(),
        notice: Some(message.to_string()),
    }
}

/// Render the chat pane from the conversation session.
pub fn render_chat_pane(session: &ChatSession) -> ChatPane {
    ChatPane {
        topic: session.active().map(|a| a.title.clone()),
        turns: session.turns().to_vec(),
        input_enabled: session.active().is_some(),
    }
}

/// Compose the whole dashboard from (store snapshot, session state).
///
/// Production splits the two panes across transports (the feed over HTTP,
/// the chat pane over the socket), so nothing in the server calls this
/// directly; it is the single-seam composition for callers that hold both
/// inputs at once, such as a future server-rendered page.
pub fn render_dashboard(
    articles: &[Article],
    session: &ChatSession,
    now: DateTime<Utc>,
) -> DashboardView {
    DashboardView {
        feed: render_feed(articles, session.active().map(|a| a.id), now),
        chat: render_chat_pane(session),
    }
}

/// Strip stray markdown emphasis/heading markers from a stored summary
/// while keeping its simple HTML markup intact.
fn clean_summary(raw: &str) -> String {
    raw.replace("**", "").replace("##", "")
}
