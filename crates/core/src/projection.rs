//! Read views over [`Activity`].
//!
//! An activity is shown in two places: the agenda (what is coming up) and the
//! news feed (what happened). Each gets its own type so that neither view
//! depends on fields it does not use.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::media::resolve_image_url;
use crate::models::Activity;
use crate::types::{ActivityId, ActivityStatus};

/// Maximum length of a post excerpt, in characters.
pub const EXCERPT_CHARS: usize = 160;

/// Agenda entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: ActivityId,
    pub title: String,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub status: ActivityStatus,
}

impl From<&Activity> for Event {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            title: activity.title.clone(),
            date: activity.date,
            location: activity.location.clone(),
            status: activity.status,
        }
    }
}

/// News feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: ActivityId,
    pub title: String,
    pub published_on: NaiveDate,
    pub excerpt: String,
    pub body: String,
    pub image_url: Option<String>,
}

impl Post {
    /// Project an activity, resolving its image against `public_base_url`.
    #[must_use]
    pub fn from_activity(activity: &Activity, public_base_url: Option<&str>) -> Self {
        let body = activity.description.clone().unwrap_or_default();
        Self {
            id: activity.id,
            title: activity.title.clone(),
            published_on: activity.date,
            excerpt: excerpt(&body, EXCERPT_CHARS),
            body,
            image_url: activity
                .image
                .as_deref()
                .map(|image| resolve_image_url(public_base_url, image)),
        }
    }
}

/// Collapse whitespace and cut `text` to at most `max_chars` characters,
/// breaking at a word boundary and appending `...` when shortened.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let cut: String = collapsed.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) if idx > 0 => cut.get(..idx).unwrap_or(&cut),
        _ => cut.as_str(),
    };
    format!("{}...", trimmed.trim_end_matches([',', '.', ';', ':']))
}

/// Agenda: activities still planned or in progress, soonest first.
#[must_use]
pub fn agenda(activities: &[Activity]) -> Vec<Event> {
    let mut upcoming: Vec<&Activity> = activities
        .iter()
        .filter(|a| a.status.is_upcoming())
        .collect();
    upcoming.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    upcoming.into_iter().map(Event::from).collect()
}

/// News feed: every activity as a post, newest first.
#[must_use]
pub fn news(activities: &[Activity], public_base_url: Option<&str>) -> Vec<Post> {
    let mut sorted: Vec<&Activity> = activities.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    sorted
        .into_iter()
        .map(|a| Post::from_activity(a, public_base_url))
        .collect()
}
