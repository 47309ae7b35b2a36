//! Content channels and the brief a user fills in for them.
//!
//! Brief values arrive from a browser form, so the deserializers here are
//! forgiving: numbers may come as strings, tones as a list or as one
//! `"a + b"` string, and empty strings mean "not given".

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Maximum number of topic characters that go into a generated title.
const TITLE_TOPIC_CHARS: usize = 60;

/// A content channel the user can generate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "yt_script")]
    YtScript,
    #[serde(rename = "insta_post")]
    InstaPost,
    #[serde(rename = "insta_reel")]
    InstaReel,
    #[serde(rename = "linkedin")]
    LinkedIn,
    #[serde(rename = "x_post")]
    XPost,
    #[serde(rename = "blog")]
    Blog,
    #[serde(rename = "reddit")]
    Reddit,
}

impl Channel {
    /// Every channel, in display order.
    pub const ALL: [Channel; 7] = [
        Channel::YtScript,
        Channel::InstaPost,
        Channel::InstaReel,
        Channel::LinkedIn,
        Channel::XPost,
        Channel::Blog,
        Channel::Reddit,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Channel::YtScript => "yt_script",
            Channel::InstaPost => "insta_post",
            Channel::InstaReel => "insta_reel",
            Channel::LinkedIn => "linkedin",
            Channel::XPost => "x_post",
            Channel::Blog => "blog",
            Channel::Reddit => "reddit",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::YtScript => "YouTube Script",
            Channel::InstaPost => "Instagram Post",
            Channel::InstaReel => "Instagram Reel",
            Channel::LinkedIn => "LinkedIn Post",
            Channel::XPost => "X (Twitter) Thread",
            Channel::Blog => "Blog Article",
            Channel::Reddit => "Reddit Post",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Channel::YtScript => "3–5 min script with hook & chapters",
            Channel::InstaPost => "caption + hashtags",
            Channel::InstaReel => "30–60s hook-first reel",
            Channel::LinkedIn => "value-led post",
            Channel::XPost => "concise thread",
            Channel::Blog => "outline + draft",
            Channel::Reddit => "story-first",
        }
    }

    /// Chat title for a generation on this channel.
    pub fn build_title(self, values: &ChannelValues) -> String {
        match self {
            Channel::YtScript => {
                let niche = values.niche.as_deref().unwrap_or("Niche");
                match values.topic.as_deref() {
                    Some(topic) => {
                        let short: String = topic.chars().take(TITLE_TOPIC_CHARS).collect();
                        format!("YouTube: {niche} — {short}")
                    }
                    None => format!("YouTube: {niche}"),
                }
            }
            other => other.label().to_string(),
        }
    }
}

/// The brief a user fills in for a channel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelValues {
    #[serde(default, deserialize_with = "loose_text")]
    pub niche: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub topic: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub audience: Option<String>,
    #[serde(default, deserialize_with = "tone_list")]
    pub tones: Vec<String>,
    /// Free-form guidance typed by the user.
    #[serde(default, deserialize_with = "loose_text")]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "loose_minutes")]
    pub duration_min: Option<f64>,
    #[serde(default, deserialize_with = "loose_flag")]
    pub deep_research: bool,
}

impl ChannelValues {
    /// Query used for retrieval: the topic when one was sent, otherwise the
    /// niche. A whitespace-only topic still wins and yields no query.
    pub fn research_query(&self) -> Option<&str> {
        self.topic
            .as_deref()
            .or(self.niche.as_deref())
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// Text field: strings and numbers are kept, empty strings and everything
/// else become `None`.
pub fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Tones: a list of strings or a single `+`-separated string.
pub fn tone_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let pieces: Vec<String> = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(joined)) => joined.split('+').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    Ok(pieces
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Minutes: a number or numeric string; only positive finite values count.
pub fn loose_minutes<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(raw.filter(|m| m.is_finite() && *m > 0.0))
}

/// Flag: only a JSON `true` switches it on.
pub fn loose_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(
        Option::<Value>::deserialize(deserializer)?,
        Some(Value::Bool(true))
    ))
}
