//! Prompt assembly for generation and paragraph rewrites.
//!
//! Prompts are built from optional sections; absent or empty sections are
//! dropped before joining so the model never sees dangling labels.

use serde::Deserialize;

use crate::channels::{Channel, ChannelValues, loose_minutes, loose_text, tone_list};

const DEFAULT_SCRIPT_MINUTES: f64 = 4.0;

/// Request to rewrite one paragraph of an existing draft.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphEdit {
    #[serde(default, deserialize_with = "loose_text")]
    pub selected: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub instruction: Option<String>,
    /// The whole draft, for style only.
    #[serde(default, deserialize_with = "loose_text")]
    pub full_text: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub niche: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub audience: Option<String>,
    #[serde(default, deserialize_with = "tone_list")]
    pub tones: Vec<String>,
    #[serde(default, deserialize_with = "loose_minutes")]
    pub duration_min: Option<f64>,
}

fn join_present<I, S>(sections: I, sep: &str) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    sections
        .into_iter()
        .flatten()
        .map(|s| s.as_ref().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn labelled(label: &str, value: Option<&str>) -> Option<String> {
    value.map(|v| format!("{label}: {v}"))
}

fn tone_phrase(tones: &[String]) -> Option<String> {
    (!tones.is_empty()).then(|| tones.join(" + "))
}

/// The exact heading structure a YouTube script must follow.
pub fn youtube_structure(duration_min: Option<f64>, tones: &[String]) -> String {
    let minutes = duration_min.unwrap_or(DEFAULT_SCRIPT_MINUTES);
    join_present(
        [
            Some(format!(
                "Create a {minutes}-minute YouTube script in this exact structure:"
            )),
            Some("H1: Hook (one punchy line within 3s)".into()),
            Some("H2: Short Intro (who & why this matters)".into()),
            Some("H2: The Problem (what viewers struggle with)".into()),
            Some("H2: The Solution (your core idea/approach)".into()),
            Some("H2: Strategy Breakdown (3–5 sections)".into()),
            Some("H2: Personal Plan (what to do this week)".into()),
            Some("H2: Mindset Shift (reframe or encouragement)".into()),
            Some("H2: Call-to-Action (subscribe/like/next step)".into()),
            Some("H2: Video Notes (B-roll ideas & timestamp hints)".into()),
            Some("Rules:".into()),
            Some("- Use clear, tight sentences.".into()),
            Some("- Mark H1/H2 headings exactly as shown.".into()),
            Some("- Add timestamp hints like [0:15] when helpful.".into()),
            Some("- Keep the script engaging and specific.".into()),
            tone_phrase(tones).map(|t| format!("- Tone: {t}.")),
        ],
        "\n",
    )
}

/// Short brief for the non-script channels. `None` for the YouTube script,
/// which gets the structured prompt instead.
pub fn channel_brief(channel: Channel, values: &ChannelValues) -> Option<String> {
    let (opening, closing) = match channel {
        Channel::YtScript => return None,
        Channel::InstaPost => ("Act as an IG copywriter.", Some("Write a punchy caption.")),
        Channel::InstaReel => ("Write an IG Reel script.", None),
        Channel::LinkedIn => ("Write a value-led LinkedIn post.", None),
        Channel::XPost => ("Write an X thread.", None),
        Channel::Blog => ("Write an outline + 1000-word draft.", None),
        Channel::Reddit => ("Write a friendly, story-first Reddit post.", None),
    };
    Some(join_present(
        [
            Some(opening.to_string()),
            labelled("Topic", values.topic.as_deref()),
            closing.map(str::to_string),
        ],
        "\n",
    ))
}

/// Full generation prompt for a channel, optionally grounded with a
/// knowledge block.
pub fn research_prompt(
    channel: Channel,
    values: &ChannelValues,
    knowledge: Option<&str>,
    deep_research: bool,
) -> String {
    let Some(brief) = channel_brief(channel, values) else {
        return youtube_prompt(values, knowledge, deep_research);
    };
    join_present(
        [
            Some(brief),
            knowledge.map(str::to_string),
            deep_research.then(|| {
                "Deep research: ground in reliable, current sources from our DB; \
                 synthesize into original prose."
                    .to_string()
            }),
        ],
        "\n\n",
    )
}

fn youtube_prompt(values: &ChannelValues, knowledge: Option<&str>, deep_research: bool) -> String {
    join_present(
        [
            Some(
                "You are an expert YouTube script writer. Follow the requested structure exactly."
                    .to_string(),
            ),
            labelled("Niche", values.niche.as_deref()),
            labelled("Topic/Brief", values.topic.as_deref()),
            labelled("Audience", values.audience.as_deref()),
            tone_phrase(&values.tones).map(|t| format!("Tone(s): {t}")),
            labelled("Custom guidance", values.prompt.as_deref()),
            knowledge.map(str::to_string),
            Some(youtube_structure(values.duration_min, &values.tones)),
            Some(
                "Use any knowledge snippets above if helpful; synthesize into original prose."
                    .to_string(),
            ),
            deep_research.then(|| {
                "If facts are included, favor accuracy and phrase them in your own words."
                    .to_string()
            }),
        ],
        "\n\n",
    )
}

/// Prompt asking the model to rewrite `selected` per `instruction`.
pub fn rewrite_prompt(edit: &ParagraphEdit, selected: &str, instruction: &str) -> String {
    join_present(
        [
            Some("Rewrite ONLY the following paragraph according to the instruction.".to_string()),
            Some(
                "Keep roughly the same length and preserve the voice unless instructed otherwise."
                    .to_string(),
            ),
            Some("Return the rewritten paragraph ONLY (no headings or commentary).".to_string()),
            labelled("Niche", edit.niche.as_deref()),
            labelled("Audience", edit.audience.as_deref()),
            tone_phrase(&edit.tones).map(|t| format!("Tone(s): {t}")),
            edit.duration_min
                .map(|m| format!("Full video length target: ~{m} minutes.")),
            edit.full_text.as_deref().map(|text| {
                format!("\nContext (do NOT repeat, just keep style coherent):\n{text}")
            }),
            Some("\nInstruction:".to_string()),
            Some(instruction.to_string()),
            Some("\nParagraph:".to_string()),
            Some(selected.to_string()),
            Some("\nRewritten paragraph:".to_string()),
        ],
        "\n",
    )
}

/// Collapse paragraph breaks into spaces and trim; fall back to the
/// original paragraph when the model returned nothing.
pub fn clean_rewrite(output: &str, original: &str) -> String {
    let mut cleaned = String::with_capacity(output.len());
    let mut newlines = 0usize;
    for ch in output.chars() {
        if ch == '\n' {
            newlines += 1;
            continue;
        }
        match newlines {
            0 => {}
            1 => cleaned.push('\n'),
            _ => cleaned.push(' '),
        }
        newlines = 0;
        cleaned.push(ch);
    }
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        original.to_string()
    } else {
        cleaned.to_string()
    }
}
