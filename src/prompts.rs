use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Model reply is empty")]
    EmptyReply,
    #[error("Model reply is missing section: {0}")]
    MissingSection(&'static str),
    #[error("Model reply contains no numbered tips")]
    NoNumberedTips,
}

/// Section labels the model is instructed to emit, in render order,
/// paired with the wire field each one maps onto.
const SECTION_LABELS: [(&str, &str); 5] = [
    ("Grammar Feedback", "grammarFeedback"),
    ("Style Feedback", "styleFeedback"),
    ("Clarity Feedback", "clarityFeedback"),
    ("Overall Feedback", "overallFeedback"),
    ("Improvement Tips", "improvementTips"),
];

lazy_static! {
    // A label line: optional leading whitespace and markdown bold markers,
    // the label text, optional closing markers, a colon. Multiline mode so
    // ^ anchors at each line.
    static ref SECTION_RE: Regex = Regex::new(
        r"(?m)^\s*(?:\*\*|#+\s*)?(Grammar Feedback|Style Feedback|Clarity Feedback|Overall Feedback|Improvement Tips)(?:\*\*)?\s*:\s*"
    )
    .expect("section label regex");
    static ref NUMBERED_ITEM_RE: Regex =
        Regex::new(r"(?m)^\s*\d+[.)]\s+\S").expect("numbered item regex");
}

pub const SYSTEM_PROMPT: &str =
    "You are an AI writing assistant that analyzes text and provides feedback.";

/// Render the analysis instruction for one submitted text. The model is
/// asked for exactly five labeled sections so the reply can be mapped
/// deterministically back onto the analysis schema.
pub fn analysis_prompt(text: &str) -> String {
    format!(
        "Analyze the following text for grammar, style, and clarity. Provide specific feedback and actionable tips for improvement.\n\n\
         Text: {}\n\n\
         Here's how the response should be formatted:\n\n\
         Grammar Feedback: [Feedback on grammar]\n\
         Style Feedback: [Feedback on style]\n\
         Clarity Feedback: [Feedback on clarity]\n\
         Overall Feedback: [Overall feedback on the text]\n\
         Improvement Tips: [Actionable tips for improving the writing]",
        text
    )
}

/// Render the tips-only instruction: takes a precomputed analysis and asks
/// for a numbered list of actionable tips, nothing else.
pub fn improvement_tips_prompt(text: &str, analysis: &str) -> String {
    format!(
        "You provide specific, actionable tips for improving writing based on an analysis of the text.\n\n\
         Text: {}\n\n\
         Analysis: {}\n\n\
         Based on the analysis, provide actionable tips for improving the writing. \
         Focus on grammar, style, clarity, and overall quality. Provide the tips as a numbered list.",
        text, analysis
    )
}

/// Map the model's labeled-section reply back onto the five analysis
/// fields. All-or-nothing: if any section is absent the whole reply is
/// rejected, never partially populated or guessed.
pub fn parse_analysis_reply(reply: &str) -> Result<Value, PromptError> {
    if reply.trim().is_empty() {
        return Err(PromptError::EmptyReply);
    }

    // Collect (label, start-of-body, end-of-header) for every label line.
    let mut markers: Vec<(&str, usize, usize)> = Vec::new();
    for caps in SECTION_RE.captures_iter(reply) {
        let whole = caps.get(0).expect("match 0");
        let label = caps.get(1).expect("label group");
        markers.push((label.as_str(), whole.end(), whole.start()));
    }

    let mut result = serde_json::Map::new();
    for (label, field) in SECTION_LABELS {
        // First occurrence wins; the prompt asks for each label once.
        let (idx, &(_, body_start, _)) = markers
            .iter()
            .enumerate()
            .find(|(_, (l, _, _))| *l == label)
            .ok_or(PromptError::MissingSection(field))?;

        // Body runs until the next label line (any label), or end of reply.
        let body_end = markers
            .iter()
            .skip(idx + 1)
            .map(|&(_, _, header_start)| header_start)
            .filter(|&start| start >= body_start)
            .min()
            .unwrap_or(reply.len());

        let body = reply[body_start..body_end].trim();
        if body.is_empty() {
            return Err(PromptError::MissingSection(field));
        }
        result.insert(field.to_string(), json!(body));
    }

    Ok(Value::Object(result))
}

/// Map a tips-only reply onto the single-field tips schema. The reply must
/// contain at least one numbered item, otherwise the template contract was
/// not honored and the reply is rejected.
pub fn parse_tips_reply(reply: &str) -> Result<Value, PromptError> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(PromptError::EmptyReply);
    }
    if !NUMBERED_ITEM_RE.is_match(trimmed) {
        return Err(PromptError::NoNumberedTips);
    }
    Ok(json!({ "improvementTips": trimmed }))
}
