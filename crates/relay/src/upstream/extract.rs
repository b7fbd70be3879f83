use serde_json::Value;

type Strategy = fn(&Value) -> Option<&str>;

/// Tried in order; the first non-empty string wins.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("choices[0].message.content", message_content),
    ("choices[0].text", completion_text),
];

fn first_choice(body: &Value) -> Option<&Value> {
    body.get("choices")?.as_array()?.first()
}

fn message_content(body: &Value) -> Option<&str> {
    first_choice(body)?.get("message")?.get("content")?.as_str()
}

fn completion_text(body: &Value) -> Option<&str> {
    first_choice(body)?.get("text")?.as_str()
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Extracted {
    pub(crate) path: &'static str,
    pub(crate) text: String,
}

/// Pulls the rewritten text out of a chat completion body, trimmed. `None`
/// when no known layout matches.
pub(crate) fn extract_rewritten(body: &Value) -> Option<Extracted> {
    STRATEGIES.iter().find_map(|&(path, strategy)| {
        strategy(body)
            .filter(|text| !text.is_empty())
            .map(|text| Extracted {
                path,
                text: text.trim().to_string(),
            })
    })
}
