//! Whole-text extraction helpers (spec.md §4.1).

use crate::model::AnalyzeInput;

/// Concatenates `prompt` and, if present, all `messages[i].content` with
/// newlines. Used by whole-text rules (conflicts, schema-risk, tokens,
/// PII, security).
#[must_use]
pub fn extract_text(input: &AnalyzeInput) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(prompt) = &input.prompt {
        parts.push(prompt);
    }
    if let Some(messages) = &input.messages {
        for message in messages {
            parts.push(&message.content);
        }
    }
    parts.join("\n")
}

/// Returns only message content, newline-joined (empty string if no
/// messages).
#[must_use]
pub fn join_messages(input: &AnalyzeInput) -> String {
    input
        .messages
        .as_ref()
        .map(|messages| {
            messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

/// Returns the "current" prompt: the last message's content when
/// `messages` is present, else `prompt`, else an empty string.
#[must_use]
pub fn get_current_prompt(input: &AnalyzeInput) -> String {
    if let Some(messages) = &input.messages {
        if let Some(last) = messages.last() {
            return last.content.clone();
        }
    }
    input.prompt.clone().unwrap_or_default()
}

/// Returns all messages except the current (last) one, newline-joined,
/// in original order. Empty when there are 0 or 1 messages and no
/// separate prompt context.
#[must_use]
pub fn get_history(input: &AnalyzeInput) -> String {
    match &input.messages {
        Some(messages) if messages.len() > 1 => messages[..messages.len() - 1]
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message, Role};

    #[test]
    fn test_extract_text_prompt_only() {
        let input = AnalyzeInput {
            prompt: Some("hello".to_string()),
            ..Default::default()
        };
        assert_eq!(extract_text(&input), "hello");
    }

    #[test]
    fn test_extract_text_messages_only() {
        let input = AnalyzeInput {
            messages: Some(vec![
                Message {
                    role: Role::User,
                    content: "first".to_string(),
                },
                Message {
                    role: Role::Assistant,
                    content: "second".to_string(),
                },
            ]),
            ..Default::default()
        };
        assert_eq!(extract_text(&input), "first\nsecond");
    }

    #[test]
    fn test_extract_text_prompt_and_messages() {
        let input = AnalyzeInput {
            prompt: Some("p".to_string()),
            messages: Some(vec![Message {
                role: Role::User,
                content: "m".to_string(),
            }]),
            ..Default::default()
        };
        assert_eq!(extract_text(&input), "p\nm");
    }

    #[test]
    fn test_get_current_prompt_prefers_last_message() {
        let input = AnalyzeInput {
            prompt: Some("ignored".to_string()),
            messages: Some(vec![
                Message {
                    role: Role::User,
                    content: "first".to_string(),
                },
                Message {
                    role: Role::User,
                    content: "last".to_string(),
                },
            ]),
            ..Default::default()
        };
        assert_eq!(get_current_prompt(&input), "last");
    }

    #[test]
    fn test_get_current_prompt_falls_back_to_prompt() {
        let input = AnalyzeInput {
            prompt: Some("only this".to_string()),
            ..Default::default()
        };
        assert_eq!(get_current_prompt(&input), "only this");
    }

    #[test]
    fn test_get_history_excludes_last_message() {
        let input = AnalyzeInput {
            messages: Some(vec![
                Message {
                    role: Role::User,
                    content: "first".to_string(),
                },
                Message {
                    role: Role::Assistant,
                    content: "second".to_string(),
                },
                Message {
                    role: Role::User,
                    content: "third".to_string(),
                },
            ]),
            ..Default::default()
        };
        assert_eq!(get_history(&input), "first\nsecond");
    }

    #[test]
    fn test_get_history_single_message_is_empty() {
        let input = AnalyzeInput {
            messages: Some(vec![Message {
                role: Role::User,
                content: "only".to_string(),
            }]),
            ..Default::default()
        };
        assert_eq!(get_history(&input), "");
    }
}
