//! Prompt context assembly.
//!
//! The upstream engine takes a single flat prompt, so the conversation
//! history is rendered as role-labelled lines. Pure and deterministic:
//! the same message sequence always yields the same prompt.

use chatrelay_types::chat::Message;

/// Render an ordered message history as upstream prompt text.
///
/// Each message becomes `"{Label}: {content}"`, joined with newlines.
/// An empty history yields an empty (but valid) prompt.
pub fn assemble(messages: &[Message]) -> String {
    let mut prompt = String::new();
    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            prompt.push('\n');
        }
        prompt.push_str(message.role.label());
        prompt.push_str(": ");
        prompt.push_str(&message.content);
    }
    prompt
}
