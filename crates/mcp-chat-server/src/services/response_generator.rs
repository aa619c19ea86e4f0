use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::chat::{ChatMessage, ChatTurn};
use crate::services::llm_service::CompletionProvider;

pub const NOT_INITIALIZED_REPLY: &str = "❌ Groq client not initialized.";
pub const ERROR_REPLY_PREFIX: &str = "❌ Error generating response: ";

/// Static pieces of the single-message prompt
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    preamble: String,
    history_window: usize,
}

impl PromptBuilder {
    pub fn new(preamble: impl Into<String>, history_window: usize) -> Self {
        Self {
            preamble: preamble.into(),
            history_window,
        }
    }

    /// Preamble, tool-server hint, the last `history_window` turns, then the
    /// new input. `turns` normally already ends with that input.
    pub fn build(&self, server_names: &[String], turns: &[ChatTurn], user_input: &str) -> String {
        let start = turns.len().saturating_sub(self.history_window);

        let mut context = String::from("Recent conversation:\n");
        for turn in &turns[start..] {
            context.push_str(turn.role.label());
            context.push_str(": ");
            context.push_str(&turn.content);
            context.push('\n');
        }

        format!(
            "{}\nYou have access to: {}\n\n{}\n\nCurrent user input: {}",
            self.preamble,
            format_name_list(server_names),
            context,
            user_input
        )
    }
}

/// Renders names as a bracketed, quoted list: `['a', 'b']`, `[]` when empty.
pub fn format_name_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| quote_name(n)).collect();
    format!("[{}]", quoted.join(", "))
}

fn quote_name(name: &str) -> String {
    let quote = if name.contains('\'') && !name.contains('"') { '"' } else { '\'' };

    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for ch in name.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Single-shot completion whose failures come back as reply text
#[derive(Clone)]
pub struct ResponseGenerator {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl ResponseGenerator {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { provider }
    }

    pub fn is_ready(&self) -> bool {
        self.provider.is_some()
    }

    /// Never fails. Callers tell errors apart only by the `❌` prefix.
    pub async fn complete(&self, prompt: &str) -> String {
        let Some(provider) = &self.provider else {
            return NOT_INITIALIZED_REPLY.to_string();
        };

        let messages = [ChatMessage::user(prompt)];
        match provider.generate(&messages).await {
            Ok(reply) => {
                debug!("Completion returned {} chars", reply.len());
                reply
            }
            Err(e) => {
                warn!("Completion failed: {}", e);
                format!("{}{}", ERROR_REPLY_PREFIX, e)
            }
        }
    }
}
