//! Prompt construction for outfit chat.
//!
//! A prompt is plain text in four parts, always in this order: the persona
//! instructions, the recent conversation, an optional catalog digest, and
//! the new user message followed by an open `AI:` line for the model to
//! continue.

use crate::catalog::Outfit;
use crate::session::Turn;

/// Number of complete turns of history included in a prompt.
pub const HISTORY_TURNS: usize = 3;

/// Outfits included in the catalog digest.
pub const DIGEST_OUTFITS: usize = 5;

/// Items listed per outfit in the catalog digest.
pub const DIGEST_ITEMS: usize = 4;

/// Returns the persona and behavior instructions.
///
/// The assistant is "Dada", a casual outfit advisor who chats first and
/// recommends only when asked, keeping replies under 200 characters.
pub fn system_prompt() -> &'static str {
    "You are \"Dada\" (搭搭), a lively and friendly outfit advisor.\n\n\
     Chat like a real friend, not a customer-service bot.\n\n\
     Conversation guidelines:\n\
     - Greeting: reply warmly and make a bit of small talk.\n\
     - Small talk: keep it natural, do not rush to recommend.\n\
     - Outfit questions: only then give concrete recommendations.\n\
     - Keep the tone relaxed and conversational, like a chat on Instagram.\n\
     - A few emoji are fine.\n\n\
     When recommending outfits:\n\
     1. If catalog options are listed, pick from them.\n\
     2. Describe each outfit in one or two short lines.\n\
     3. Never exceed 200 characters in total.\n\n\
     Avoid:\n\
     - Stiff phrases like \"Happy to be of service\".\n\
     - Introducing yourself as an official advisor.\n\
     - Jumping straight into recommendations."
}

/// Renders the catalog digest, or `None` when there is nothing to show.
///
/// Each outfit becomes one line with its id, name and up to
/// [`DIGEST_ITEMS`] item descriptors.
pub fn catalog_digest(outfits: &[Outfit]) -> Option<String> {
    if outfits.is_empty() {
        return None;
    }

    let lines: Vec<String> = outfits
        .iter()
        .take(DIGEST_OUTFITS)
        .map(|outfit| {
            let mut line = format!("Outfit {}: {}", outfit.id, outfit.name);
            if !outfit.items.is_empty() {
                let items: Vec<String> = outfit
                    .items
                    .iter()
                    .take(DIGEST_ITEMS)
                    .map(|item| item.descriptor())
                    .collect();
                line.push_str(" - includes: ");
                line.push_str(&items.join(", "));
            }
            line
        })
        .collect();

    Some(format!("[Catalog options]\n{}", lines.join("\n")))
}

/// Assembles the full prompt for one chat turn.
///
/// `history` should already be trimmed to the turns that belong in the
/// prompt; only the last [`HISTORY_TURNS`] are rendered regardless.
pub fn build_prompt(history: &[Turn], outfits: &[Outfit], user_text: &str) -> String {
    let mut prompt = String::from(system_prompt());
    prompt.push_str("\n\n");

    let start = history.len().saturating_sub(HISTORY_TURNS);
    for turn in &history[start..] {
        prompt.push_str(&format!("User: {}\nAI: {}\n\n", turn.user, turn.ai));
    }

    if let Some(digest) = catalog_digest(outfits) {
        prompt.push_str(&digest);
        prompt.push_str("\n\n");
    }

    prompt.push_str(&format!("User: {user_text}\nAI:"));
    prompt
}
