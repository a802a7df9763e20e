//! Fixed assistant-authored texts. Every path through a submission
//! that doesn't produce a model answer ends in one of these.

/// Seeded as the first turn of every session.
pub const GREETING: &str = "Hello! I'm your MRT Moratuwa Assistant. How can I help you today? You can ask me about campus facilities, city landmarks, or research programs.";

/// Shown when no credential could be resolved.
pub const MISSING_CREDENTIAL: &str = "Missing API key. Please set GEMINI_API_KEY in a .env file.";

/// Substituted when the service answers without any text.
pub const EMPTY_RESPONSE_FALLBACK: &str = "I'm sorry, I couldn't process that request.";

/// Shown for any failed completion call.
pub const COMPLETION_ERROR: &str = "Sorry, I encountered an error. Please try again later.";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a specialized assistant for the Moratuwa community (likely University of Moratuwa or the City of Moratuwa in Sri Lanka). Provide helpful, concise, and professional information about the campus, engineering, architecture, city landmarks, or student life. Use a friendly and academic tone.";

/// Text for a settled completion. Empty or missing text falls back to
/// a fixed apology.
pub fn answer_text(text: Option<String>) -> String {
    match text {
        Some(t) if !t.is_empty() => t,
        _ => EMPTY_RESPONSE_FALLBACK.to_string(),
    }
}
