//! Conversational agent trait

use async_trait::async_trait;

use crate::Result;

/// A remote (or local) agent that answers one user utterance at a time
///
/// Implementations must not apply their own fallback policy: errors are
/// returned so the gateway can decide what the user hears.
#[async_trait]
pub trait ConversationalAgent: Send + Sync + 'static {
    /// Produce a reply to the user's text
    async fn reply(&self, session_id: &str, text: &str) -> Result<String>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
