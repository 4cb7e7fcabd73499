//! Keyword-driven coaching replies
//!
//! The default agent backend. It needs no network access and mirrors the
//! prompts the mobile client was built against: ask for the missing minute
//! count, or confirm the log once a duration was mentioned.

use async_trait::async_trait;

use voice_coach_core::{ConversationalAgent, Result};

/// One reply rule: trigger keywords, reply once minutes were mentioned,
/// reply asking for the duration
struct ReplyRule {
    keywords: &'static [&'static str],
    logged: &'static str,
    ask_duration: &'static str,
}

const RULES: &[ReplyRule] = &[
    ReplyRule {
        keywords: &["run", "ran", "running", "jog"],
        logged: "Great! I've logged your running workout",
        ask_duration: "That sounds like a great run! How long did you run for?",
    },
    ReplyRule {
        keywords: &["bike", "cycle", "cycling", "rode"],
        logged: "Excellent! I've logged your cycling workout",
        ask_duration: "Nice ride! How many minutes did you cycle?",
    },
    ReplyRule {
        keywords: &["yoga", "stretch"],
        logged: "Perfect! Your yoga session has been logged",
        ask_duration: "That's wonderful! How long was your yoga session?",
    },
    ReplyRule {
        keywords: &["workout", "exercise", "train"],
        logged: "Awesome! I've logged your workout. Anything else you'd like to add?",
        ask_duration: "What did you do for your workout and how long did your workout last?",
    },
];

const GENERIC_PROMPT: &str =
    "I'd be happy to help you log your workout! What activity did you do, and for how long?";

/// Scripted workout coach
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedCoach;

impl ScriptedCoach {
    pub fn new() -> Self {
        Self
    }

    /// Pick the reply for an utterance
    pub fn respond(&self, text: &str) -> &'static str {
        let lowered = text.to_lowercase();
        // "min" also covers "minute"
        let mentions_minutes = lowered.contains("min");

        RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
            .map(|rule| {
                if mentions_minutes {
                    rule.logged
                } else {
                    rule.ask_duration
                }
            })
            .unwrap_or(GENERIC_PROMPT)
    }
}

#[async_trait]
impl ConversationalAgent for ScriptedCoach {
    async fn reply(&self, _session_id: &str, text: &str) -> Result<String> {
        Ok(self.respond(text).to_string())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_replies() {
        let coach = ScriptedCoach::new();
        assert_eq!(
            coach.respond("I ran for 30 minutes"),
            "Great! I've logged your running workout"
        );
        assert_eq!(
            coach.respond("I went for a jog"),
            "That sounds like a great run! How long did you run for?"
        );
    }

    #[test]
    fn test_rule_order() {
        let coach = ScriptedCoach::new();
        // Running is checked before yoga
        assert_eq!(
            coach.respond("a run and some stretching"),
            "That sounds like a great run! How long did you run for?"
        );
        assert_eq!(
            coach.respond("Yoga for 20 min"),
            "Perfect! Your yoga session has been logged"
        );
    }

    #[test]
    fn test_generic_workout_and_fallthrough() {
        let coach = ScriptedCoach::new();
        assert_eq!(
            coach.respond("I did some exercise"),
            "What did you do for your workout and how long did your workout last?"
        );
        assert_eq!(coach.respond("hello there"), GENERIC_PROMPT);
    }

    #[tokio::test]
    async fn test_agent_trait() {
        let coach = ScriptedCoach::new();
        let reply = coach.reply("s1", "rode my bike").await.unwrap();
        assert_eq!(reply, "Nice ride! How many minutes did you cycle?");
        assert_eq!(coach.name(), "scripted");
    }
}
