//! services/api/src/screening.rs
//!
//! Keyword triage applied to every chat message before any model call.
//! Messages indicating a crisis, an urgent physical emergency, or emotional
//! distress get a fixed reply immediately; the model never sees them.

use rand::seq::SliceRandom;

const CRISIS_KEYWORDS: [&str; 5] = [
    "suicide",
    "kill myself",
    "end my life",
    "can't go on",
    "want to die",
];

const URGENT_PHYSICAL_KEYWORDS: [&str; 8] = [
    "dying",
    "chest pain",
    "can't breathe",
    "severe bleeding",
    "heart attack",
    "unconscious",
    "stab",
    "shot",
];

const EMOTIONAL_DISTRESS_KEYWORDS: [&str; 5] =
    ["depressed", "hopeless", "panic", "anxious", "lonely"];

const CRISIS_REPLY: &str = "🚨 It sounds like you might be in crisis or thinking about self-harm. \
You're not alone — please reach out for immediate help:\n\
📞 Call your local emergency number (e.g., 911 / 112 / 999), or\n\
💬 Contact a suicide helpline such as 988 (US), Samaritans (UK: 116 123), or Befrienders (MY).\n\
Please get help right now — you deserve care and safety.";

const EMERGENCY_REPLY: &str = "🚨 This sounds like a medical emergency. \
Please call emergency services (911 / 112 / 999) or go to the nearest hospital immediately.";

const DISTRESS_REPLY: &str = "💬 It sounds like you're going through a tough time. \
You're not alone — reaching out to a trusted friend, counselor, or mental health professional can really help. \
If things feel overwhelming, you can also contact a local helpline for support.";

const FALLBACK_REPLIES: [&str; 3] = [
    "I understand your concern. For proper medical care, please consult a healthcare professional.",
    "Thanks for reaching out. It's best to speak with a doctor for personalized advice.",
    "I appreciate your message. Please consult a licensed healthcare provider for detailed guidance.",
];

/// A canned reply produced without consulting the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageReply {
    pub reply: &'static str,
    pub source: &'static str,
}

/// Checks the lowercased message against the keyword lists, most severe
/// first. `None` means the message is safe to forward to the model.
pub fn screen_message(message: &str) -> Option<TriageReply> {
    let lowered = message.to_lowercase();

    if contains_any(&lowered, &CRISIS_KEYWORDS) {
        return Some(TriageReply {
            reply: CRISIS_REPLY,
            source: "crisis",
        });
    }
    if contains_any(&lowered, &URGENT_PHYSICAL_KEYWORDS) {
        return Some(TriageReply {
            reply: EMERGENCY_REPLY,
            source: "emergency",
        });
    }
    if contains_any(&lowered, &EMOTIONAL_DISTRESS_KEYWORDS) {
        return Some(TriageReply {
            reply: DISTRESS_REPLY,
            source: "distress",
        });
    }

    None
}

/// One of the canned consult-a-professional replies, used whenever the model
/// is unavailable or returns nothing.
pub fn fallback_reply() -> &'static str {
    FALLBACK_REPLIES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_REPLIES[0])
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crisis_keywords_win_over_everything_else() {
        let triage = screen_message("I feel depressed and want to die").expect("triaged");
        assert_eq!(triage.source, "crisis");
    }

    #[test]
    fn urgent_physical_keywords_are_detected_case_insensitively() {
        let triage = screen_message("My father has CHEST PAIN right now").expect("triaged");
        assert_eq!(triage.source, "emergency");
    }

    #[test]
    fn distress_keywords_get_the_supportive_reply() {
        let triage = screen_message("I've been so lonely lately").expect("triaged");
        assert_eq!(triage.source, "distress");
        assert!(triage.reply.contains("tough time"));
    }

    #[test]
    fn ordinary_questions_pass_through() {
        assert!(screen_message("How much water should I drink a day?").is_none());
        assert!(screen_message("what are good sources of protein").is_none());
    }

    #[test]
    fn fallback_reply_comes_from_the_fixed_pool() {
        for _ in 0..20 {
            assert!(FALLBACK_REPLIES.contains(&fallback_reply()));
        }
    }
}
