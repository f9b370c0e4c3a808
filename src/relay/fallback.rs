//! Canned replies used when no model answer is available.
//!
//! The user never sees a provider error. When a completion fails the relay
//! answers with one of these texts instead, picked by simple keyword groups so
//! the reply still acknowledges what the person said.

/// Sent back when the message is empty or whitespace.
pub const EMPTY_MESSAGE_REPLY: &str = "Please type a message.";

/// Sent back when the request body could not be parsed.
pub const UNREADABLE_REQUEST_REPLY: &str = "Sorry, I couldn't read that message. Please try sending it again.";

/// Sent back when the service cannot reach any model because it is not configured.
pub const UNAVAILABLE_REPLY: &str = "I'm having trouble responding right now. \
Please try again in a little while. If you need to talk to someone now, reaching out \
to a friend, family member, or a local support line can really help.";

const SADNESS: &[&str] = &["sad", "down", "depressed", "hopeless", "lonely"];
const ANXIETY: &[&str] = &["anxious", "anxiety", "worried", "nervous", "panic"];
const STRESS: &[&str] = &["stress", "stressed", "overwhelmed", "pressure"];
const GREETING: &[&str] = &["hi", "hello", "hey"];
const THANKS: &[&str] = &["thank", "thanks"];

const SADNESS_REPLY: &str = "I'm really sorry you're feeling this way. What you're going through \
sounds hard, and it takes courage to reach out. Remember: you don't have to face this alone. \
Talking to a friend, family member, or a therapist can make a real difference. \
Would you like to share a bit more about what's on your mind? I'm here to listen.";

const ANXIETY_REPLY: &str = "Anxiety can feel overwhelming, and I hear you. Try taking a few slow \
breaths: breathe in for 4 counts, hold for 4, breathe out for 6. Grounding can help too: name 5 \
things you can see, 4 you can hear, 3 you can touch. If anxiety is affecting your daily life, a \
therapist can offer tools that really help. What's been weighing on you lately?";

const STRESS_REPLY: &str = "Feeling overwhelmed is exhausting, and it's okay to admit that. Try \
breaking things into smaller steps. Even one small thing at a time helps. Short breaks, a walk, \
or talking to someone you trust can lighten the load. You're doing your best, and that matters. \
What would feel most helpful right now?";

const GREETING_REPLY: &str = "Hi there. I'm here to listen and support you. You can share how \
you're feeling, whether it's stress, anxiety, sadness, or anything else. How are you doing today?";

const THANKS_REPLY: &str = "You're welcome. I'm glad I could be here for you. Remember, it's okay \
to reach out whenever you need support. Take care of yourself.";

const DEFAULT_REPLY: &str = "Thank you for sharing. I'm here to listen. It can help to talk about \
what's on your mind, whether it's stress, anxiety, sadness, or something else. \
What would you like to talk about?";

/// Deterministic supportive reply for `message`. Groups are checked in order,
/// so "hi, I feel sad" gets the sadness reply.
pub fn reply_for(message: &str) -> &'static str {
    let words = words(message);
    let has = |group: &[&str]| {
        words
            .iter()
            .any(|word| group.iter().any(|keyword| word.starts_with(keyword)))
    };

    if has(SADNESS) {
        SADNESS_REPLY
    } else if has(ANXIETY) {
        ANXIETY_REPLY
    } else if has(STRESS) {
        STRESS_REPLY
    } else if words.iter().any(|word| GREETING.contains(&word.as_str())) {
        GREETING_REPLY
    } else if has(THANKS) {
        THANKS_REPLY
    } else {
        DEFAULT_REPLY
    }
}

fn words(message: &str) -> Vec<String> {
    message
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}
