//! Deterministic importance heuristics for observed messages.
//!
//! The observing phase scores other agents' messages without consulting the
//! oracle. Health talk matters most, then shared experience and advice, then
//! everyday care. Everything else is small talk.

/// Observed items scoring above this are flagged as important.
pub const IMPORTANT_THRESHOLD: u8 = 6;

/// Score for health-related messages.
const HEALTH_SCORE: u8 = 8;
/// Score for advice and experience sharing.
const ADVICE_SCORE: u8 = 6;
/// Score for everyday caring remarks.
const CARE_SCORE: u8 = 4;
/// Score for anything else.
const SMALL_TALK_SCORE: u8 = 2;

const HEALTH_KEYWORDS: &[&str] = &[
    "fever", "sick", "illness", "hospital", "doctor", "cough", "rash", "vomit", "unwell", "medicine",
];

const ADVICE_KEYWORDS: &[&str] = &[
    "experience", "advice", "tip", "recommend", "suggest", "method", "how to", "help",
];

const CARE_KEYWORDS: &[&str] = &["how are", "tired", "hang in", "take care", "doing ok", "rest well"];

/// Score an observed message in `[1, 10]`.
pub fn assess_message(message: &str) -> u8 {
    let lower = message.to_lowercase();
    let any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));
    if any(HEALTH_KEYWORDS) {
        HEALTH_SCORE
    } else if any(ADVICE_KEYWORDS) {
        ADVICE_SCORE
    } else if any(CARE_KEYWORDS) {
        CARE_SCORE
    } else {
        SMALL_TALK_SCORE
    }
}

/// Whether a score crosses the importance threshold.
pub const fn is_important(score: u8) -> bool {
    score > IMPORTANT_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_outranks_advice_and_care() {
        assert_eq!(assess_message("Doudou has a fever, any advice?"), 8);
        assert_eq!(assess_message("My tip: warm water before bed"), 6);
        assert_eq!(assess_message("You look tired, take care"), 4);
        assert_eq!(assess_message("Lovely weather today"), 2);
    }

    #[test]
    fn only_health_is_important() {
        assert!(is_important(assess_message("went to the hospital")));
        assert!(!is_important(assess_message("any advice on naps?")));
    }
}
