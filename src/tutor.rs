//! Tutor replies
//!
//! When no remote chat backend is configured (or it fails), replies come from an
//! ordered list of keyword rules. The first matching rule wins and a default
//! reply covers everything else. Fallback replies are flagged so the UI can
//! mark them as demo answers.

use crate::error::SetuError;
use crate::locale::Locale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Remote chat service
pub trait ChatBackend {
    fn respond(&self, message: &str, locale: Locale) -> Result<String, SetuError>;
}

/// A canned tutor reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Hindi and English text
    Bilingual {
        hi: &'static str,
        en: &'static str,
    },
    /// One text shown for every locale
    Fixed(&'static str),
}

impl Reply {
    /// Render for `locale`
    ///
    /// Hindi bilingual replies carry the English text after a blank line; other
    /// locales get the English text.
    pub fn render(&self, locale: Locale) -> String {
        match (self, locale) {
            (Reply::Bilingual { hi, en }, Locale::Hi) => format!("{}\n\n{}", hi, en),
            (Reply::Bilingual { en, .. }, _) => en.to_string(),
            (Reply::Fixed(text), _) => text.to_string(),
        }
    }
}

const QUADRATIC_REPLY: Reply = Reply::Bilingual {
    hi: "द्विघात समीकरण ax² + bx + c = 0 को हल करने के लिए सूत्र का उपयोग करें: x = (-b ± √(b²-4ac)) / 2a",
    en: "For quadratic equation ax² + bx + c = 0, use the formula: x = (-b ± √(b²-4ac)) / 2a",
};

const PHOTOSYNTHESIS_REPLY: Reply = Reply::Bilingual {
    hi: "प्रकाश संश्लेषण में पौधे सूर्य की रोशनी, CO₂ और पानी से भोजन बनाते हैं।",
    en: "In photosynthesis, plants make food using sunlight, CO₂ and water.",
};

const DEFAULT_REPLY: Reply = Reply::Bilingual {
    hi: "यह एक बहुत अच्छा प्रश्न है! मैं आपकी मदद करने के लिए यहाँ हूँ।",
    en: "That's a great question! I'm here to help you.",
};

// Subject replies from the mobile tutor screen, Hindi with English terms
const MOBILE_MATH_REPLY: Reply = Reply::Fixed(
    "गणित में मैं आपकी मदद कर सकता हूँ! द्विघात समीकरण ax² + bx + c = 0 के लिए सूत्र है: x = (-b ± √(b²-4ac)) / 2a। क्या आप कोई विशिष्ट समस्या हल करना चाहते हैं? 🧮",
);

const MOBILE_SCIENCE_REPLY: Reply = Reply::Fixed(
    "प्रकाश संश्लेषण एक महत्वपूर्ण प्रक्रिया है जिसमें पौधे सूर्य की रोशनी, कार्बन डाइऑक्साइड और पानी का उपयोग करके भोजन बनाते हैं। इसका सूत्र है: 6CO₂ + 6H₂O + प्रकाश ऊर्जा → C₆H₁₂O₆ + 6O₂ 🌱",
);

const MOBILE_CODING_REPLY: Reply = Reply::Fixed(
    "Python में loop लिखना बहुत आसान है!\n\nFor loop:\nfor i in range(5):\n    print(i)\n\nWhile loop:\ni = 0\nwhile i < 5:\n    print(i)\n    i += 1\n\nक्या आप कोई specific example चाहते हैं? 💻",
);

const MOBILE_ENGLISH_REPLY: Reply = Reply::Fixed(
    "English grammar के मुख्य नियम:\n\n1. Subject + Verb + Object\n2. Present tense: I/You/We/They + verb\n3. He/She/It + verb + s\n4. Articles: a, an, the का सही उपयोग\n\nकोई specific topic पर जानकारी चाहिए? 📖",
);

const MOBILE_DEFAULT_REPLY: Reply = Reply::Fixed(
    "यह एक बहुत अच्छा सवाल है! मैं इसका विस्तृत उत्तर दे सकता हूँ। कृपया बताएं कि आप किस विषय के बारे में और जानना चाहते हैं? मैं गणित, विज्ञान, अंग्रेजी, और कोडिंग सभी में आपकी मदद कर सकता हूँ। 🤔",
);

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// A predicate paired with the reply it selects
pub struct ResponseRule {
    name: &'static str,
    predicate: Predicate,
    reply: Reply,
}

impl ResponseRule {
    pub fn new(
        name: &'static str,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
        reply: Reply,
    ) -> Self {
        Self {
            name,
            predicate: Box::new(predicate),
            reply,
        }
    }

    /// Match when the message contains any keyword
    ///
    /// ASCII keywords match case-insensitively; others match verbatim.
    pub fn keywords(name: &'static str, keywords: &'static [&'static str], reply: Reply) -> Self {
        Self::new(
            name,
            move |message: &str| {
                let lowered = message.to_lowercase();
                keywords.iter().any(|k| {
                    if k.is_ascii() {
                        lowered.contains(&k.to_lowercase())
                    } else {
                        message.contains(k)
                    }
                })
            },
            reply,
        )
    }

    /// Match when the message contains any keyword exactly as written
    pub fn contains_any(
        name: &'static str,
        keywords: &'static [&'static str],
        reply: Reply,
    ) -> Self {
        Self::new(
            name,
            move |message: &str| keywords.iter().any(|k| message.contains(k)),
            reply,
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, message: &str) -> bool {
        (self.predicate)(message)
    }
}

/// Ordered rule list with a default reply
pub struct TutorResponder {
    rules: Vec<ResponseRule>,
    default: Reply,
}

impl Default for TutorResponder {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TutorResponder {
    /// Responder with no rules
    pub fn empty(default: Reply) -> Self {
        Self {
            rules: Vec::new(),
            default,
        }
    }

    /// Responder with the built-in subject rules
    pub fn builtin() -> Self {
        let mut responder = Self::empty(DEFAULT_REPLY);
        responder.push_rule(ResponseRule::keywords(
            "math",
            &["quadratic", "द्विघात"],
            QUADRATIC_REPLY,
        ));
        responder.push_rule(ResponseRule::keywords(
            "science",
            &["photosynthesis", "प्रकाश संश्लेषण"],
            PHOTOSYNTHESIS_REPLY,
        ));
        responder
    }

    /// Responder with the mobile app's subject rules
    ///
    /// Keywords match case-sensitively and every reply is the same Hindi text
    /// whatever the locale.
    pub fn mobile() -> Self {
        let mut responder = Self::empty(MOBILE_DEFAULT_REPLY);
        responder.push_rule(ResponseRule::contains_any(
            "math",
            &["गणित", "समीकरण"],
            MOBILE_MATH_REPLY,
        ));
        responder.push_rule(ResponseRule::contains_any(
            "science",
            &["विज्ञान", "प्रकाश"],
            MOBILE_SCIENCE_REPLY,
        ));
        responder.push_rule(ResponseRule::contains_any(
            "coding",
            &["कोडिंग", "Python"],
            MOBILE_CODING_REPLY,
        ));
        responder.push_rule(ResponseRule::contains_any(
            "english",
            &["अंग्रेजी", "grammar"],
            MOBILE_ENGLISH_REPLY,
        ));
        responder
    }

    /// Append a rule after the existing ones
    pub fn push_rule(&mut self, rule: ResponseRule) {
        self.rules.push(rule);
    }

    /// Name of the first matching rule
    pub fn matched_rule(&self, message: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(message))
            .map(ResponseRule::name)
    }

    pub fn respond(&self, message: &str, locale: Locale) -> String {
        let reply = self
            .rules
            .iter()
            .find(|rule| rule.matches(message))
            .map(|rule| rule.reply)
            .unwrap_or(self.default);
        reply.render(locale)
    }
}

/// Translate one of the common greeting phrases, returning other text unchanged
pub fn translate_phrase(text: &str, target: Locale) -> String {
    let hindi = match text {
        "Hello" => Some("नमस्ते"),
        "Thank you" => Some("धन्यवाद"),
        "Good morning" => Some("सुप्रभात"),
        _ => None,
    };
    match (target, hindi) {
        (Locale::Hi, Some(translated)) => translated.to_string(),
        _ => text.to_string(),
    }
}

/// Canned bilingual explanation for code in `language`
pub fn explain_code(language: &str) -> &'static str {
    match language {
        "python" => "यह Python कोड एक सरल प्रोग्राम है जो वेरिएबल्स का उपयोग करता है।\n\nThis Python code is a simple program that uses variables.",
        "javascript" => "यह JavaScript कोड वेब डेवलपमेंट के लिए उपयोग किया जाता है।\n\nThis JavaScript code is used for web development.",
        _ => "कोड की व्याख्या उपलब्ध नहीं है।\n\nCode explanation not available.",
    }
}

/// Who wrote a chat entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Tutor,
}

/// One line of the displayed conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub text: String,
    pub locale: Locale,
    /// True when the reply came from the local rules instead of the backend
    pub fallback: bool,
    pub timestamp: DateTime<Utc>,
}

/// A tutor conversation
pub struct TutorSession {
    backend: Option<Box<dyn ChatBackend>>,
    responder: TutorResponder,
    history: Vec<ChatEntry>,
}

impl Default for TutorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TutorSession {
    /// Session answering from the built-in rules only
    pub fn new() -> Self {
        Self {
            backend: None,
            responder: TutorResponder::builtin(),
            history: Vec::new(),
        }
    }

    /// Session that asks `backend` first
    pub fn with_backend(backend: Box<dyn ChatBackend>) -> Self {
        Self {
            backend: Some(backend),
            ..Self::new()
        }
    }

    pub fn with_responder(mut self, responder: TutorResponder) -> Self {
        self.responder = responder;
        self
    }

    /// Ask a question and return the tutor's reply
    ///
    /// Blank messages are ignored.
    pub fn ask(&mut self, message: &str, locale: Locale) -> Option<&ChatEntry> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }

        self.history.push(ChatEntry {
            role: ChatRole::User,
            text: message.to_string(),
            locale,
            fallback: false,
            timestamp: Utc::now(),
        });

        let (text, fallback) = match &self.backend {
            Some(backend) => match backend.respond(message, locale) {
                Ok(text) => (text, false),
                Err(e) => {
                    warn!(error = %e, "chat backend failed, using local replies");
                    (self.responder.respond(message, locale), true)
                }
            },
            None => {
                debug!("no chat backend configured, using local replies");
                (self.responder.respond(message, locale), true)
            }
        };

        self.history.push(ChatEntry {
            role: ChatRole::Tutor,
            text,
            locale,
            fallback,
            timestamp: Utc::now(),
        });
        self.history.last()
    }

    pub fn history(&self) -> &[ChatEntry] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hi(reply: Reply) -> &'static str {
        match reply {
            Reply::Bilingual { hi, .. } => hi,
            Reply::Fixed(text) => text,
        }
    }

    fn en(reply: Reply) -> &'static str {
        match reply {
            Reply::Bilingual { en, .. } => en,
            Reply::Fixed(text) => text,
        }
    }

    struct FixedBackend(Result<&'static str, ()>);

    impl ChatBackend for FixedBackend {
        fn respond(&self, _message: &str, _locale: Locale) -> Result<String, SetuError> {
            self.0
                .map(str::to_string)
                .map_err(|_| SetuError::RemoteServiceUnavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_keyword_rules_in_english() {
        let responder = TutorResponder::builtin();
        assert_eq!(
            responder.respond("How do I solve a QUADRATIC equation?", Locale::En),
            en(QUADRATIC_REPLY)
        );
        assert_eq!(
            responder.respond("What is photosynthesis?", Locale::En),
            en(PHOTOSYNTHESIS_REPLY)
        );
    }

    #[test]
    fn test_keyword_rules_in_hindi() {
        let responder = TutorResponder::builtin();
        let reply = responder.respond("द्विघात समीकरण कैसे हल करें?", Locale::Hi);
        assert!(reply.starts_with(hi(QUADRATIC_REPLY)));
        assert!(reply.ends_with(en(QUADRATIC_REPLY)));
        assert!(reply.contains("\n\n"));
    }

    #[test]
    fn test_default_reply() {
        let responder = TutorResponder::builtin();
        assert_eq!(responder.matched_rule("History of India"), None);
        assert_eq!(responder.respond("History of India", Locale::En), en(DEFAULT_REPLY));
        assert_eq!(responder.respond("History of India", Locale::Pa), en(DEFAULT_REPLY));
    }

    #[test]
    fn test_first_match_wins() {
        let responder = TutorResponder::builtin();
        assert_eq!(
            responder.matched_rule("quadratic photosynthesis"),
            Some("math")
        );
    }

    #[test]
    fn test_custom_rule_appended() {
        let mut responder = TutorResponder::empty(DEFAULT_REPLY);
        let grammar = Reply::Bilingual {
            hi: "व्याकरण",
            en: "Grammar",
        };
        responder.push_rule(ResponseRule::new(
            "grammar",
            |m: &str| m.starts_with("grammar"),
            grammar,
        ));
        assert_eq!(responder.respond("grammar rules", Locale::En), "Grammar");
        assert_eq!(responder.respond("rules of grammar", Locale::En), en(DEFAULT_REPLY));
    }

    #[test]
    fn test_mobile_rules_cover_each_subject() {
        let responder = TutorResponder::mobile();
        assert_eq!(responder.matched_rule("गणित का सवाल"), Some("math"));
        assert_eq!(responder.matched_rule("यह समीकरण हल करें"), Some("math"));
        assert_eq!(responder.matched_rule("विज्ञान क्या है"), Some("science"));
        assert_eq!(responder.matched_rule("प्रकाश संश्लेषण"), Some("science"));
        assert_eq!(responder.matched_rule("Python loop"), Some("coding"));
        assert_eq!(responder.matched_rule("कोडिंग सीखनी है"), Some("coding"));
        assert_eq!(responder.matched_rule("grammar rules"), Some("english"));
        assert_eq!(responder.matched_rule("अंग्रेजी व्याकरण"), Some("english"));
        assert_eq!(responder.matched_rule("इतिहास"), None);
    }

    #[test]
    fn test_mobile_rules_first_match_wins() {
        let responder = TutorResponder::mobile();
        assert_eq!(responder.matched_rule("गणित और विज्ञान"), Some("math"));
        assert_eq!(responder.matched_rule("Python grammar"), Some("coding"));
        assert_eq!(responder.matched_rule("प्रकाश और Python"), Some("science"));
    }

    #[test]
    fn test_mobile_rules_are_case_sensitive() {
        let responder = TutorResponder::mobile();
        assert_eq!(responder.matched_rule("python loop"), None);
        assert_eq!(responder.matched_rule("GRAMMAR"), None);
    }

    #[test]
    fn test_mobile_replies_ignore_locale() {
        let responder = TutorResponder::mobile();
        let en_reply = responder.respond("Python", Locale::En);
        assert_eq!(en_reply, responder.respond("Python", Locale::Hi));
        assert!(en_reply.starts_with("Python में loop"));
        assert_eq!(
            responder.respond("History", Locale::En),
            en(MOBILE_DEFAULT_REPLY)
        );
    }

    #[test]
    fn test_translate_phrase() {
        assert_eq!(translate_phrase("Hello", Locale::Hi), "नमस्ते");
        assert_eq!(translate_phrase("Hello", Locale::En), "Hello");
        assert_eq!(translate_phrase("Good night", Locale::Hi), "Good night");
    }

    #[test]
    fn test_explain_code() {
        assert!(explain_code("python").contains("Python"));
        assert!(explain_code("rust").ends_with("Code explanation not available."));
    }

    #[test]
    fn test_session_without_backend_is_fallback() {
        let mut session = TutorSession::new();
        let reply = session.ask("photosynthesis?", Locale::En).unwrap();
        assert!(reply.fallback);
        assert_eq!(reply.role, ChatRole::Tutor);
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].role, ChatRole::User);
    }

    #[test]
    fn test_session_uses_backend() {
        let mut session = TutorSession::with_backend(Box::new(FixedBackend(Ok("remote answer"))));
        let reply = session.ask("anything", Locale::En).unwrap();
        assert!(!reply.fallback);
        assert_eq!(reply.text, "remote answer");
    }

    #[test]
    fn test_session_falls_back_on_backend_error() {
        let mut session = TutorSession::with_backend(Box::new(FixedBackend(Err(()))));
        let reply = session.ask("quadratic", Locale::Hi).unwrap();
        assert!(reply.fallback);
        assert!(reply.text.starts_with(hi(QUADRATIC_REPLY)));
    }

    #[test]
    fn test_blank_message_ignored() {
        let mut session = TutorSession::new();
        assert!(session.ask("   ", Locale::En).is_none());
        assert!(session.history().is_empty());
    }
}
