//! Static translation catalog

use crate::error::SetuError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Supported locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Hi,
    Pa,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Hi, Locale::Pa];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Hi => "hi",
            Locale::Pa => "pa",
        }
    }

    /// Name of the language in its own script
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Hi => "हिंदी",
            Locale::Pa => "ਪੰਜਾਬੀ",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "hi" => Some(Locale::Hi),
            "pa" => Some(Locale::Pa),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = SetuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_code(s).ok_or_else(|| SetuError::UnsupportedLocale(s.to_string()))
    }
}

const EN: &[(&str, &str)] = &[
    // Auth
    ("login", "Login"),
    ("register", "Register"),
    ("email", "Email"),
    ("password", "Password"),
    ("fullName", "Full Name"),
    ("loginButton", "Login"),
    ("registerButton", "Create Account"),
    ("switchToRegister", "Create new account"),
    ("switchToLogin", "Already have account? Login"),
    // Navigation
    ("home", "Home"),
    ("classroom", "Classroom"),
    ("aiTutor", "AI Tutor"),
    ("codeLab", "Code Lab"),
    ("profile", "Profile"),
    // Home
    ("greeting", "Hello"),
    ("subtitle", "What would you like to learn today?"),
    ("virtualClassroom", "Virtual Classroom"),
    ("joinLiveClasses", "Join live classes"),
    ("aiTeacher", "AI Teacher"),
    ("askQuestions", "Ask questions instantly"),
    ("coding", "Coding"),
    ("learnProgramming", "Learn programming"),
    ("tests", "Tests"),
    ("takeOnlineTests", "Take online tests"),
    // Tutor
    ("aiTutorTitle", "AI Teacher"),
    ("askQuestion", "Ask your question here..."),
    ("quickQuestions", "Quick Questions:"),
    // Code lab
    ("codeLabTitle", "Code Lab"),
    ("runCode", "Run Code"),
    // Profile
    ("student", "Student"),
    ("teacher", "Teacher"),
    ("logout", "Logout"),
    ("settings", "Settings"),
    ("language", "Language"),
    // App
    ("appName", "Shiksha Setu"),
    ("appSubtitle", "Digital Learning Platform"),
];

const HI: &[(&str, &str)] = &[
    ("login", "लॉगिन करें"),
    ("register", "नया खाता बनाएं"),
    ("email", "ईमेल"),
    ("password", "पासवर्ड"),
    ("fullName", "पूरा नाम"),
    ("loginButton", "लॉगिन करें"),
    ("registerButton", "खाता बनाएं"),
    ("switchToRegister", "नया खाता बनाएं"),
    ("switchToLogin", "पहले से खाता है? लॉगिन करें"),
    ("home", "होम"),
    ("classroom", "कक्षा"),
    ("aiTutor", "AI शिक्षक"),
    ("codeLab", "कोड लैब"),
    ("profile", "प्रोफाइल"),
    ("greeting", "नमस्ते"),
    ("subtitle", "आज क्या सीखना चाहते हैं?"),
    ("virtualClassroom", "वर्चुअल क्लासरूम"),
    ("joinLiveClasses", "लाइव कक्षाओं में भाग लें"),
    ("aiTeacher", "AI शिक्षक"),
    ("askQuestions", "तुरंत सवाल पूछें"),
    ("coding", "कोडिंग"),
    ("learnProgramming", "प्रोग्रामिंग सीखें"),
    ("tests", "परीक्षा"),
    ("takeOnlineTests", "ऑनलाइन टेस्ट दें"),
    ("aiTutorTitle", "AI शिक्षक"),
    ("askQuestion", "अपना सवाल यहाँ लिखें..."),
    ("quickQuestions", "त्वरित सवाल:"),
    ("codeLabTitle", "कोड लैब"),
    ("runCode", "कोड चलाएं"),
    ("student", "छात्र"),
    ("teacher", "शिक्षक"),
    ("logout", "लॉगआउट"),
    ("settings", "सेटिंग्स"),
    ("language", "भाषा"),
    ("appName", "शिक्षा सेतु"),
    ("appSubtitle", "Digital Learning Platform"),
];

lazy_static! {
    static ref CATALOG: HashMap<Locale, HashMap<&'static str, &'static str>> = {
        let mut catalog = HashMap::new();
        catalog.insert(Locale::En, EN.iter().copied().collect());
        catalog.insert(Locale::Hi, HI.iter().copied().collect());
        catalog
    };
}

/// Look up `key` for `locale`, falling back to the key itself
pub fn translate<'a>(key: &'a str, locale: Locale) -> &'a str {
    CATALOG
        .get(&locale)
        .and_then(|table| table.get(key))
        .copied()
        .filter(|value| !value.is_empty())
        .unwrap_or(key)
}

/// Keys known to the catalog for `locale`
pub fn keys(locale: Locale) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = CATALOG
        .get(&locale)
        .map(|table| table.keys().copied().collect())
        .unwrap_or_default();
    keys.sort_unstable();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_translate_known_keys() {
        assert_eq!(translate("greeting", Locale::En), "Hello");
        assert_eq!(translate("greeting", Locale::Hi), "नमस्ते");
        assert_eq!(translate("appName", Locale::Hi), "शिक्षा सेतु");
    }

    #[test]
    fn test_unknown_key_returns_key() {
        for locale in Locale::ALL {
            assert_eq!(translate("noSuchKey", locale), "noSuchKey");
        }
    }

    #[test]
    fn test_locale_without_table_returns_key() {
        assert_eq!(translate("greeting", Locale::Pa), "greeting");
    }

    #[test]
    fn test_tables_cover_same_keys() {
        assert_eq!(keys(Locale::En), keys(Locale::Hi));
        assert!(keys(Locale::Pa).is_empty());
    }

    #[test]
    fn test_locale_codes() {
        assert_eq!("HI".parse::<Locale>().unwrap(), Locale::Hi);
        assert_eq!(Locale::from_code(" en "), Some(Locale::En));
        assert!(matches!(
            "fr".parse::<Locale>(),
            Err(SetuError::UnsupportedLocale(_))
        ));
        assert_eq!(Locale::Pa.to_string(), "pa");
        assert_eq!(serde_json::to_string(&Locale::Hi).unwrap(), r#""hi""#);
    }
}
