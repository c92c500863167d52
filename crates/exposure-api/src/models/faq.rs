use serde::{Deserialize, Serialize};

use super::configuration::UserLanguage;

/// One question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub title: String,
    pub content: String,
}

impl Faq {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Bundled placeholder FAQs shown before the first successful fetch.
    pub fn defaults(language: UserLanguage) -> Vec<Self> {
        let (title, content) = match language {
            UserLanguage::English => ("[EN] Question", "[EN] This is an answer"),
            UserLanguage::Italian => ("[IT] Domanda", "[IT] Questa è una risposta"),
            UserLanguage::German => ("[DE] Frage", "[DE] Das ist eine Antwort"),
        };
        vec![Self::new(title, content)]
    }
}

/// Envelope the FAQ endpoint wraps its list in.
#[derive(Debug, Deserialize)]
pub(crate) struct FaqList {
    pub faqs: Vec<Faq>,
}
