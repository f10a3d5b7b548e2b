use fakeynews_shared::Label;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: Label,
    pub confidence: f64,
}

/// Anything able to put a label on a piece of news text.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Prediction;
}

/// Placeholder model: flags any text mentioning the keyword, case-insensitively.
///
/// The confidences are fixed per label, not derived from the input.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub const KEYWORD: &'static str = "fake";
    pub const FAKE_CONFIDENCE: f64 = 0.95;
    pub const REAL_CONFIDENCE: f64 = 0.90;

    pub fn new() -> Self {
        Self
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Prediction {
        if text.to_lowercase().contains(Self::KEYWORD) {
            Prediction {
                label: Label::Fake,
                confidence: Self::FAKE_CONFIDENCE,
            }
        } else {
            Prediction {
                label: Label::Real,
                confidence: Self::REAL_CONFIDENCE,
            }
        }
    }
}
