use fakeynews_shared::PredictResponse;
use std::sync::Arc;
use uuid::Uuid;

use crate::classifier::Classifier;
use crate::error::ResolveError;
use crate::ocr::TextExtractor;
use crate::resolver::InputResolver;
use crate::upload::PredictInput;

/// Resolves a request to text and runs it through the classifier.
#[derive(Clone)]
pub struct PredictionService {
    resolver: InputResolver,
    classifier: Arc<dyn Classifier>,
}

impl PredictionService {
    pub fn new(extractor: Arc<dyn TextExtractor>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            resolver: InputResolver::new(extractor),
            classifier,
        }
    }

    /// Blocks while OCR runs; call from a blocking context.
    pub fn predict(
        &self,
        request_id: Uuid,
        input: PredictInput,
    ) -> Result<PredictResponse, ResolveError> {
        if let Some(file) = &input.file {
            log::debug!(
                "[{}] upload {:?} ({:?}, {} bytes, sha256 {})",
                request_id,
                file.file_name,
                file.content_type,
                file.bytes.len(),
                file.fingerprint()
            );
        }

        let resolved = self.resolver.resolve(
            input.text.as_deref(),
            input.file.as_ref().map(|f| f.bytes.as_slice()),
        )?;
        let prediction = self.classifier.classify(&resolved.text);

        log::info!(
            "[{}] {:?} text ({} chars) classified as {} ({:.2})",
            request_id,
            resolved.source,
            resolved.text.chars().count(),
            prediction.label,
            prediction.confidence
        );

        Ok(PredictResponse {
            prediction: prediction.label,
            confidence: prediction.confidence,
            text_extracted: resolved.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{KeywordClassifier, Prediction};
    use crate::error::OcrError;
    use fakeynews_shared::Label;
    use image::DynamicImage;

    struct NoOcr;

    impl TextExtractor for NoOcr {
        fn extract_text(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            Err(OcrError::NotInstalled("tesseract".into()))
        }
    }

    struct AlwaysReal;

    impl Classifier for AlwaysReal {
        fn classify(&self, _text: &str) -> Prediction {
            Prediction {
                label: Label::Real,
                confidence: 0.5,
            }
        }
    }

    #[test]
    fn direct_text_is_classified_and_echoed() {
        let service = PredictionService::new(Arc::new(NoOcr), Arc::new(KeywordClassifier::new()));
        let input = PredictInput {
            text: Some("this news is fake".into()),
            file: None,
        };

        let response = service.predict(Uuid::new_v4(), input).unwrap();
        assert_eq!(response.prediction, Label::Fake);
        assert_eq!(response.confidence, 0.95);
        assert_eq!(response.text_extracted, "this news is fake");
    }

    #[test]
    fn classifier_is_swappable() {
        let service = PredictionService::new(Arc::new(NoOcr), Arc::new(AlwaysReal));
        let input = PredictInput {
            text: Some("fake fake fake".into()),
            file: None,
        };

        let response = service.predict(Uuid::new_v4(), input).unwrap();
        assert_eq!(response.prediction, Label::Real);
        assert_eq!(response.confidence, 0.5);
    }

    #[test]
    fn resolve_errors_pass_through() {
        let service = PredictionService::new(Arc::new(NoOcr), Arc::new(KeywordClassifier::new()));
        let err = service
            .predict(Uuid::new_v4(), PredictInput::default())
            .unwrap_err();
        assert!(matches!(err, ResolveError::MissingInput));
    }
}
