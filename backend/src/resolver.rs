use std::sync::Arc;

use crate::error::ResolveError;
use crate::ocr::{TextExtractor, decode_image};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Direct,
    Ocr,
}

/// The text that will be handed to the classifier, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedText {
    pub text: String,
    pub source: TextSource,
}

/// Picks the text to classify from a request's `text` field or its uploaded image.
#[derive(Clone)]
pub struct InputResolver {
    extractor: Arc<dyn TextExtractor>,
}

impl InputResolver {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self { extractor }
    }

    /// Direct text wins over an image. Empty values count as absent.
    pub fn resolve(
        &self,
        text: Option<&str>,
        image: Option<&[u8]>,
    ) -> Result<ResolvedText, ResolveError> {
        let text = text.filter(|t| !t.is_empty());
        let image = image.filter(|bytes| !bytes.is_empty());

        match (text, image) {
            (None, None) => Err(ResolveError::MissingInput),
            (Some(text), image) => {
                if image.is_some() {
                    log::debug!("Both text and file supplied, ignoring the file");
                }
                Ok(ResolvedText {
                    text: text.to_string(),
                    source: TextSource::Direct,
                })
            }
            (None, Some(bytes)) => self.extract(bytes),
        }
    }

    fn extract(&self, bytes: &[u8]) -> Result<ResolvedText, ResolveError> {
        let image =
            decode_image(bytes).map_err(|e| ResolveError::DecodeFailure(e.to_string()))?;

        let text = self
            .extractor
            .extract_text(&image)
            .map_err(|e| ResolveError::OcrFailure(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(ResolveError::EmptyOcrResult);
        }

        Ok(ResolvedText {
            text,
            source: TextSource::Ocr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned {
        output: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    impl Canned {
        fn text(output: &'static str) -> Arc<Self> {
            Arc::new(Self {
                output: Ok(output),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(stderr: &'static str) -> Arc<Self> {
            Arc::new(Self {
                output: Err(stderr),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl TextExtractor for Canned {
        fn extract_text(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.output {
                Ok(text) => Ok(text.to_string()),
                Err(stderr) => Err(OcrError::Engine {
                    status: "exit status: 1".to_string(),
                    stderr: stderr.to_string(),
                }),
            }
        }
    }

    fn png() -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(8, 8))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn nothing_supplied_is_missing_input() {
        let resolver = InputResolver::new(Canned::text("unused"));
        assert!(matches!(
            resolver.resolve(None, None),
            Err(ResolveError::MissingInput)
        ));
        assert!(matches!(
            resolver.resolve(Some(""), Some(&[][..])),
            Err(ResolveError::MissingInput)
        ));
    }

    #[test]
    fn text_takes_precedence_over_image() {
        let ocr = Canned::text("from the image");
        let resolver = InputResolver::new(ocr.clone());

        let resolved = resolver
            .resolve(Some("Breaking fake news"), Some(png().as_slice()))
            .unwrap();

        assert_eq!(resolved.text, "Breaking fake news");
        assert_eq!(resolved.source, TextSource::Direct);
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn whitespace_direct_text_is_passed_through() {
        let resolver = InputResolver::new(Canned::text("unused"));
        let resolved = resolver.resolve(Some("   "), None).unwrap();
        assert_eq!(resolved.text, "   ");
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let ocr = Canned::text("unused");
        let resolver = InputResolver::new(ocr.clone());
        let err = resolver.resolve(None, Some(&b"not an image"[..])).unwrap_err();
        assert!(matches!(err, ResolveError::DecodeFailure(_)));
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn engine_failure_is_ocr_failure() {
        let resolver = InputResolver::new(Canned::failing("Failed loading language 'xyz'"));
        let err = resolver.resolve(None, Some(png().as_slice())).unwrap_err();
        assert!(matches!(err, ResolveError::OcrFailure(ref msg) if msg.contains("xyz")));
    }

    #[test]
    fn blank_ocr_output_is_rejected() {
        let resolver = InputResolver::new(Canned::text(" \n\t\n"));
        let err = resolver.resolve(None, Some(png().as_slice())).unwrap_err();
        assert!(matches!(err, ResolveError::EmptyOcrResult));
        assert_eq!(
            err.to_string(),
            "OCR did not extract any text. Try a clearer image."
        );
    }

    #[test]
    fn ocr_text_is_kept_untrimmed() {
        let resolver = InputResolver::new(Canned::text("  Headline here\n\x0c"));
        let resolved = resolver.resolve(Some(""), Some(png().as_slice())).unwrap();
        assert_eq!(resolved.text, "  Headline here\n\x0c");
        assert_eq!(resolved.source, TextSource::Ocr);
    }
}
