use std::string::FromUtf8Error;

/// Reasons the predict endpoint could not settle on a piece of text.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Please provide either 'text' or 'file'.")]
    MissingInput,
    #[error("OCR processing failed: {0}")]
    DecodeFailure(String),
    #[error("OCR processing failed: {0}")]
    OcrFailure(String),
    #[error("OCR did not extract any text. Try a clearer image.")]
    EmptyOcrResult,
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("tesseract is not installed or it's not in your PATH ({0})")]
    NotInstalled(String),
    #[error("I/O error talking to tesseract: {0}")]
    Io(#[from] std::io::Error),
    #[error("tesseract exited with {status}: {stderr}")]
    Engine { status: String, stderr: String },
    #[error("Failed to encode image for OCR: {0}")]
    Encode(#[from] image::ImageError),
    #[error("tesseract produced invalid UTF-8: {0}")]
    InvalidOutput(#[from] FromUtf8Error),
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Invalid form payload: {0}")]
    Payload(String),
    #[error("Field 'text' must be valid UTF-8")]
    InvalidText,
    #[error("File too large (limit is {limit} bytes)")]
    UploadTooLarge { limit: usize },
    #[error("Field 'text' too long (limit is {limit} bytes)")]
    TextTooLarge { limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
