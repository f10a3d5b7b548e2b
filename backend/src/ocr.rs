use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::{Cursor, ErrorKind, Write};
use std::process::{Command, Stdio};

use crate::config::OcrConfig;
use crate::error::OcrError;

/// An OCR engine: turns a decoded raster image into text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Decodes an uploaded payload, sniffing the format from its leading bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, image::ImageError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()
}

/// Runs the `tesseract` binary, feeding it a PNG on stdin and reading text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    config: OcrConfig,
}

impl TesseractCli {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn command(&self) -> &str {
        &self.config.command
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.config.lang.clone(),
            "--psm".to_string(),
            self.config.psm.to_string(),
            "--oem".to_string(),
            self.config.oem.to_string(),
        ];
        if let Some(dpi) = self.config.dpi {
            args.push("--dpi".to_string());
            args.push(dpi.to_string());
        }
        args
    }
}

impl TextExtractor for TesseractCli {
    fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut child = Command::new(&self.config.command)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => OcrError::NotInstalled(self.config.command.clone()),
                _ => OcrError::Io(e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // An early exit closes the pipe; stderr below says why.
            if let Err(e) = stdin.write_all(&png) {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(OcrError::Io(e));
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(OcrError::Engine {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        log::debug!(
            "tesseract returned {} bytes of text for a {}x{} image",
            output.stdout.len(),
            image.width(),
            image.height()
        );
        Ok(String::from_utf8(output.stdout)?)
    }
}
