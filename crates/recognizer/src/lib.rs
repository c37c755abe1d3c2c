//! Receipt recognition.
//!
//! A [`Recognizer`] turns the photo of a receipt into tabular rows and the
//! grand total printed on it. The engine never calls a recognizer itself: the
//! caller awaits one recognition per uploaded photo and feeds the result to
//! [`RecognizedReceipt::into_receipt`]. There are no partial results, a
//! recognition either yields a whole receipt or a [`RecognitionError`].

use std::{future::Future, pin::Pin};

use engine::{EngineError, IdAllocator, MoneyCents, Receipt, ReceiptRow};
use thiserror::Error;

pub use gemini::{GeminiRecognizer, GeminiRecognizerBuilder};

mod gemini;
mod parsing;

/// Boxed future returned by [`Recognizer::recognize`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Converts receipt photos into receipt data.
pub trait Recognizer: Send + Sync {
    /// Reads the receipt in `image` (raw PNG, JPEG or WEBP bytes).
    fn recognize<'a>(
        &'a self,
        image: &'a [u8],
    ) -> BoxFuture<'a, Result<RecognizedReceipt, RecognitionError>>;
}

/// What a recognizer read from a photo, not yet validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognizedReceipt {
    pub rows: Vec<ReceiptRow>,
    pub total: MoneyCents,
}

impl RecognizedReceipt {
    /// Validates the rows and builds a [`Receipt`] with fresh item ids.
    pub fn into_receipt(self, ids: &IdAllocator) -> Result<Receipt, EngineError> {
        Receipt::from_rows(ids, self.rows, self.total)
    }
}

/// Recognition errors.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("no API key has been set for the recognizer")]
    MissingApiKey,
    #[error("unsupported image format (expected PNG, JPEG or WEBP)")]
    UnsupportedImage,
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("recognizer API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("recognizer returned no text")]
    EmptyResponse,
    #[error("unable to parse recognizer response: {0}")]
    MalformedResponse(String),
}

/// MIME type of an image, sniffed from its magic bytes.
pub fn image_mime_type(image: &[u8]) -> Result<&'static str, RecognitionError> {
    if image.starts_with(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]) {
        Ok("image/png")
    } else if image.starts_with(&[0xff, 0xd8, 0xff]) {
        Ok("image/jpeg")
    } else if image.len() >= 12 && &image[0..4] == b"RIFF" && &image[8..12] == b"WEBP" {
        Ok("image/webp")
    } else {
        Err(RecognitionError::UnsupportedImage)
    }
}
