//! Field checks and the two error-reporting strategies.
//!
//! Record creation is *fail-fast*: each check returns a `Result` and
//! the caller stops at the first failure with `?`. Student profile
//! updates are *collect-all*: every check runs, and [`Accumulator`]
//! joins the failures into a single error. The two policies are
//! deliberate and must not be merged.

use crate::errors::BackendError;
use crate::record::Price;

/// File extensions accepted for audio records, lowercase.
pub(crate) const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".ogg"];

/// File extensions accepted for profile pictures, lowercase.
pub(crate) const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpeg", ".jpg"];

const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Collects the message of every failing check, then reports them all
/// at once.
#[derive(Debug, Default)]
pub struct Accumulator {
    errors: Vec<String>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the error message if the check failed.
    pub fn check(&mut self, result: Result<(), BackendError>) {
        if let Err(error) = result {
            self.errors.push(error.to_string());
        }
    }

    /// Returns `Ok(())` if every check passed, or a single error
    /// joining all collected messages with newlines.
    pub fn finish(self) -> Result<(), BackendError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(BackendError::InvalidFields(self.errors.join("\n")))
        }
    }
}

/// Checks that the price is a number and not negative. Zero is valid.
/// A non-numeric price is rejected even if it would parse as one.
pub fn check_price(price: &Price) -> Result<f64, BackendError> {
    match price {
        Price::Amount(amount) if *amount >= 0.0 => Ok(*amount),
        _ => Err(BackendError::InvalidPrice),
    }
}

/// Checks the filename of an audio upload against [`AUDIO_EXTENSIONS`],
/// case-insensitively.
pub fn check_audio_extension(filename: &str) -> Result<(), BackendError> {
    if has_extension(filename, AUDIO_EXTENSIONS) {
        Ok(())
    } else {
        Err(BackendError::InvalidAudioFormat)
    }
}

/// Checks the filename of a profile picture against
/// [`IMAGE_EXTENSIONS`], case-insensitively.
pub fn check_picture_extension(filename: &str) -> Result<(), BackendError> {
    if has_extension(filename, IMAGE_EXTENSIONS) {
        Ok(())
    } else {
        Err(BackendError::InvalidPictureFormat)
    }
}

/// Checks that a birth date parses as `YYYY-MM-DD`.
pub fn check_birth_date(birth_date: &str) -> Result<(), BackendError> {
    time::Date::parse(birth_date, BIRTH_DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| BackendError::InvalidBirthDate)
}

fn has_extension(filename: &str, extensions: &[&str]) -> bool {
    let lower = filename.to_lowercase();

    extensions.iter().any(|extension| lower.ends_with(extension))
}
