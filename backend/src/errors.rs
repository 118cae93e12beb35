use thiserror::Error;
use uuid::Uuid;

/// Enumerates high-level errors returned by this library.
///
/// Failures come in two kinds: *validation* failures are raised by
/// application-level checks before any persistence attempt, while
/// *integrity* failures are raised by the storage layer when a
/// uniqueness or foreign-key constraint is violated. Callers can tell
/// them apart with [`BackendError::is_validation`] and
/// [`BackendError::is_integrity`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a record submission with a missing or empty field.
    #[error("All fields (name, owner, course, record, price) must be provided.")]
    PartsMissing,

    /// Represents a record submission whose (name, owner) pair is
    /// already in use, caught by the application-level pre-check.
    #[error("A record with the same name and owner already exists.")]
    NameAlreadyExists,

    /// Represents a price that is not a non-negative number.
    #[error("Price must be a valid float or integer.")]
    InvalidPrice,

    /// Represents an audio upload with a disallowed file extension.
    #[error("Invalid audio file format. Supported formats: .mp3, .wav, .ogg")]
    InvalidAudioFormat,

    /// Represents a birth date that does not parse as an ISO date.
    #[error("Invalid birth date format, Please use the format YYYY-MM-DD.")]
    InvalidBirthDate,

    /// Represents a profile picture with a disallowed file extension.
    #[error("Invalid picture format, Please upload a JPEG or PNG image.")]
    InvalidPictureFormat,

    /// Represents the combined messages of an accumulating validation
    /// pass, newline-separated.
    #[error("{0}")]
    InvalidFields(String),

    /// Represents a violation of the accounts' username uniqueness
    /// constraint.
    #[error("an account with this username already exists")]
    UsernameTaken,

    /// Represents a violation of the courses' name uniqueness
    /// constraint.
    #[error("a course with this name already exists")]
    CourseNameTaken,

    /// Represents a violation of the records' (name, owner) uniqueness
    /// constraint, surfaced without an application-level pre-check.
    #[error("a record with this name and owner already exists")]
    RecordAlreadyExists,

    /// Represents a record insert referencing a missing student.
    #[error("record owner does not exist")]
    NonExistentOwner,

    /// Represents a record insert referencing a missing course.
    #[error("record course does not exist")]
    NonExistentCourse,

    /// Represents a student insert referencing a missing account.
    #[error("student account does not exist")]
    NonExistentAccount,

    /// Represents an operation on an ID with no matching row.
    #[error("no row found for ID {0}")]
    NonExistentId(Uuid),

    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    /// Represents an error writing a file to the store.
    #[error("unable to save file")]
    SaveFailed { source: std::io::Error },

    /// Represents an error deleting a file from the store.
    #[error("unable to delete file")]
    DeleteFailed { source: std::io::Error },
}

impl BackendError {
    /// Whether this is an application-level rejection raised before
    /// any persistence attempt.
    pub fn is_validation(&self) -> bool {
        use BackendError::*;

        matches!(
            self,
            PartsMissing
                | NameAlreadyExists
                | InvalidPrice
                | InvalidAudioFormat
                | InvalidBirthDate
                | InvalidPictureFormat
                | InvalidFields(_)
        )
    }

    /// Whether this is a storage-layer constraint violation.
    pub fn is_integrity(&self) -> bool {
        use BackendError::*;

        matches!(
            self,
            UsernameTaken
                | CourseNameTaken
                | RecordAlreadyExists
                | NonExistentOwner
                | NonExistentCourse
                | NonExistentAccount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::BackendError;

    #[test]
    fn kinds_are_disjoint() {
        let validation = BackendError::NameAlreadyExists;
        let integrity = BackendError::CourseNameTaken;

        assert!(validation.is_validation() && !validation.is_integrity());
        assert!(integrity.is_integrity() && !integrity.is_validation());
    }

    #[test]
    fn infrastructure_errors_are_neither_kind() {
        let error = BackendError::NonExistentId(uuid::Uuid::new_v4());

        assert!(!error.is_validation());
        assert!(!error.is_integrity());
    }
}
