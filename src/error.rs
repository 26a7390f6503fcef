/// Raised by the scheduler for ratings outside the fixed quality scale.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SrsError {
    #[error("Invalid SRS quality value: {0} (expected one of 0, 2, 4, 5)")]
    InvalidQuality(u8),
}

/// Caller-contract violations against a [`crate::session::Session`].
///
/// Empty collections, empty filters and an exhausted queue are not errors;
/// they show up through `Option`s and the status report instead.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Duplicate card uid '{0}' in loaded collection")]
    DuplicateUid(String),

    #[error("No card under the cursor to rate")]
    NoCurrentCard,

    #[error("Ratings can only be submitted in review mode")]
    NotReviewing,

    #[error("No card with uid '{0}' in the collection")]
    UnknownCard(String),
}
