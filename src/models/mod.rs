//! Data models for sitesearch.

mod credential;
mod submission;
mod website;

pub use credential::{Credential, DEFAULT_FREQUENCY_LIMIT};
pub use submission::{BadUrl, Feedback, NewBadUrl, NewFeedback, SubmissionError};
pub use website::Website;
