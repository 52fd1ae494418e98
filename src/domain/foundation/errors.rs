//! Error types shared across the domain layer and port boundaries.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' exceeds {max} characters")]
    TooLong { field: String, max: usize },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates a too-long validation error.
    pub fn too_long(field: impl Into<String>, max: usize) -> Self {
        ValidationError::TooLong {
            field: field.into(),
            max,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    ProjectNotFound,
    RoleNotFound,
    ReviewTopicNotFound,
    PeerReviewNotFound,
    MilestoneNotFound,

    // State errors
    OperationNotSupported,

    // Invariant errors
    InsufficientRoles,
    UnassignedRoles,
    UserAlreadyAssigned,
    SelfPeerReview,
    PeerReviewsAlreadySubmitted,
    PeerReviewSubmissionMismatch,
    NoReviewTopics,
    ScoreRejected,
    DuplicateEntity,

    // Concurrency errors
    VersionConflict,

    // Infrastructure / defect errors
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::ProjectNotFound => "PROJECT_NOT_FOUND",
            ErrorCode::RoleNotFound => "ROLE_NOT_FOUND",
            ErrorCode::ReviewTopicNotFound => "REVIEW_TOPIC_NOT_FOUND",
            ErrorCode::PeerReviewNotFound => "PEER_REVIEW_NOT_FOUND",
            ErrorCode::MilestoneNotFound => "MILESTONE_NOT_FOUND",
            ErrorCode::OperationNotSupported => "OPERATION_NOT_SUPPORTED",
            ErrorCode::InsufficientRoles => "INSUFFICIENT_ROLES",
            ErrorCode::UnassignedRoles => "UNASSIGNED_ROLES",
            ErrorCode::UserAlreadyAssigned => "USER_ALREADY_ASSIGNED",
            ErrorCode::SelfPeerReview => "SELF_PEER_REVIEW",
            ErrorCode::PeerReviewsAlreadySubmitted => "PEER_REVIEWS_ALREADY_SUBMITTED",
            ErrorCode::PeerReviewSubmissionMismatch => "PEER_REVIEW_SUBMISSION_MISMATCH",
            ErrorCode::NoReviewTopics => "NO_REVIEW_TOPICS",
            ErrorCode::ScoreRejected => "SCORE_REJECTED",
            ErrorCode::DuplicateEntity => "DUPLICATE_ENTITY",
            ErrorCode::VersionConflict => "VERSION_CONFLICT",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// This is the currency at port boundaries; richer aggregate errors convert into it.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::new(ErrorCode::ValidationFailed, err.to_string())
    }
}
