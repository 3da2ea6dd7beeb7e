use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Offset value is missing or invalid")]
    OffsetInvalid,

    #[error("Count value is missing or invalid")]
    CountInvalid,

    #[error("q doesn't match condition - q: {0}")]
    QueryNotMatched(String),

    #[error("Invalid Value - input value: {value}, field: {field}, message: {message}")]
    InvalidValue { field: String, value: String, message: String },

    #[error("Incorrect exposure time")]
    IncorrectExposureTime,

    #[error("Post[{0}] is already deleted")]
    AlreadyDeleted(String),

    #[error("Post[{0}] is not modified")]
    NotModified(String),

    #[error("Post[{0}] does not exist")]
    NoPost(String),

    #[error("Post[{0}], Trace[{1}] does not exist")]
    NoTrace(String, String),

    #[error("Invalid date")]
    InvalidDate,

    #[error("Query error: {0}")]
    Query(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable numeric code reported to clients.
    ///
    /// 4001..=4010 are client-input errors; everything else maps to 500.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::OffsetInvalid => 4001,
            Self::CountInvalid => 4002,
            Self::QueryNotMatched(_) => 4003,
            Self::InvalidValue { .. } => 4004,
            Self::IncorrectExposureTime => 4005,
            Self::AlreadyDeleted(_) => 4006,
            Self::NotModified(_) => 4007,
            Self::NoPost(_) => 4008,
            Self::NoTrace(_, _) => 4009,
            Self::InvalidDate => 4010,
            Self::Query(_) | Self::Store(_) | Self::Cache(_) | Self::Config(_) | Self::Json(_) => {
                500
            }
        }
    }

    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (4001..=4010).contains(&self.code())
    }
}
