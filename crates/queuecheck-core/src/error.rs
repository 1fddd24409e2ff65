use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueCheckError {
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(std::path::PathBuf),

    #[error("invalid policy for status '{status}': {reason}")]
    InvalidPolicy { status: String, reason: String },

    #[error("invalid team '{team}': {reason}")]
    InvalidTeam { team: String, reason: String },

    #[error("no queues configured")]
    NoQueues,

    #[error("ticket {ticket}: missing field '{field}'")]
    MissingField { ticket: String, field: &'static str },

    #[error("ticket {ticket}: cannot parse {field} '{value}': {source}")]
    TimeParse {
        ticket: String,
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("ticket {ticket}: deadline is outside the supported date range")]
    DeadlineOutOfRange { ticket: String },

    #[error("ticket {ticket}: history has no non-empty line")]
    HistoryEmpty { ticket: String },

    #[error("batch has {tickets} tickets but {histories} histories")]
    BatchLengthMismatch { tickets: usize, histories: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl QueueCheckError {
    /// Errors scoped to a single ticket. These never abort a batch.
    pub fn is_per_ticket(&self) -> bool {
        matches!(
            self,
            QueueCheckError::MissingField { .. }
                | QueueCheckError::TimeParse { .. }
                | QueueCheckError::DeadlineOutOfRange { .. }
                | QueueCheckError::HistoryEmpty { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, QueueCheckError>;
