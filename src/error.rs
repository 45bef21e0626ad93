use indicatif::style::TemplateError;
use thiserror::Error;

pub type GymResult<T> = Result<T, GymError>;

#[derive(Debug, Error)]
pub enum GymError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    System(#[from] SystemError),
}

/// Errors occurring within Agent logic or caused by the decisions an agent submits.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent logic error: {0}")]
    Logic(String),

    #[error("Invalid input to environment: {0}")]
    InvalidInput(String),
}

/// Errors related to tick table loading, shape and alignment.
#[derive(Debug, Error)]
pub enum DataError {
    #[error(
        "Action and observation tables are misaligned: {action} action rows vs {observation} observation rows"
    )]
    RowCountMismatch { action: usize, observation: usize },

    #[error("Symbol {symbol} has {found} ticks, expected {expected} like the first symbol")]
    SymbolLengthMismatch {
        symbol: usize,
        expected: usize,
        found: usize,
    },

    #[error("Table has {found} columns but at least {required} are required: {msg}")]
    InsufficientColumns {
        required: usize,
        found: usize,
        msg: String,
    },

    #[error("Table has {found} rows but at least {required} are required: {msg}")]
    InsufficientRows {
        required: usize,
        found: usize,
        msg: String,
    },

    #[error("Ragged table: row {row} has {found} columns, expected {expected}")]
    RaggedTable {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Missing value in column '{column}' at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Data frame error: {0}")]
    DataFrame(String),
}

/// Errors related to the Gym Environment configuration and execution loop.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Invalid environment state: {0}")]
    InvalidState(String),

    #[error("Missing required configuration option: '{0}'")]
    MissingOption(&'static str),

    #[error("Invalid environment configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid hour band (first: {first}, last: {last}): {msg}")]
    InvalidHourBand { first: u8, last: u8, msg: String },

    #[error("Progress bar error")]
    ProgressBar(#[from] TemplateError),
}

/// Errors related to File I/O and serialization.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read data: {0}")]
    ReadFailed(String),
}

/// Errors related to internal system invariants.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(String),
}
