/// Core error type for the bot.
///
/// Adapter crates map their specific errors into `PollError` / `NotifyError`
/// so the watch loop can report every failure the same way.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("external error: {0}")]
    External(String),
}

/// Failure to fetch homework statuses from the review API.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("unexpected response status from review API: {0}")]
    HttpStatus(u16),

    #[error("failed to decode review API response: {0}")]
    Decode(String),

    #[error("review API request failed: {0}")]
    Transport(String),
}

/// Failure to deliver a message to the operator chat.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("message delivery failed: {0}")]
    Delivery(String),
}

/// A homework record the interpreter refuses to turn into a verdict.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InterpretError {
    #[error("server did not return a homework name")]
    MissingName,

    #[error("server did not return a recognized status")]
    UnrecognizedStatus(Option<String>),
}

pub type Result<T> = std::result::Result<T, Error>;
