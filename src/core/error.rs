use std::fmt;
use std::io;
use thiserror::Error;

/// Raw status code returned by an external collaborator (storage driver or
/// security module). Zero means success on the wire, so a `StatusCode` is
/// only ever constructed for failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub i32);

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Stage of the hardware-gated session that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    CreateAccessor,
    Initialize,
    KeyExchange,
    Decrypt,
    Exit,
    DestroyAccessor,
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStage::CreateAccessor => "create accessor",
            SessionStage::Initialize => "initialize",
            SessionStage::KeyExchange => "key exchange",
            SessionStage::Decrypt => "decrypt",
            SessionStage::Exit => "exit",
            SessionStage::DestroyAccessor => "destroy accessor",
        };
        f.write_str(name)
    }
}

/// Errors produced by sector inputs and their backends
#[derive(Error, Debug)]
pub enum InputError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Incorrect sector size: expected {expected}, device reports {actual}")]
    SectorSizeMismatch { expected: u32, actual: u32 },

    #[error("Device {operation} failed with status {status}")]
    Device {
        operation: &'static str,
        status: StatusCode,
    },

    #[error("Security module {stage} failed with status {status}")]
    SecurityModule {
        stage: SessionStage,
        status: StatusCode,
    },

    #[error("Handle is not authenticated")]
    NotAuthenticated,

    #[error("Invalid buffer size: expected at least {expected}, got {actual}")]
    InvalidBufferSize { expected: usize, actual: usize },

    #[error("Read at sector {sector} failed: {message}")]
    ReadFailed { sector: u32, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl InputError {
    /// Maps an `io::Error` raised while opening `target` onto the open-failure
    /// taxonomy.
    pub fn from_open(target: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => InputError::NotFound(target.to_string()),
            io::ErrorKind::PermissionDenied => {
                InputError::PermissionDenied(format!("{} - try running with sudo", target))
            }
            _ => InputError::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, InputError>;
