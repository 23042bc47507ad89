use thiserror::Error;

/// Failures of the hosted engine. The drain itself cannot fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("ring capacity must be at least 2 bytes, got {0}")]
    InvalidCapacity(usize),

    #[error("drain tick must be greater than zero")]
    InvalidTick,

    #[error("transfer channel writer already taken")]
    WriterTaken,

    #[error("line receiver thread panicked")]
    ReceiverPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
