use thiserror::Error;

/// Failures detected while attaching to the host runtime.
///
/// These are fatal by design: the plugin cannot function without the host
/// surfaces it probes for at load time, so callers should surface the error
/// to the user and abort initialization.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host runtime is missing required capability `{0}`")]
    MissingCapability(&'static str),
}

/// Failures raised by scene block operations.
///
/// Everything here is recoverable from the caller's point of view: the block
/// simply reports the problem and the stage keeps running.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("no object named `{0}` in the scene")]
    UnknownObject(String),

    #[error("no stored file named `{0}`")]
    UnknownFile(String),

    #[error("unsupported mesh file extension `{0}`")]
    UnsupportedFormat(String),

    #[error("an object named `{0}` already exists")]
    DuplicateObject(String),

    #[error("scene engine: {0}")]
    Engine(String),
}
