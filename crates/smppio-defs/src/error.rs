/// Errors that can occur when registering descriptors.
#[derive(Debug, thiserror::Error)]
pub enum DefsError {
    /// A command descriptor must carry a non-zero identifier.
    #[error("command {0:?} has a zero identifier")]
    ZeroCommandId(String),

    /// An empty name cannot be dispatched.
    #[error("descriptor name is empty")]
    EmptyName,
}

pub type Result<T> = std::result::Result<T, DefsError>;
