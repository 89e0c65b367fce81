//! Error types for the host-side core.

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the workspace model, the owner context and the query engine.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No project with the given name is loaded.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// The project exists but is closed.
    #[error("Project is closed: {0}")]
    ProjectClosed(String),

    /// A fully-qualified name did not have the `Type.Name` form.
    #[error("Invalid FQN: {0}")]
    InvalidFqn(String),

    /// The owner execution context is no longer accepting work.
    #[error("Owner context is not running")]
    OwnerGone,

    /// A job panicked while running on the owner execution context.
    #[error("Owner job panicked: {0}")]
    OwnerPanicked(String),

    /// A validation resource was used before query text was loaded into it.
    #[error("Resource {0} has no content loaded")]
    ResourceNotLoaded(String),

    /// Reading workspace files failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A project descriptor could not be parsed.
    #[error("Failed to parse {path}: {source}")]
    ProjectFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Directory traversal failed while discovering projects.
    #[error("Workspace scan failed: {0}")]
    Walk(#[from] walkdir::Error),
}
