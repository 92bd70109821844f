use thiserror::Error;

/// Failures raised by a `PageDriver` implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Node.js browser server failed to spawn
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing failed on a line read from the browser server
    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization failed for a request
    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the session pipes failed
    #[error("Session I/O error: {0}")]
    SessionIO(String),

    /// The browser server answered with ok=false or an incomplete response
    #[error("Browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    /// No element matched the selector
    #[error("Element '{selector}' not found: {context}")]
    ElementNotFound { selector: String, context: String },

    /// The driver cannot perform the request
    #[error("Unsupported by this driver: {0}")]
    Unsupported(String),
}
