use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Browser not launched")]
    BrowserNotLaunched,

    #[error("Page creation failed: {0}")]
    PageCreationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Timed out after {timeout_ms}ms waiting for {target} to be {state}")]
    Timeout {
        target: String,
        state: String,
        timeout_ms: u64,
    },

    #[error("Click on {selector} was intercepted: {reason}")]
    InteractionBlocked { selector: String, reason: String },

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("JavaScript execution failed: {0}")]
    JavaScriptFailed(String),

    #[error("Dialog error: {0}")]
    Dialog(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chrome error: {0}")]
    Chrome(String),

    #[error("Anyhow error: {0}")]
    Anyhow(String),
}

pub type Result<T> = std::result::Result<T, E2eError>;

// headless_chrome reports everything as anyhow::Error
impl From<anyhow::Error> for E2eError {
    fn from(err: anyhow::Error) -> Self {
        E2eError::Anyhow(err.to_string())
    }
}

impl E2eError {
    pub fn timeout(target: impl Into<String>, state: impl ToString, timeout_ms: u64) -> Self {
        E2eError::Timeout {
            target: target.into(),
            state: state.to_string(),
            timeout_ms,
        }
    }

    pub fn blocked(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        E2eError::InteractionBlocked {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, E2eError::Timeout { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, E2eError::InteractionBlocked { .. })
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, E2eError::Assertion(_))
    }
}
