use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

/// Error variants that can occur in mockademy operations.
/// Each variant represents a specific error category with its associated context.
#[derive(Debug)]
pub enum ErrorKind {
    /// Reading or parsing a dataset file failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A lookup by id found no matching record.
    ///
    /// Kept as its own variant so the HTTP layer can report it as 404
    /// instead of treating it like an internal fault.
    NotFound { entity: &'static str, id: String },

    /// Catch-all for other errors with a message
    Message { message: String },
}

/// Error type wrapping ErrorKind with optional context.
/// Implements the standard Error trait and supports context attachment.
#[derive(Debug)]
pub struct MockademyError {
    kind: ErrorKind,
    context: Vec<String>,
}

impl MockademyError {
    /// Creates a new error from an ErrorKind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
        }
    }

    /// Creates a catch-all error from a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Creates a not-found error for the given entity and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound {
            entity,
            id: id.into(),
        })
    }

    /// Attaches context to an error.
    /// Context is displayed before the error message.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    /// Useful to avoid expensive string construction for successful paths.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    /// Allows pattern matching on specific error variants.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns true if this error is a lookup miss rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound { .. })
    }

    /// Returns the innermost error in the chain.
    /// Traverses the error source chain to find the root cause.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }
}

impl From<ErrorKind> for MockademyError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for MockademyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::NotFound { .. } => None,
            ErrorKind::Message { .. } => None,
        }
    }
}

impl fmt::Display for MockademyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display context first if present
        for (i, ctx) in self.context.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", ctx)?;
            } else {
                write!(f, ": {}", ctx)?;
            }
        }

        if !self.context.is_empty() {
            write!(f, ": ")?;
        }

        match &self.kind {
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path.display(), source)
            }
            ErrorKind::NotFound { entity, .. } => {
                write!(f, "{} not found", entity)
            }
            ErrorKind::Message { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

/// Standard result type for mockademy operations.
/// The error is boxed to keep the Ok path small.
pub type MockademyResult<T> = std::result::Result<T, Box<MockademyError>>;

/// Creates a boxed [`MockademyError`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::error::MockademyError::message(format!($($arg)*)))
    };
}

/// Extension trait for attaching context to Results.
/// Provides ergonomic error context attachment during error propagation.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    /// Eager evaluation: context is evaluated immediately.
    fn context(self, context: impl Into<String>) -> MockademyResult<T>;

    /// Attaches context using lazy evaluation.
    /// Context is only evaluated if the result is an error.
    /// Prefer this to avoid expensive string formatting in the success path.
    fn with_context<F>(self, f: F) -> MockademyResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for MockademyResult<T> {
    fn context(self, context: impl Into<String>) -> MockademyResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> MockademyResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}
