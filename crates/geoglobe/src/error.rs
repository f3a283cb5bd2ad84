//! Error types for the geoglobe crate.

use std::fmt;

/// Result type for geoglobe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure category, used to decide how a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source could not be reached or answered with a non-success status.
    Network,
    /// The response did not match the expected feature collection shape.
    Parse,
    /// A geometric computation (centroid) failed for a feature.
    Geometry,
}

/// Errors that can occur while loading data or deriving camera targets.
#[derive(Debug)]
pub enum Error {
    /// HTTP request failed.
    Http {
        /// The URL that failed.
        url: String,
        /// The error message.
        message: String,
    },
    /// HTTP response had a non-success status code.
    HttpStatus {
        /// The URL that returned the error.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
    /// Reading a local boundary file failed.
    Io {
        /// The path that could not be read.
        path: String,
        /// The error message.
        message: String,
    },
    /// Response body was not a usable feature collection.
    Parse {
        /// Context for where the error occurred.
        context: &'static str,
        /// The error message.
        message: String,
    },
    /// Centroid computation failed.
    Geometry {
        /// ISO A2 code of the offending feature.
        feature: String,
        /// Description of what went wrong.
        detail: String,
    },
}

impl Error {
    /// The failure category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http { .. } | Error::HttpStatus { .. } | Error::Io { .. } => ErrorKind::Network,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Geometry { .. } => ErrorKind::Geometry,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http { url, message } => {
                write!(f, "http request to {url} failed: {message}")
            }
            Error::HttpStatus { url, status } => {
                write!(f, "http request to {url} returned status {status}")
            }
            Error::Io { path, message } => {
                write!(f, "failed to read {path}: {message}")
            }
            Error::Parse { context, message } => {
                write!(f, "failed to parse {context}: {message}")
            }
            Error::Geometry { feature, detail } => {
                write!(f, "geometry error for {feature}: {detail}")
            }
        }
    }
}

impl std::error::Error for Error {}
