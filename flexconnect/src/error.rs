// Copyright (c) 2020-present, UMD Database Group.
//
// This program is free software: you can use, redistribute, and/or modify
// it under the terms of the GNU Affero General Public License, version 3
// or later ("AGPL"), as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! FlexConnect error types

use arrow::error::ArrowError;

use std::error;
use std::fmt::{Display, Formatter};
use std::io;
use std::result;

/// Result type for operations that could result in an [FlexConnectError]
pub type Result<T> = result::Result<T, FlexConnectError>;

/// FlexConnect error
///
/// None of these errors are retried by the function or the launcher. Whether
/// a client retries is up to the client.
#[derive(Debug)]
pub enum FlexConnectError {
    /// The invocation parameters do not carry a valid execution context, or
    /// the invocation command itself is malformed. This is a caller error.
    InvalidInvocation(String),
    /// Error returned while a function produces its result.
    Execution(String),
    /// Error returned when an invocation names a function that is not
    /// registered.
    FunctionNotFound(String),
    /// Error returned when a function cannot be added to the registry, e.g.
    /// because its name is already taken.
    Registration(String),
    /// Error returned by the one-time initialization of a function. The
    /// launcher treats it as fatal.
    Load(String),
    /// Error returned when the settings cannot be loaded or a setting has an
    /// unexpected value.
    Config(String),
    /// Error returned when Arrow is unexpectedly executed.
    Arrow(ArrowError),
    /// Error returned when serde_json failed to serialize or deserialize data.
    SerdeJson(serde_json::Error),
    /// Error associated to I/O operations and associated traits.
    IoError(io::Error),
    /// Error returned as a consequence of an error in FlexConnect.
    /// This error should not happen in normal usage.
    Internal(String),
}

impl FlexConnectError {
    /// Returns true if the error was caused by the caller rather than by the
    /// function, so that repeating the same request cannot succeed.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            FlexConnectError::InvalidInvocation(_) | FlexConnectError::FunctionNotFound(_)
        )
    }
}

impl From<io::Error> for FlexConnectError {
    fn from(e: io::Error) -> Self {
        FlexConnectError::IoError(e)
    }
}

impl From<ArrowError> for FlexConnectError {
    fn from(e: ArrowError) -> Self {
        FlexConnectError::Arrow(e)
    }
}

impl From<serde_json::Error> for FlexConnectError {
    fn from(e: serde_json::Error) -> Self {
        FlexConnectError::SerdeJson(e)
    }
}

impl From<ini::Error> for FlexConnectError {
    fn from(e: ini::Error) -> Self {
        FlexConnectError::Config(e.to_string())
    }
}

impl From<ini::ParseError> for FlexConnectError {
    fn from(e: ini::ParseError) -> Self {
        FlexConnectError::Config(e.to_string())
    }
}

impl From<toml::de::Error> for FlexConnectError {
    fn from(e: toml::de::Error) -> Self {
        FlexConnectError::Config(e.to_string())
    }
}

impl From<&str> for FlexConnectError {
    fn from(e: &str) -> Self {
        FlexConnectError::Internal(e.to_string())
    }
}

impl Display for FlexConnectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            FlexConnectError::InvalidInvocation(ref desc) => {
                write!(f, "Invalid invocation: {}", desc)
            }
            FlexConnectError::Execution(ref desc) => write!(f, "Execution error: {}", desc),
            FlexConnectError::FunctionNotFound(ref desc) => {
                write!(f, "Function not found: {}", desc)
            }
            FlexConnectError::Registration(ref desc) => {
                write!(f, "Function registration error: {}", desc)
            }
            FlexConnectError::Load(ref desc) => write!(f, "Function load error: {}", desc),
            FlexConnectError::Config(ref desc) => write!(f, "Configuration error: {}", desc),
            FlexConnectError::Arrow(ref desc) => write!(f, "Arrow error: {}", desc),
            FlexConnectError::SerdeJson(ref desc) => write!(f, "serde_json error: {:?}", desc),
            FlexConnectError::IoError(ref desc) => write!(f, "IO error: {}", desc),
            FlexConnectError::Internal(ref desc) => write!(
                f,
                "Internal error: {}. This was likely caused by a bug in FlexConnect's \
                    code and we would welcome that you file an bug report in our issue tracker",
                desc
            ),
        }
    }
}

impl error::Error for FlexConnectError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors() {
        assert!(FlexConnectError::InvalidInvocation("no context".to_owned()).is_caller_error());
        assert!(FlexConnectError::FunctionNotFound("Foo".to_owned()).is_caller_error());
        assert!(!FlexConnectError::Execution("boom".to_owned()).is_caller_error());
        assert!(!FlexConnectError::Load("pool".to_owned()).is_caller_error());
    }

    #[test]
    fn error_display() {
        let e = FlexConnectError::InvalidInvocation(
            "Function did not receive execution context.".to_owned(),
        );
        assert_eq!(
            "Invalid invocation: Function did not receive execution context.",
            e.to_string()
        );
    }
}
