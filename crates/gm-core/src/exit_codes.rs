//! Exit codes for the gm-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.

use gm_common::Error;

/// Exit codes for gm-core commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed
    Clean = 0,

    /// Configuration missing, unreadable or invalid
    ConfigError = 10,

    /// Invocation event could not be parsed
    InvalidInput = 11,

    /// A record failed to transform; the whole batch is rejected
    TransformFailed = 12,

    /// I/O error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Exit code for a failed command.
    pub fn for_error(err: &Error) -> Self {
        match err {
            Error::Config(_) | Error::ConfigValidation(_) | Error::Catalog(_) => {
                ExitCode::ConfigError
            }
            Error::InvalidEvent(_) => ExitCode::InvalidInput,
            Error::Transform(_) | Error::MalformedRecord { .. } => ExitCode::TransformFailed,
            Error::Io(_) => ExitCode::IoError,
            // Input is parsed into InvalidEvent; a bare serde error means
            // our own output failed to render.
            Error::Json(_) | Error::Runtime(_) => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        ExitCode::for_error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_error_split() {
        assert!(ExitCode::Clean.is_success());
        assert!(!ExitCode::Clean.is_error());
        for code in [
            ExitCode::ConfigError,
            ExitCode::InvalidInput,
            ExitCode::TransformFailed,
            ExitCode::IoError,
            ExitCode::InternalError,
        ] {
            assert!(code.is_error());
            assert!(!code.is_success());
        }
    }

    #[test]
    fn test_error_mapping() {
        let malformed = Error::MalformedRecord {
            record_id: "r".into(),
            reason: "line 1: invalid JSON".into(),
        };
        assert_eq!(ExitCode::for_error(&malformed).as_i32(), 12);
        assert_eq!(
            ExitCode::for_error(&Error::Config("missing".into())),
            ExitCode::ConfigError
        );
        assert_eq!(
            ExitCode::from(&Error::InvalidEvent("bad".into())),
            ExitCode::InvalidInput
        );
        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(i32::from(ExitCode::for_error(&io)), 13);
    }

    #[test]
    fn test_validation_and_render_errors() {
        assert_eq!(
            ExitCode::for_error(&Error::ConfigValidation("catalog.bucket_name: too short".into())),
            ExitCode::ConfigError
        );
        let render = serde_json::to_string(&std::collections::BTreeMap::from([((1, 2), 3)]))
            .map_err(Error::from)
            .unwrap_err();
        assert_eq!(render.code(), 61);
        assert_eq!(ExitCode::for_error(&render), ExitCode::InternalError);
    }
}
