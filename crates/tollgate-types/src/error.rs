//! Unified error interface for Tollgate.
//!
//! Every error enum in the workspace implements [`ErrorCode`] so the
//! services can log and route failures uniformly without matching on
//! concrete types.
//!
//! # Code Format
//!
//! - UPPER_SNAKE_CASE, prefixed by domain: `ENVELOPE_`, `POLICY_`,
//!   `STORAGE_`, `CONFIG_`, `BROKER_`
//! - Stable once defined — codes are part of the observable surface
//!
//! # Recoverability
//!
//! An error is recoverable when retrying may succeed (queue full,
//! transient storage failure). Malformed input, unmapped categories and
//! policy denials are not — they will not change on retry.

/// Machine-readable error code interface.
///
/// # Example
///
/// ```
/// use tollgate_types::ErrorCode;
///
/// #[derive(Debug)]
/// enum QueueError {
///     Full,
///     Closed,
/// }
///
/// impl ErrorCode for QueueError {
///     fn code(&self) -> &'static str {
///         match self {
///             Self::Full => "BROKER_QUEUE_FULL",
///             Self::Closed => "BROKER_QUEUE_CLOSED",
///         }
///     }
///
///     fn is_recoverable(&self) -> bool {
///         matches!(self, Self::Full)
///     }
/// }
///
/// assert!(QueueError::Full.is_recoverable());
/// assert!(!QueueError::Closed.is_recoverable());
/// ```
pub trait ErrorCode {
    /// Returns a stable, machine-readable error code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying the operation may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows workspace conventions:
/// non-empty, expected prefix, UPPER_SNAKE_CASE.
///
/// # Panics
///
/// Panics with a descriptive message if any check fails. Intended for
/// tests that cover every variant of an error enum.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// [`assert_error_code`] over every variant of an enum at once.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl ErrorCode for TestError {
        fn code(&self) -> &'static str {
            match self {
                Self::Transient => "TEST_TRANSIENT",
                Self::Permanent => "TEST_PERMANENT",
            }
        }

        fn is_recoverable(&self) -> bool {
            matches!(self, Self::Transient)
        }
    }

    #[test]
    fn codes_and_recoverability() {
        assert_eq!(TestError::Transient.code(), "TEST_TRANSIENT");
        assert!(TestError::Transient.is_recoverable());
        assert!(!TestError::Permanent.is_recoverable());
    }

    #[test]
    fn assert_helpers_accept_valid_codes() {
        assert_error_codes(&[TestError::Transient, TestError::Permanent], "TEST_");
    }

    #[test]
    #[should_panic(expected = "must start with prefix")]
    fn assert_rejects_wrong_prefix() {
        assert_error_code(&TestError::Transient, "OTHER_");
    }

    #[test]
    fn snake_case_check() {
        assert!(is_upper_snake_case("A_B_2"));
        assert!(!is_upper_snake_case("a_b"));
        assert!(!is_upper_snake_case("_A"));
        assert!(!is_upper_snake_case("A__B"));
        assert!(!is_upper_snake_case(""));
    }
}
