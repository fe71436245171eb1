//! Unwrap helpers with good error messages.
//!
//! Tests use these instead of `unwrap()` and `expect()`. `#[track_caller]`
//! keeps the panic location at the call site.

use std::fmt::Debug;

/// Unwrap a `Result`, panicking with the error value.
///
/// ```rust
/// use ridersaid_test_helpers::must;
///
/// let result: Result<i32, &str> = Ok(42);
/// assert_eq!(must(result), 42);
/// ```
#[track_caller]
pub fn must<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must: unexpected Err: {e:?}"),
    }
}

/// Unwrap an `Option`, panicking with `msg` if `None`.
#[track_caller]
pub fn must_some<T>(option: Option<T>, msg: &str) -> T {
    match option {
        Some(v) => v,
        None => panic!("must_some: {msg}"),
    }
}

/// Unwrap an `Err`, panicking if the result is `Ok`.
///
/// ```rust
/// use ridersaid_test_helpers::must_err;
///
/// let result: Result<(), &str> = Err("denied");
/// assert_eq!(must_err(result), "denied");
/// ```
#[track_caller]
pub fn must_err<T: Debug, E>(result: Result<T, E>) -> E {
    match result {
        Ok(v) => panic!("must_err: unexpected Ok: {v:?}"),
        Err(e) => e,
    }
}
