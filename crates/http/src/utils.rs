//! Utility macros used internally by the decoder.

/// Returns early with `$error` when `$predicate` does not hold.
///
/// # Example
///
/// ```ignore
/// ensure!(src.len() <= max_header_bytes, ParseError::too_large_header(src.len(), max_header_bytes));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
