//! # Utility Functions Module
//!
//! Small helpers shared by the command builders.

use std::ffi::{OsStr, OsString};

/// Converts any iterable of string-like items to `Vec<String>`.
///
/// # Example
/// ```rust
/// use pdf_optimizer::utils::to_string_vec;
///
/// let args = to_string_vec(["-dNOPAUSE", "-dBATCH"]);
/// assert_eq!(args, vec!["-dNOPAUSE".to_string(), "-dBATCH".to_string()]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Joins a flag and a path into a single argument (`-sOutputFile=/tmp/x.pdf`)
/// without going through a lossy UTF-8 conversion.
pub fn flag_with_path(flag: &str, path: impl AsRef<OsStr>) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path.as_ref());
    arg
}
