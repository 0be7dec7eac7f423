//! String helpers.

/// Treats an empty string as absent.
///
/// Optional text fields arrive from forms and storage as `""` as often as
/// they arrive missing.
///
/// ```
/// use whatif_domain::common::some_if_not_empty;
///
/// assert_eq!(some_if_not_empty("a@b.io".to_string()), Some("a@b.io".to_string()));
/// assert_eq!(some_if_not_empty(String::new()), None);
/// assert_eq!(some_if_not_empty(" ".to_string()), Some(" ".to_string()));
/// ```
pub fn some_if_not_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
