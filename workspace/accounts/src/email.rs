/// Normalize an email address by lower-casing its domain part.
///
/// The local part is case sensitive per RFC 5321 and is kept as given.
/// Input without an `@` is returned unchanged.
pub fn normalize_email(email: &str) -> String {
    match email.trim().rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}
