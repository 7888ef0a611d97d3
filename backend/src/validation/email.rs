//! Syntactic email address check.
//!
//! Only the shape is checked: a dot-atom local part, one `@`, and a domain of
//! DNS labels ending in an alphabetic TLD. Non-ASCII letters are allowed in
//! both parts (SMTPUTF8 addresses). No DNS lookups.
//!
//! [`normalize_email`] lowercases the domain and keeps the local part as given,
//! so `jo@Example.COM` and `jo@example.com` hash to the same value.

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

static LOCAL_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N}!#$%&'*+/=?^_`{|}~-]+(\.[\p{L}\p{N}!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("valid local-part regex")
});

static DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\p{L}\p{N}]([\p{L}\p{N}-]{0,61}[\p{L}\p{N}])?\.)+\p{L}{2,63}$")
        .expect("valid domain regex")
});

/// Returns `true` if `email` looks like a deliverable address.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    local.len() <= MAX_LOCAL_LEN && LOCAL_PART.is_match(local) && DOMAIN.is_match(domain)
}

/// Lowercase the domain of a syntactically valid address.
///
/// Call only after [`is_valid_email`] accepted `email`.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}
