use once_cell::sync::Lazy;
use regex::Regex;

pub const NAME_MAX: usize = 200;
pub const SMALL_INT_MAX: i32 = 32767;

pub const EMAIL_MAX: usize = 254;
pub const USERNAME_MAX: usize = 150;

#[allow(clippy::unwrap_used)]
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$").unwrap()
});

#[allow(clippy::unwrap_used)]
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= EMAIL_MAX && EMAIL_REGEX.is_match(email)
}

pub fn is_valid_username(name: &str) -> bool {
    name.chars().count() <= USERNAME_MAX && USERNAME_REGEX.is_match(name)
}
