//! proptest strategies for user input.

use proptest::prelude::*;

/// A task title with at least one non-whitespace character. Surrounding
/// whitespace is sometimes included, since titles are stored verbatim.
pub fn task_title() -> impl Strategy<Value = String> {
    ("[ \t]{0,2}", "[A-Za-z0-9][A-Za-z0-9 ,.!?'-]{0,39}", "[ \t]{0,2}")
        .prop_map(|(lead, body, trail)| format!("{lead}{body}{trail}"))
}

/// A title made only of whitespace, including the empty string.
pub fn blank_title() -> impl Strategy<Value = String> {
    "[ \t\n]{0,6}"
}

/// A password of `len` characters drawn from printable ASCII.
pub fn password_of_len(len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::char::range('!', '~'), len)
        .prop_map(|chars| chars.into_iter().collect())
}

/// A password of 1 to 12 characters, on both sides of the length minimum.
pub fn password() -> impl Strategy<Value = String> {
    (1usize..=12).prop_flat_map(password_of_len)
}

/// An email address the mock provider accepts.
pub fn email() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", "[a-z]{2,8}").prop_map(|(user, host)| format!("{user}@{host}.com"))
}
