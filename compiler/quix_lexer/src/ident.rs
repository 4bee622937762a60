//! Identifier validation.

/// Byte that may appear inside an identifier segment.
#[inline]
pub(crate) fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[inline]
pub(crate) fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// Whether `text` is a plain identifier (`abc_1`) or a qualified name
/// (`a::b::c`).
///
/// Every `::`-separated segment must be non-empty, made of
/// `[A-Za-z0-9_]`, and must not start with a digit.
pub fn is_valid_identifier(text: &str) -> bool {
    text.split("::").all(|segment| {
        let bytes = segment.as_bytes();
        bytes.first().is_some_and(|&b| is_ident_start(b))
            && bytes.iter().all(|&b| is_ident_continue(b))
    })
}
