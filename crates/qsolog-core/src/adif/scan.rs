/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`
/// in `haystack`, or `None`.
///
/// Compares bytes in place, so no lowercased copy of the haystack is made.
/// `needle` is expected to be ASCII, which makes every returned offset a
/// valid `char` boundary.
pub fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() {
        return Some(0);
    }
    if pat.len() > hay.len() {
        return None;
    }
    hay.windows(pat.len())
        .position(|window| window.eq_ignore_ascii_case(pat))
}
