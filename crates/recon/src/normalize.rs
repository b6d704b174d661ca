/// Canonicalize a sample code for equality comparison.
///
/// Keeps ASCII letters and digits in their original order and drops
/// everything else (spaces, dots, dashes, slashes, non-ASCII). Total: any
/// input is valid, empty input yields an empty key.
pub fn normalize(code: &str) -> String {
    code.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
