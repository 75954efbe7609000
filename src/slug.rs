/// slugify
///
/// Lowercases the input, collapses every run of non-alphanumeric characters into a
/// single hyphen and trims hyphens from both ends. Only ASCII letters and digits
/// survive, so the result is always URL-safe.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
