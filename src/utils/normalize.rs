/// Normalize text for indexing and matching.
///
/// Lowercases, strips everything that is not a Unicode letter, digit, or
/// whitespace, collapses whitespace runs to single spaces, and trims.
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_lowercases() {
        assert_eq!(normalize("Harry Potter!"), "harry potter");
        assert_eq!(normalize("Война и мир."), "война и мир");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  a\t b \n c  "), "a b c");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(normalize("1984 (роман)"), "1984 роман");
    }

    #[test]
    fn idempotent() {
        for s in ["", "  ", "Hello, World!", "Щи да каша — пища наша", "a  b"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }
}
