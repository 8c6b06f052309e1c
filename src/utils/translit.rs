//! Rule-based Latin→Cyrillic transliteration.
//!
//! Queries typed in the wrong keyboard layout ("voina i mir") are rewritten
//! into their phonetic Cyrillic form and matched alongside the raw query.

/// Multi-character rules: digraphs plus a few names and words that show up
/// constantly in catalog queries. Applied longest-first so that e.g. `shch`
/// is rewritten before `sh` or `ch` can consume its prefix.
const MULTI_RULES: &[(&str, &str)] = &[
    ("dostoevsky", "достоевский"),
    ("tolstoy", "толстой"),
    ("chekhov", "чехов"),
    ("pushkin", "пушкин"),
    ("potter", "поттер"),
    ("harry", "гарри"),
    ("peace", "мир"),
    ("shch", "щ"),
    ("war", "война"),
    ("ch", "ч"),
    ("sh", "ш"),
    ("yo", "ё"),
    ("yu", "ю"),
    ("ya", "я"),
    ("zh", "ж"),
];

/// Single-character fallback rules.
const SINGLE_RULES: &[(&str, &str)] = &[
    ("a", "а"),
    ("b", "б"),
    ("c", "ц"),
    ("d", "д"),
    ("e", "е"),
    ("f", "ф"),
    ("g", "г"),
    ("h", "х"),
    ("i", "и"),
    ("j", "й"),
    ("k", "к"),
    ("l", "л"),
    ("m", "м"),
    ("n", "н"),
    ("o", "о"),
    ("p", "п"),
    ("q", "к"),
    ("r", "р"),
    ("s", "с"),
    ("t", "т"),
    ("u", "у"),
    ("v", "в"),
    ("w", "в"),
    ("x", "кс"),
    ("y", "ы"),
    ("z", "з"),
];

/// Transliterate Latin text to Cyrillic.
///
/// Lowercases first, then applies multi-character rules longest-first before
/// any single-character rule runs, so digraphs are never split into
/// per-letter substitutions. Text that is already Cyrillic passes through
/// untouched.
pub fn transliterate(text: &str) -> String {
    let mut result = text.to_lowercase();

    for (latin, cyrillic) in MULTI_RULES {
        if result.contains(latin) {
            result = result.replace(latin, cyrillic);
        }
    }
    for (latin, cyrillic) in SINGLE_RULES {
        if result.contains(latin) {
            result = result.replace(latin, cyrillic);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_letters() {
        assert_eq!(transliterate("mir"), "мир");
        assert_eq!(transliterate("voina"), "воина");
    }

    #[test]
    fn digraphs_before_singles() {
        // "yo" must become "ё", never "ы" + "о".
        assert_eq!(transliterate("yolka"), "ёлка");
        assert_eq!(transliterate("zhuk"), "жук");
        assert_eq!(transliterate("chas"), "час");
    }

    #[test]
    fn longest_rule_wins() {
        // "shch" is one letter, not "sh" + "ch".
        assert_eq!(transliterate("borshch"), "борщ");
    }

    #[test]
    fn known_words() {
        assert_eq!(transliterate("Harry Potter"), "гарри поттер");
        assert_eq!(transliterate("war"), "война");
    }

    #[test]
    fn cyrillic_passes_through() {
        assert_eq!(transliterate("мир"), "мир");
    }

    #[test]
    fn multi_rules_are_sorted_longest_first() {
        for pair in MULTI_RULES.windows(2) {
            assert!(pair[0].0.len() >= pair[1].0.len());
        }
    }
}
