//! Text canonicalization for registry values and identity keys.
//!
//! Imported sheets mix Arabic and Persian code points for the same
//! letters, pad cells with stray spacing, and use placeholder tokens for
//! blank values. Everything the engine compares goes through `normalize`
//! first; identity lookup additionally strips spacing via `fingerprint`.

/// Tokens that mean "no value" in imported sheets. Compared
/// case-insensitively against the whole trimmed cell.
const EMPTY_TOKENS: &[&str] = &["nan", "none", "null", "n/a", "-", "–", "—"];

/// Canonicalize a raw cell value.
///
/// Folds Arabic code-point variants to their Persian forms, trims, and
/// collapses whitespace runs to a single space; placeholder tokens map
/// to the empty string. Idempotent, never fails.
pub fn normalize(raw: &str) -> String {
    let folded: String = raw.chars().map(fold_char).collect();
    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    if is_empty_token(&collapsed) {
        return String::new();
    }
    collapsed
}

/// Derive the identity-matching key for a name.
///
/// Applies `normalize`, then removes every whitespace character plus the
/// zero-width non-joiner and zero-width space, so spacing variants of a
/// name collapse to one key. Empty input stays empty; an empty
/// fingerprint is unmatchable and must never be used to group rows.
/// Keys are for lookup only; storage and display keep the normalized
/// form.
pub fn fingerprint(name: &str) -> String {
    normalize(name)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{200c}' && *c != '\u{200b}')
        .collect()
}

/// Map Arabic code-point variants onto the Persian forms used for
/// storage and comparison: Arabic Yeh and Alef Maksura to Farsi Yeh,
/// Arabic Kaf to Keheh, Arabic-Indic digits to Extended Arabic-Indic.
fn fold_char(c: char) -> char {
    match c {
        'ي' | 'ى' => 'ی',
        'ك' => 'ک',
        '٠'..='٩' => char::from_u32('۰' as u32 + (c as u32 - '٠' as u32)).unwrap_or(c),
        _ => c,
    }
}

fn is_empty_token(value: &str) -> bool {
    let lower = value.to_lowercase();
    EMPTY_TOKENS.iter().any(|token| lower == *token)
}
