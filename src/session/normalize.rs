use icu_normalizer::ComposingNormalizer;

/// Grammar annotations learners paste alongside a term, e.g. "(Verb)" or
/// "[phrasal verb]". Matched case-insensitively after lowercasing.
const POS_TAGS: &[&str] = &[
    "noun",
    "verb",
    "adjective",
    "adverb",
    "phrasal verb",
    "phrasal-verb",
    "idiom",
    "preposition",
];

/// Canonicalize a raw answer for comparison.
///
/// Unicode NFC first (Vietnamese translations arrive both composed and
/// decomposed depending on the input method), then lowercase, strip
/// recognized part-of-speech tags at any position, collapse the "word +
/// complement" connective to a space, and collapse whitespace.
///
/// Idempotent: `normalize(normalize(s)) == normalize(s)`. An empty result
/// means "no answer" and never equals any valid term.
pub fn normalize(raw: &str) -> String {
    let composed = ComposingNormalizer::new_nfc().normalize(raw);
    let folded = composed.to_lowercase();
    let untagged = strip_pos_tags(&folded);
    let connected = untagged.replace('+', " ");
    connected.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove "(verb)" / "[idiom]"-style annotations. Bracketed text that is not
/// a recognized tag is kept verbatim.
fn strip_pos_tags(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        let open = chars[i];
        if open == '(' || open == '[' {
            let close = if open == '(' { ')' } else { ']' };
            if let Some(len) = chars[i + 1..].iter().position(|&c| c == close) {
                let inner: String = chars[i + 1..i + 1 + len].iter().collect();
                if POS_TAGS.contains(&inner.trim()) {
                    // Keep neighboring words separated where the tag sat.
                    out.push(' ');
                    i += len + 2;
                    continue;
                }
            }
        }
        out.push(open);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_lowercases_collapses() {
        assert_eq!(normalize("  Rule   Out "), "rule out");
    }

    #[test]
    fn strips_pos_tag_and_connective() {
        assert_eq!(normalize("Rule out (Verb) + something"), "rule out something");
    }

    #[test]
    fn strips_tag_at_any_position() {
        assert_eq!(normalize("(Noun) apple"), "apple");
        assert_eq!(normalize("apple (noun)"), "apple");
        assert_eq!(normalize("give [Phrasal Verb] up"), "give up");
    }

    #[test]
    fn keeps_non_tag_brackets() {
        assert_eq!(normalize("break (something) down"), "break (something) down");
    }

    #[test]
    fn unterminated_bracket_kept() {
        assert_eq!(normalize("open (verb"), "open (verb");
    }

    #[test]
    fn composes_vietnamese_input() {
        // "quả" typed with a combining hook-above must equal the composed form.
        let decomposed = "qua\u{0309}";
        assert_eq!(normalize(decomposed), normalize("quả"));
    }

    #[test]
    fn idempotent() {
        for s in [
            "Rule out (Verb) + something",
            "  Quả Táo  ",
            "(idiom) piece of cake",
            "a + b + c",
            "",
            "plain",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn empty_is_no_answer() {
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("(verb)"), "");
        assert_eq!(normalize("+"), "");
    }
}
