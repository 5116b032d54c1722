use crate::model::Passage;

/// A trimmed line must be strictly longer than this (in chars) to be matched.
pub const MIN_PASSAGE_CHARS: usize = 20;

/// Split `document` on line breaks into matchable passages.
///
/// Lines are trimmed; lines of `MIN_PASSAGE_CHARS` characters or fewer are dropped. Both
/// `\n` and `\r\n` endings are accepted.
pub fn segment(document: &str) -> Vec<Passage> {
    document
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_PASSAGE_CHARS)
        .enumerate()
        .map(|(index, text)| Passage {
            index,
            text: text.to_string(),
        })
        .collect()
}
