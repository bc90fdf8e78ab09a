//! Splits a formatted message into Telegram-sized chunks

use crate::models::{MessageChunk, TELEGRAM_MESSAGE_LIMIT};

/// Split with the Telegram sendMessage limit
pub fn split_for_telegram(text: &str) -> Vec<MessageChunk> {
    split_message(text, TELEGRAM_MESSAGE_LIMIT)
}

/// Split `text` into chunks of at most `limit` characters.
///
/// While the remainder is longer than `limit`, the cut goes before the last
/// newline at character position `1..=limit`, so the newline opens the next
/// chunk; with no such newline the cut is at `limit` characters, or one
/// earlier if that would split a `\*`-style escape pair.
/// Concatenating the chunks gives back `text`. Empty input yields one empty
/// chunk.
pub fn split_message(text: &str, limit: usize) -> Vec<MessageChunk> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    // `limit_byte` is the byte offset of the first character past the limit
    while let Some((limit_byte, _)) = rest.char_indices().nth(limit) {
        let cut = if rest[limit_byte..].starts_with('\n') {
            limit_byte
        } else {
            match rest[..limit_byte].rfind('\n') {
                Some(pos) if pos > 0 => pos,
                _ => keep_escape_whole(rest, limit_byte),
            }
        };

        let (head, tail) = rest.split_at(cut);
        chunks.push(MessageChunk::new(chunks.len(), head));
        rest = tail;
    }

    chunks.push(MessageChunk::new(chunks.len(), rest));
    chunks
}

/// Move a hard cut one character left when it would separate a backslash
/// from the Markdown control character it escapes
fn keep_escape_whole(text: &str, cut: usize) -> usize {
    let splits_pair = text[..cut].ends_with('\\')
        && text[cut..].starts_with(&['_', '*', '`', '['][..]);
    if splits_pair && cut > 1 {
        cut - 1
    } else {
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(chunks: &[MessageChunk]) -> String {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_empty_input_yields_one_empty_chunk() {
        let chunks = split_message("", 10);
        assert_eq!(chunks, vec![MessageChunk::new(0, "")]);
    }

    #[test]
    fn test_short_input_is_single_chunk() {
        let chunks = split_message("hello\nworld", 4096);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello\nworld");
    }

    #[test]
    fn test_exact_limit_is_single_chunk() {
        let text = "a".repeat(10);
        assert_eq!(split_message(&text, 10).len(), 1);
    }

    #[test]
    fn test_cuts_before_last_newline_in_window() {
        let chunks = split_message("aaa\nbbb\ncccc", 8);
        assert_eq!(chunks[0].text, "aaa\nbbb");
        assert_eq!(chunks[1].text, "\ncccc");
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn test_newline_exactly_at_limit() {
        let chunks = split_message("abcd\nefgh", 4);
        assert_eq!(chunks[0].text, "abcd");
        assert_eq!(chunks[1].text, "\nefg");
        assert_eq!(chunks[2].text, "h");
    }

    #[test]
    fn test_hard_cut_without_newline() {
        let chunks = split_message(&"x".repeat(25), 10);
        let lens: Vec<usize> = chunks.iter().map(MessageChunk::char_len).collect();
        assert_eq!(lens, vec![10, 10, 5]);
    }

    #[test]
    fn test_hard_cut_keeps_escape_pair_together() {
        let chunks = split_message("abc\\*def", 4);
        assert_eq!(chunks[0].text, "abc");
        assert_eq!(chunks[1].text, "\\*de");
        assert_eq!(chunks[2].text, "f");
        assert_eq!(joined(&chunks), "abc\\*def");
    }

    #[test]
    fn test_hard_cut_after_plain_backslash_is_unchanged() {
        let chunks = split_message("abc\\xyz", 4);
        assert_eq!(chunks[0].text, "abc\\");
    }

    #[test]
    fn test_escape_pair_at_limit_one_still_advances() {
        let chunks = split_message("\\*", 1);
        assert_eq!(joined(&chunks), "\\*");
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_leading_newline_does_not_stall() {
        let text = format!("\n{}", "y".repeat(12));
        let chunks = split_message(&text, 5);
        assert_eq!(joined(&chunks), text);
        assert!(chunks.iter().all(|c| !c.text.is_empty()));
        assert_eq!(chunks[0].text, "\nyyyy");
    }

    #[test]
    fn test_multibyte_characters_are_counted_as_chars() {
        let text = "é".repeat(9);
        let chunks = split_message(&text, 4);
        let lens: Vec<usize> = chunks.iter().map(MessageChunk::char_len).collect();
        assert_eq!(lens, vec![4, 4, 1]);
        assert_eq!(joined(&chunks), text);
    }

    #[test]
    fn test_split_for_telegram_uses_4096() {
        let text = "z".repeat(TELEGRAM_MESSAGE_LIMIT + 1);
        let chunks = split_for_telegram(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].char_len(), TELEGRAM_MESSAGE_LIMIT);
    }

    #[test]
    fn test_reassembly_and_bounds_over_mixed_inputs() {
        let inputs = [
            String::new(),
            "line\n".repeat(100),
            format!("{}\n{}", "a".repeat(30), "b".repeat(30)),
            "\n\n\n\n\n\n".to_string(),
            format!("header\n{}\ntrailer", "ж".repeat(57)),
        ];
        for limit in [1, 2, 7, 16, 33] {
            for input in &inputs {
                let chunks = split_message(input, limit);
                assert_eq!(&joined(&chunks), input, "limit {limit}");
                for (i, chunk) in chunks.iter().enumerate() {
                    assert_eq!(chunk.index, i);
                    assert!(chunk.char_len() <= limit, "limit {limit}");
                }
            }
        }
    }
}
