pub fn pluralize(word: &str, count: usize) -> String {
    pluralize_with(word, count, |n| n.to_string())
}

pub fn pluralize_with<F>(word: &str, count: usize, format_count: F) -> String
where
    F: Fn(usize) -> String,
{
    let count_str = format_count(count);

    if count == 1 {
        format!("{count_str} {word}")
    } else {
        format!("{count_str} {word}s")
    }
}

/// Shortens a source location for headers, keeping its tail.
pub fn abbreviate(source: &str, max_chars: usize) -> String {
    let count = source.chars().count();
    if count <= max_chars {
        return source.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let tail: String = source.chars().skip(count - keep).collect();
    format!("…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize_single() {
        assert_eq!(pluralize("card", 1), "1 card");
        assert_eq!(pluralize("due card", 1), "1 due card");
    }

    #[test]
    fn test_pluralize_multiple() {
        assert_eq!(pluralize("card", 2), "2 cards");
        assert_eq!(pluralize("card", 0), "0 cards");
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("deck.csv", 20), "deck.csv");
        assert_eq!(abbreviate("abcdefghij", 5), "…ghij");
        assert_eq!(abbreviate("題庫題庫題庫", 3), "…題庫");
    }
}
