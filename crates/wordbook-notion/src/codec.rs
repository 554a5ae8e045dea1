//! Examples packed into a single rich-text field.
//!
//! Pairs are joined with a blank line and each pair reads
//! `sentence → translation`. Inside a field, `\` is written as `\\`, a
//! newline as `\n`, a tab as `\t`, a carriage return as `\r` and `→` as
//! `\>`, so a field can never contain either delimiter. A space at either end
//! of a field is written as `\s` so it survives the trim on decode; other
//! surrounding whitespace is trimmed. Lines that do not split into exactly one
//! sentence and one non-empty translation are dropped on decode.

use wordbook_types::Example;

pub const PAIR_DELIMITER: &str = "\n\n";
pub const SEPARATOR: &str = " → ";

pub fn encode(examples: &[Example]) -> String {
    examples
        .iter()
        .map(|e| format!("{}{SEPARATOR}{}", escape(&e.sentence), escape(&e.translation)))
        .collect::<Vec<_>>()
        .join(PAIR_DELIMITER)
}

pub fn decode(blob: &str) -> Vec<Example> {
    blob.split(PAIR_DELIMITER)
        .filter_map(decode_pair)
        .collect()
}

fn decode_pair(line: &str) -> Option<Example> {
    let mut parts = line.split(SEPARATOR);
    let (sentence, translation) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let sentence = unescape(sentence.trim());
    let translation = unescape(translation.trim());
    if sentence.is_empty() || translation.is_empty() {
        return None;
    }
    Some(Example {
        sentence,
        translation,
    })
}

fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let last = field.chars().count().saturating_sub(1);
    for (i, c) in field.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '→' => out.push_str("\\>"),
            ' ' if i == 0 || i == last => out.push_str("\\s"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('s') => out.push(' '),
            Some('>') => out.push('→'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pair_round_trips() {
        let examples = vec![Example::new("Hola", "Hello")];
        let blob = encode(&examples);

        assert_eq!(blob, "Hola → Hello");
        assert_eq!(decode(&blob), examples);
    }

    #[test]
    fn order_is_preserved() {
        let examples = vec![
            Example::new("Mi casa es grande", "My house is big"),
            Example::new("La casa roja", "The red house"),
        ];
        assert_eq!(decode(&encode(&examples)), examples);
    }

    #[test]
    fn delimiters_inside_fields_survive() {
        let examples = vec![
            Example::new("a → b", "line one\n\nline two"),
            Example::new(r"C:\casa", "path"),
        ];
        assert_eq!(decode(&encode(&examples)), examples);
    }

    #[test]
    fn surrounding_spaces_survive() {
        let examples = vec![
            Example::new(" hola ", "hello "),
            Example::new("\tcasa", " "),
        ];
        let blob = encode(&examples);

        assert!(blob.starts_with("\\shola\\s → hello\\s"));
        assert_eq!(decode(&blob), examples);
    }

    #[test]
    fn inner_spaces_are_left_alone() {
        assert_eq!(encode(&[Example::new("mi casa", "my house")]), "mi casa → my house");
    }

    #[test]
    fn malformed_lines_are_dropped() {
        let blob = "Hola → Hello\n\nno separator here\n\nuno → dos → tres\n\n → empty sentence\n\nAdiós → Goodbye";

        assert_eq!(
            decode(blob),
            vec![Example::new("Hola", "Hello"), Example::new("Adiós", "Goodbye")]
        );
    }

    #[test]
    fn empty_blob_decodes_to_nothing() {
        assert!(decode("").is_empty());
        assert_eq!(encode(&[]), "");
    }
}
