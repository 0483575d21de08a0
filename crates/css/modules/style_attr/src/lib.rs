//! CSS Style Attributes — inline declaration block parsing and serialization.
//! Spec: <https://www.w3.org/TR/css-style-attr/>

#![forbid(unsafe_code)]

use core::fmt::{Display, Formatter, Result as FmtResult};
use core::str::CharIndices;

/// A single declaration from an inline declaration block.
///
/// Spec: <https://www.w3.org/TR/css-style-attr/#interpreting>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name. Custom properties (`--*`) keep their case, all others are
    /// ASCII-lowercased.
    pub property: String,
    /// Value trimmed of surrounding ASCII whitespace. May contain spaces.
    pub value: String,
}

impl Display for Declaration {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "{}: {};", self.property, self.value)
    }
}

/// Parse the text of a `style` attribute into declarations, in source order.
///
/// Items are separated by semicolons outside of brackets, so values such as
/// `url(a;b)` or `{ x; y }` in custom properties stay intact. Items without a colon,
/// with an empty name, or with an empty value are skipped.
///
/// Spec: <https://www.w3.org/TR/css-style-attr/#interpreting>
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    split_top_level(input)
        .into_iter()
        .filter_map(parse_declaration)
        .collect()
}

/// Serialize declarations back into `style` attribute text.
///
/// Spec: <https://drafts.csswg.org/cssom/#serialize-a-css-declaration-block>
pub fn serialize_declarations(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a property name: lowercase unless it is a custom property.
pub fn normalize_property(name: &str) -> String {
    if name.starts_with("--") {
        name.to_owned()
    } else {
        name.to_ascii_lowercase()
    }
}

fn parse_declaration(item: &str) -> Option<Declaration> {
    let item = item.trim_matches(is_ascii_whitespace);
    let (raw_prop, raw_value) = item.split_once(':')?;
    let property_text = raw_prop.trim_matches(is_ascii_whitespace);
    let value_text = raw_value.trim_matches(is_ascii_whitespace);
    if property_text.is_empty() || value_text.is_empty() {
        return None;
    }
    Some(Declaration {
        property: normalize_property(property_text),
        value: value_text.to_owned(),
    })
}

/// Characters of `text` that lie outside string tokens, with their byte offsets.
///
/// Quote characters, string contents, backslashes and the character each backslash
/// escapes are skipped. An unterminated string runs to the end of the input.
///
/// Spec: <https://www.w3.org/TR/css-syntax-3/#consume-string-token>
pub fn unquoted_chars(text: &str) -> UnquotedChars<'_> {
    UnquotedChars {
        chars: text.char_indices(),
        quote: None,
    }
}

/// Iterator returned by [`unquoted_chars`].
#[derive(Clone, Debug)]
pub struct UnquotedChars<'text> {
    chars: CharIndices<'text>,
    quote: Option<char>,
}

impl Iterator for UnquotedChars<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, character)) = self.chars.next() {
            match (self.quote, character) {
                (_, '\\') => {
                    self.chars.next();
                }
                (Some(open), _) => {
                    if character == open {
                        self.quote = None;
                    }
                }
                (None, '"' | '\'') => self.quote = Some(character),
                (None, _) => return Some((index, character)),
            }
        }
        None
    }
}

/// Split on `;` that sit outside any `()`, `[]` or `{}` group and outside strings.
fn split_top_level(input: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut item_start = 0usize;
    for (index, character) in unquoted_chars(input) {
        match character {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                items.push(&input[item_start..index]);
                item_start = index + 1;
            }
            _ => {}
        }
    }
    items.push(&input[item_start..]);
    items
}

/// ASCII whitespace per CSS Syntax (TAB, LF, FF, CR, SPACE).
///
/// Spec: <https://www.w3.org/TR/css-syntax-3/#whitespace>
const fn is_ascii_whitespace(character: char) -> bool {
    matches!(
        character,
        '\u{0009}' | '\u{000A}' | '\u{000C}' | '\u{000D}' | '\u{0020}'
    )
}

#[cfg(test)]
mod tests {
    use super::split_top_level;

    #[test]
    fn split_ignores_nested_semicolons() {
        assert_eq!(
            split_top_level("a: b; --c: { x; y }; d: url(e;f)"),
            vec!["a: b", " --c: { x; y }", " d: url(e;f)"]
        );
    }

    #[test]
    fn split_ignores_semicolons_in_strings_and_escapes() {
        assert_eq!(
            split_top_level(r#"--q: "a;b"; --r: ')'; --s: \;x"#),
            vec![r#"--q: "a;b""#, " --r: ')'", r" --s: \;x"]
        );
    }
}
