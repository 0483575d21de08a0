//! CSS Custom Properties for Cascading Variables Module Level 1 — `var()` substitution.
//! Spec: <https://www.w3.org/TR/css-variables-1/>

#![forbid(unsafe_code)]

/// Prefix that marks a custom property name.
pub const CUSTOM_PROPERTY_PREFIX: &str = "--";

/// Returns true when `name` is a usable custom property name.
///
/// The bare `--` is reserved and therefore rejected.
///
/// Spec: <https://www.w3.org/TR/css-variables-1/#custom-property>
#[inline]
pub fn is_custom_property_name(name: &str) -> bool {
    name.len() > CUSTOM_PROPERTY_PREFIX.len() && name.starts_with(CUSTOM_PROPERTY_PREFIX)
}

/// Why a value could not be substituted.
#[derive(Debug)]
enum Unresolved {
    /// Undefined reference without fallback, or an invalid referenced value.
    Invalid,
    /// A reference cycle that closes at the named property. Every property between
    /// the reference and that name is a member and ignores its fallbacks.
    Cycle(String),
}

/// Substitute every `var()` reference in `value_text`.
///
/// `lookup` returns the raw (unsubstituted) value of a custom property, or `None`
/// when the property is not defined for the element. Referenced values are expanded
/// recursively.
///
/// Returns `None` when the value is invalid at computed-value time: a reference to an
/// undefined or cyclic custom property with no fallback.
///
/// Spec: <https://www.w3.org/TR/css-variables-1/#substitute-a-var>
#[inline]
pub fn resolve_vars_in_value<F>(value_text: &str, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    substitute(value_text, &lookup, &mut Vec::new()).ok()
}

/// Compute the value of the custom property `name` declared as `value_text`.
///
/// Like [`resolve_vars_in_value`], but `name` itself takes part in cycle detection:
/// a property that is part of a reference cycle is invalid even when the references
/// inside the cycle carry fallbacks.
///
/// Spec: <https://www.w3.org/TR/css-variables-1/#cycles>
#[inline]
pub fn resolve_custom_property<F>(name: &str, value_text: &str, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut stack = vec![name.to_owned()];
    substitute(value_text, &lookup, &mut stack).ok()
}

/// Walk `value_text`, replacing each `var(...)` occurrence.
fn substitute<F>(value_text: &str, lookup: &F, stack: &mut Vec<String>) -> Result<String, Unresolved>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value_text.len());
    let mut rest = value_text;
    while let Some(start) = find_reference(rest) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + "var(".len()..];
        let Some(close) = matching_close_paren(after_open) else {
            // Unterminated reference; keep the tail verbatim.
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let replacement = substitute_reference(&after_open[..close], lookup, stack)?;
        out.push_str(&replacement);
        rest = &after_open[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Resolve the argument list of one `var()`: `--name` or `--name, fallback`.
///
/// Spec: <https://www.w3.org/TR/css-variables-1/#using-variables>
fn substitute_reference<F>(
    args_text: &str,
    lookup: &F,
    stack: &mut Vec<String>,
) -> Result<String, Unresolved>
where
    F: Fn(&str) -> Option<String>,
{
    let (name_text, fallback_text) = match args_text.split_once(',') {
        Some((first, second)) => (first.trim(), Some(second.trim())),
        None => (args_text.trim(), None),
    };
    let with_fallback = |frames: &mut Vec<String>| match fallback_text {
        Some(fallback) => substitute(fallback, lookup, frames),
        None => Err(Unresolved::Invalid),
    };

    if !is_custom_property_name(name_text) {
        return with_fallback(stack);
    }
    if stack.iter().any(|seen| seen == name_text) {
        return Err(Unresolved::Cycle(name_text.to_owned()));
    }
    let Some(raw_value) = lookup(name_text) else {
        return with_fallback(stack);
    };

    stack.push(name_text.to_owned());
    let expanded = substitute(&raw_value, lookup, stack);
    stack.pop();
    match expanded {
        Ok(value) => Ok(value),
        Err(Unresolved::Cycle(closing)) if closing != name_text => Err(Unresolved::Cycle(closing)),
        // The referenced property is invalid; this reference sits outside any cycle.
        Err(_) => with_fallback(stack),
    }
}

/// Byte offset of the next `var(` function token, skipping strings and escapes and
/// ignoring `var(` that ends a longer identifier such as `foovar(`.
fn find_reference(text: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut previous: Option<char> = None;
    let mut chars = text.char_indices();
    while let Some((index, character)) = chars.next() {
        match (quote, character) {
            (_, '\\') => {
                chars.next();
            }
            (Some(open), _) => {
                if character == open {
                    quote = None;
                }
            }
            (None, '"' | '\'') => quote = Some(character),
            (None, _) => {
                let starts_function = text
                    .get(index..index + "var(".len())
                    .is_some_and(|head| head.eq_ignore_ascii_case("var("));
                if starts_function && !previous.is_some_and(is_ident_char) {
                    return Some(index);
                }
            }
        }
        previous = Some(character);
    }
    None
}

/// Spec: <https://www.w3.org/TR/css-syntax-3/#ident-code-point>
const fn is_ident_char(character: char) -> bool {
    character.is_ascii_alphanumeric()
        || matches!(character, '-' | '_' | '\\')
        || !character.is_ascii()
}

/// Index of the `)` closing an already-opened parenthesis, honoring nesting and
/// skipping strings.
fn matching_close_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = text.char_indices();
    while let Some((index, character)) = chars.next() {
        match (quote, character) {
            (_, '\\') => {
                chars.next();
            }
            (Some(open), _) => {
                if character == open {
                    quote = None;
                }
            }
            (None, '"' | '\'') => quote = Some(character),
            (None, '(') => depth += 1,
            (None, ')') if depth == 0 => return Some(index),
            (None, ')') => depth -= 1,
            (None, _) => {}
        }
    }
    None
}
