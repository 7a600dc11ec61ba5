// src/macros/utils.rs

//! Textual substitution helpers shared by mixin expansion and loop unrolling.
//!
//! Substitution is whole-string and knows nothing about the structure of the text it
//! rewrites. A match is only taken when the character after it cannot continue an
//! identifier, so `$a` never rewrites the front of `$ab` or `$a-b`. That narrows
//! accidental collisions without removing them: a name inside a quoted string, or a
//! name that shares a boundary with unrelated text, is still replaced.

/// Characters that may continue an identifier or variable name.
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Replaces every occurrence of `name` that is not followed by an identifier character.
///
/// ```rust
/// use scssc::macros::utils::replace_token;
/// assert_eq!(replace_token("$a $ab $a;", "$a", "1"), "1 $ab 1;");
/// ```
pub fn replace_token(text: &str, name: &str, value: &str) -> String {
    if name.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(name) {
        let after = &rest[pos + name.len()..];
        out.push_str(&rest[..pos]);
        if after.chars().next().is_some_and(is_identifier_char) {
            out.push_str(name);
        } else {
            out.push_str(value);
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

/// The `#{$name}` placeholder for a variable reference.
pub fn placeholder(name: &str) -> String {
    format!("#{{{name}}}")
}

/// Replaces `#{$name}` placeholders only.
pub fn interpolate(text: &str, name: &str, value: &str) -> String {
    text.replace(&placeholder(name), value)
}

/// Replaces `#{$name}` placeholders, then bare `$name` tokens.
///
/// ```rust
/// use scssc::macros::utils::substitute;
/// assert_eq!(substitute(".icon-#{$k} { color: $k; }", "$k", "home"), ".icon-home { color: home; }");
/// ```
pub fn substitute(text: &str, name: &str, value: &str) -> String {
    replace_token(&interpolate(text, name, value), name, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_check_skips_longer_names() {
        assert_eq!(replace_token("$size $sizes $size-sm", "$size", "4px"), "4px $sizes $size-sm");
    }

    #[test]
    fn residual_collision_inside_strings() {
        // Documented limitation: quoted text is not protected.
        assert_eq!(replace_token("content: \"$c\";", "$c", "red"), "content: \"red\";");
    }

    #[test]
    fn interpolation_only_touches_placeholders() {
        assert_eq!(interpolate(".m-#{$i} { margin: $i; }", "$i", "2"), ".m-2 { margin: $i; }");
    }

    #[test]
    fn empty_name_is_a_no_op() {
        assert_eq!(replace_token("abc", "", "x"), "abc");
    }
}
