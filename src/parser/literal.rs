//! Permissive parsing of Python-style literals
//!
//! Models trained on Python often emit dict literals instead of JSON:
//! single-quoted strings, `True`/`False`/`None`, tuples. This module rewrites
//! such text into JSON and hands it to `serde_json`. Anything it does not
//! understand is copied through unchanged, so invalid input still fails in
//! the JSON parser rather than here.

use serde_json::Value;

/// Parse `text` as JSON after rewriting Python literal syntax
pub fn parse_python_literal(text: &str) -> Option<Value> {
    let rewritten = to_json(text)?;
    serde_json::from_str(&rewritten).ok()
}

/// Rewrite Python literal syntax into JSON text
fn to_json(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '\'' | '"' => {
                let (literal, next) = read_string(&chars, i)?;
                out.push_str(&literal);
                i = next;
            }
            '(' => {
                out.push('[');
                i += 1;
            }
            ')' => {
                out.push(']');
                i += 1;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.as_str() {
                    "True" => out.push_str("true"),
                    "False" => out.push_str("false"),
                    "None" => out.push_str("null"),
                    _ => out.push_str(&word),
                }
            }
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }

    Some(out)
}

/// Read a quoted string starting at `start`, returning it as a JSON string
fn read_string(chars: &[char], start: usize) -> Option<(String, usize)> {
    let quote = chars[start];
    let mut value = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            let escaped = *chars.get(i + 1)?;
            match escaped {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                '0' => value.push('\0'),
                '\\' => value.push('\\'),
                '\'' => value.push('\''),
                '"' => value.push('"'),
                other => {
                    value.push('\\');
                    value.push(other);
                }
            }
            i += 2;
            continue;
        }
        if ch == quote {
            let encoded = serde_json::to_string(&value).ok()?;
            return Some((encoded, i + 1));
        }
        value.push(ch);
        i += 1;
    }

    // Unterminated string
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_quoted_dict() {
        let value = parse_python_literal("{'name': 'file_read', 'arguments': {'file_path': 'a.py'}}").unwrap();
        assert_eq!(
            value,
            json!({"name": "file_read", "arguments": {"file_path": "a.py"}})
        );
    }

    #[test]
    fn test_python_constants_and_tuples() {
        let value = parse_python_literal("{'ok': True, 'missing': None, 'pair': (1, False)}").unwrap();
        assert_eq!(value, json!({"ok": true, "missing": null, "pair": [1, false]}));
    }

    #[test]
    fn test_quotes_inside_strings() {
        let value = parse_python_literal(r#"{'content': 'print("hi")\n', "it's": 'don\'t'}"#).unwrap();
        assert_eq!(value["content"], "print(\"hi\")\n");
        assert_eq!(value["it's"], "don't");
    }

    #[test]
    fn test_constant_names_inside_strings_untouched() {
        let value = parse_python_literal("{'text': 'True or None'}").unwrap();
        assert_eq!(value["text"], "True or None");
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_python_literal("{'unterminated: 1}").is_none());
        assert!(parse_python_literal("not a literal at all").is_none());
    }
}
