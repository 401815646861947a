// src/query/columns.rs
// Column list parser: "timestamp, message|chars(80), labels.app as app"

use serde::Serialize;

use crate::error::{ClientError, Result};

/// A column modifier such as `chars(80)` or `upper`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modifier {
    pub name: String,
    pub args: Vec<String>,
}

/// One entry of a column list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub alias: Option<String>,
}

/// Parse a comma separated column list.
///
/// Commas inside quotes or modifier parentheses do not split entries.
/// Empty entries are skipped.
pub fn parse_columns(input: &str) -> Result<Vec<ColumnSpec>> {
    split_top_level(input, ',')?
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_column)
        .collect()
}

/// Names only, in order
pub fn column_names(input: &str) -> Result<Vec<String>> {
    Ok(parse_columns(input)?.into_iter().map(|c| c.name).collect())
}

fn parse_column(entry: &str) -> Result<ColumnSpec> {
    let (body, alias) = split_alias(entry);

    let mut parts = split_top_level(body, '|')?.into_iter().map(str::trim);
    let name = parts
        .next()
        .map(unquote)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ClientError::InvalidInput(format!("column '{}' has no name", entry)))?;

    let modifiers = parts.map(parse_modifier).collect::<Result<Vec<_>>>()?;

    Ok(ColumnSpec {
        name,
        modifiers,
        alias,
    })
}

fn split_alias(entry: &str) -> (&str, Option<String>) {
    let lower = entry.to_ascii_lowercase();
    match lower.rfind(" as ") {
        Some(pos) if !inside_group(entry, pos) => {
            let alias = entry[pos + 4..].trim();
            if alias.is_empty() {
                (entry, None)
            } else {
                (entry[..pos].trim_end(), Some(unquote(alias)))
            }
        }
        _ => (entry, None),
    }
}

fn inside_group(s: &str, pos: usize) -> bool {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        if i >= pos {
            break;
        }
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            _ => {}
        }
    }
    depth > 0 || quote.is_some()
}

fn parse_modifier(raw: &str) -> Result<Modifier> {
    let Some(open) = raw.find('(') else {
        if raw.is_empty() {
            return Err(ClientError::InvalidInput("empty column modifier".to_string()));
        }
        return Ok(Modifier {
            name: raw.to_string(),
            args: Vec::new(),
        });
    };

    let inner = raw[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| ClientError::InvalidInput(format!("unclosed modifier '{}'", raw)))?;
    let args = split_top_level(inner, ',')?
        .into_iter()
        .map(|a| unquote(a.trim()))
        .filter(|a| !a.is_empty())
        .collect();

    Ok(Modifier {
        name: raw[..open].trim().to_string(),
        args,
    })
}

fn split_top_level(input: &str, sep: char) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(ClientError::InvalidInput(format!(
                            "unbalanced ')' in '{}'",
                            input
                        )));
                    }
                }
                c if c == sep && depth == 0 => {
                    parts.push(&input[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }

    if quote.is_some() {
        return Err(ClientError::InvalidInput(format!("unterminated quote in '{}'", input)));
    }
    if depth != 0 {
        return Err(ClientError::InvalidInput(format!("unbalanced '(' in '{}'", input)));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_list() {
        let names = column_names("timestamp, level, message").unwrap();
        assert_eq!(names, vec!["timestamp", "level", "message"]);
    }

    #[test]
    fn test_skips_empty_entries() {
        let names = column_names(" a,, b ,").unwrap();
        assert_eq!(names, vec!["a", "b"]);
        assert!(column_names("").unwrap().is_empty());
    }

    #[test]
    fn test_modifiers_and_alias() {
        let cols = parse_columns("message|chars(80)|upper as msg, labels.app").unwrap();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].name, "message");
        assert_eq!(cols[0].alias.as_deref(), Some("msg"));
        assert_eq!(
            cols[0].modifiers,
            vec![
                Modifier {
                    name: "chars".into(),
                    args: vec!["80".into()]
                },
                Modifier {
                    name: "upper".into(),
                    args: vec![]
                },
            ]
        );
        assert_eq!(cols[1].name, "labels.app");
        assert!(cols[1].modifiers.is_empty());
    }

    #[test]
    fn test_comma_inside_modifier_args() {
        let names = column_names("msg|split(\",\", 2), host").unwrap();
        assert_eq!(names, vec!["msg", "host"]);
    }

    #[test]
    fn test_unbalanced_parens() {
        assert!(parse_columns("msg|chars(80").is_err());
        assert!(parse_columns("msg)").is_err());
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(parse_columns("\"msg").is_err());
    }

    #[test]
    fn test_missing_name() {
        assert!(parse_columns("|upper").is_err());
    }

    #[test]
    fn test_parsing_is_repeatable() {
        let input = "a, b|upper";
        assert_eq!(parse_columns(input).unwrap(), parse_columns(input).unwrap());
    }
}
