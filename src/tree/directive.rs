//! `@Directive(...)` parsing.
//!
//! Attribute and scalar-tag text whose first non-whitespace character
//! is `@` is a compiler directive call: `@Clear()`,
//! `@Embed(source='assets/icon.png')`, `@Resource(bundle='ui',
//! key='ok')`. Arguments are single- or double-quoted strings, either
//! positional or `key=value` named.

use crate::tagmodel::trim;

/// Outcome of parsing directive text. Argument validation (which
/// arguments are required) happens at node construction, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DirectiveParse {
    Clear,
    Embed {
        source: Option<String>,
    },
    Resource {
        bundle: Option<String>,
        key: Option<String>,
    },
    Malformed(String),
}

/// Parse directive text. `None` means the text is not a directive at
/// all and value resolution should continue normally.
pub(crate) fn parse(text: &str) -> Option<DirectiveParse> {
    let trimmed = trim(text);
    let rest = trimmed.strip_prefix('@')?;

    let Some(paren) = rest.find('(') else {
        return Some(DirectiveParse::Malformed(
            "directive is missing its argument list".to_string(),
        ));
    };
    let name = &rest[..paren];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(DirectiveParse::Malformed(format!(
            "'{name}' is not a directive name"
        )));
    }
    let args = match parse_arguments(&rest[paren..]) {
        Ok(args) => args,
        Err(message) => return Some(DirectiveParse::Malformed(message)),
    };

    Some(match name {
        "Clear" => DirectiveParse::Clear,
        "Embed" => DirectiveParse::Embed {
            source: named_or_positional(&args, "source", 0),
        },
        "Resource" => DirectiveParse::Resource {
            bundle: named_or_positional(&args, "bundle", 0),
            key: named_or_positional(&args, "key", 1),
        },
        other => DirectiveParse::Malformed(format!("unknown directive '@{other}'")),
    })
}

/// One parsed argument: an optional name and a quoted value.
type Argument = (Option<String>, String);

fn named_or_positional(args: &[Argument], name: &str, position: usize) -> Option<String> {
    if let Some((_, value)) = args.iter().find(|(n, _)| n.as_deref() == Some(name)) {
        return Some(value.clone());
    }
    // Positional arguments only count among other positionals.
    args.iter()
        .filter(|(n, _)| n.is_none())
        .nth(position)
        .map(|(_, value)| value.clone())
}

/// Parse `(...)` starting at the opening parenthesis.
fn parse_arguments(text: &str) -> Result<Vec<Argument>, String> {
    let mut cursor = Cursor::new(text);
    cursor.expect('(')?;
    let mut args = Vec::new();

    cursor.skip_whitespace();
    if !cursor.eat(')') {
        loop {
            args.push(cursor.argument()?);
            cursor.skip_whitespace();
            if cursor.eat(',') {
                continue;
            }
            cursor.expect(')')?;
            break;
        }
    }
    cursor.skip_whitespace();
    if !cursor.at_end() {
        return Err("unexpected text after directive arguments".to_string());
    }
    Ok(args)
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn at_end(&self) -> bool {
        self.rest.is_empty()
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), String> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(format!("expected '{c}' in directive arguments"))
        }
    }

    fn argument(&mut self) -> Result<Argument, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('\'' | '"') => Ok((None, self.quoted()?)),
            Some(c) if c.is_ascii_alphabetic() => {
                let name = self.identifier();
                self.skip_whitespace();
                self.expect('=')?;
                self.skip_whitespace();
                Ok((Some(name), self.quoted()?))
            }
            _ => Err("expected a quoted string or name=value argument".to_string()),
        }
    }

    fn identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        name
    }

    fn quoted(&mut self) -> Result<String, String> {
        let quote = self.bump().filter(|c| matches!(c, '\'' | '"'));
        let Some(quote) = quote else {
            return Err("expected a quoted string".to_string());
        };
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
                None => return Err("unterminated string in directive arguments".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_directives_pass_through() {
        assert_eq!(parse("hello"), None);
        assert_eq!(parse("{binding}"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn clear_takes_no_arguments() {
        assert_eq!(parse("@Clear()"), Some(DirectiveParse::Clear));
        assert_eq!(parse("  @Clear()  "), Some(DirectiveParse::Clear));
    }

    #[test]
    fn embed_positional_and_named() {
        assert_eq!(
            parse("@Embed('assets/icon.png')"),
            Some(DirectiveParse::Embed {
                source: Some("assets/icon.png".to_string())
            })
        );
        assert_eq!(
            parse("@Embed(source=\"assets/icon.png\")"),
            Some(DirectiveParse::Embed {
                source: Some("assets/icon.png".to_string())
            })
        );
        assert_eq!(parse("@Embed()"), Some(DirectiveParse::Embed { source: None }));
    }

    #[test]
    fn resource_named_arguments() {
        assert_eq!(
            parse("@Resource(bundle='strings', key='ok')"),
            Some(DirectiveParse::Resource {
                bundle: Some("strings".to_string()),
                key: Some("ok".to_string()),
            })
        );
        assert_eq!(
            parse("@Resource('strings', 'ok')"),
            Some(DirectiveParse::Resource {
                bundle: Some("strings".to_string()),
                key: Some("ok".to_string()),
            })
        );
        assert_eq!(
            parse("@Resource(key='ok')"),
            Some(DirectiveParse::Resource {
                bundle: None,
                key: Some("ok".to_string()),
            })
        );
    }

    #[test]
    fn malformed_directives_are_reported() {
        assert!(matches!(parse("@Embed"), Some(DirectiveParse::Malformed(_))));
        assert!(matches!(
            parse("@Embed('x' extra)"),
            Some(DirectiveParse::Malformed(_))
        ));
        assert!(matches!(
            parse("@Embed('unterminated)"),
            Some(DirectiveParse::Malformed(_))
        ));
        assert!(matches!(
            parse("@Nonsense()"),
            Some(DirectiveParse::Malformed(_))
        ));
    }
}
