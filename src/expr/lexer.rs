//! Tokenizer for the calculated-setting expression language.

use super::error::ExprError;

/// A single token with its byte offset in the source script.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),

    Return,
    Var,
    True,
    False,
    Null,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Eq,
    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Question,
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Comma,
    Semi,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut offset = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = offset;

        // Whitespace
        if c.is_whitespace() {
            i += 1;
            offset += c.len_utf8();
            continue;
        }

        // Line and block comments
        if c == '/' && i + 1 < chars.len() {
            if chars[i + 1] == '/' {
                while i < chars.len() && chars[i] != '\n' {
                    offset += chars[i].len_utf8();
                    i += 1;
                }
                continue;
            }
            if chars[i + 1] == '*' {
                i += 2;
                offset += 2;
                while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                    offset += chars[i].len_utf8();
                    i += 1;
                }
                if i + 1 >= chars.len() {
                    return Err(ExprError::syntax(start, "unterminated block comment"));
                }
                i += 2;
                offset += 2;
                continue;
            }
        }

        // Identifiers and keywords
        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            let mut ident = String::new();
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                ident.push(chars[i]);
                offset += 1;
                i += 1;
            }
            let kind = match ident.as_str() {
                "return" => TokenKind::Return,
                "var" | "let" => TokenKind::Var,
                "true" => TokenKind::True,
                "false" => TokenKind::False,
                "null" => TokenKind::Null,
                _ => TokenKind::Ident(ident),
            };
            tokens.push(Token {
                kind,
                offset: start,
            });
            continue;
        }

        // Numbers
        if c.is_ascii_digit() {
            let mut text = String::new();
            while i < chars.len() && chars[i].is_ascii_digit() {
                text.push(chars[i]);
                i += 1;
                offset += 1;
            }
            if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
                text.push('.');
                i += 1;
                offset += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    text.push(chars[i]);
                    i += 1;
                    offset += 1;
                }
            }
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    while i < j {
                        text.push(chars[i]);
                        i += 1;
                        offset += 1;
                    }
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        text.push(chars[i]);
                        i += 1;
                        offset += 1;
                    }
                }
            }
            let value: f64 = text
                .parse()
                .map_err(|_| ExprError::syntax(start, format!("invalid number '{}'", text)))?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                offset: start,
            });
            continue;
        }

        // Strings (single or double quoted)
        if c == '"' || c == '\'' {
            let quote = c;
            let mut text = String::new();
            i += 1;
            offset += 1;
            let mut closed = false;
            while i < chars.len() {
                let ch = chars[i];
                if ch == '\\' && i + 1 < chars.len() {
                    let escaped = chars[i + 1];
                    text.push(match escaped {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        other => other,
                    });
                    offset += ch.len_utf8() + escaped.len_utf8();
                    i += 2;
                    continue;
                }
                if ch == quote {
                    closed = true;
                    i += 1;
                    offset += 1;
                    break;
                }
                text.push(ch);
                offset += ch.len_utf8();
                i += 1;
            }
            if !closed {
                return Err(ExprError::syntax(start, "unterminated string literal"));
            }
            tokens.push(Token {
                kind: TokenKind::Str(text),
                offset: start,
            });
            continue;
        }

        // Operators and punctuation
        let two = if i + 1 < chars.len() {
            Some((chars[i], chars[i + 1]))
        } else {
            None
        };
        let three = if i + 2 < chars.len() {
            Some((chars[i], chars[i + 1], chars[i + 2]))
        } else {
            None
        };

        // Strict equality collapses onto loose equality
        if let Some(('=', '=', '=')) = three {
            tokens.push(Token {
                kind: TokenKind::EqEq,
                offset: start,
            });
            i += 3;
            offset += 3;
            continue;
        }
        if let Some(('!', '=', '=')) = three {
            tokens.push(Token {
                kind: TokenKind::BangEq,
                offset: start,
            });
            i += 3;
            offset += 3;
            continue;
        }

        let kind = match two {
            Some(('=', '=')) => Some((TokenKind::EqEq, 2)),
            Some(('!', '=')) => Some((TokenKind::BangEq, 2)),
            Some(('<', '=')) => Some((TokenKind::LtEq, 2)),
            Some(('>', '=')) => Some((TokenKind::GtEq, 2)),
            Some(('&', '&')) => Some((TokenKind::AndAnd, 2)),
            Some(('|', '|')) => Some((TokenKind::OrOr, 2)),
            _ => None,
        };
        if let Some((kind, len)) = kind {
            tokens.push(Token {
                kind,
                offset: start,
            });
            i += len;
            offset += len;
            continue;
        }

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '!' => TokenKind::Bang,
            '=' => TokenKind::Eq,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semi,
            other => {
                return Err(ExprError::syntax(
                    start,
                    format!("unexpected character '{}'", other),
                ))
            }
        };
        tokens.push(Token {
            kind,
            offset: start,
        });
        i += 1;
        offset += c.len_utf8();
    }

    Ok(tokens)
}
