//! Line tokenizer for the assembly dialect.
//!
//! Splits one source line into tokens, each tagged with its 1-based
//! column for diagnostics. `#` starts a comment that runs to the end of
//! the line.

use super::error::{AsmError, AsmErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare identifier: mnemonic, register name, or label reference.
    Ident,
    /// An identifier introduced by a dot, e.g. `.word`.
    Directive,
    /// An integer literal (decimal or `0x` hex, optionally negative).
    Integer(i64),
    /// A double-quoted string literal, escapes resolved.
    Str(String),
    Comma,
    Colon,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub col: usize,
}

/// Tokenizes one line. `line_no` is used only for error positions.
pub fn tokenize_line(line: &str, line_no: usize) -> Result<Vec<Token>, AsmError> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let col = i + 1;
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            break;
        }

        match c {
            ',' => {
                tokens.push(simple(TokenKind::Comma, ",", col));
                i += 1;
            }
            ':' => {
                tokens.push(simple(TokenKind::Colon, ":", col));
                i += 1;
            }
            '(' => {
                tokens.push(simple(TokenKind::LParen, "(", col));
                i += 1;
            }
            ')' => {
                tokens.push(simple(TokenKind::RParen, ")", col));
                i += 1;
            }
            '"' => {
                let (text, len) = scan_string(&chars[i..], line_no, col)?;
                tokens.push(Token {
                    kind: TokenKind::Str(text),
                    text: chars[i..i + len].iter().collect(),
                    col,
                });
                i += len;
            }
            '.' | '_' => {
                let (token, len) = scan_word(&chars[i..], col);
                tokens.push(token);
                i += len;
            }
            c if c.is_ascii_alphabetic() => {
                let (token, len) = scan_word(&chars[i..], col);
                tokens.push(token);
                i += len;
            }
            c if c.is_ascii_digit() || c == '-' => {
                let (value, len) = scan_integer(&chars[i..], line_no, col)?;
                tokens.push(Token {
                    kind: TokenKind::Integer(value),
                    text: chars[i..i + len].iter().collect(),
                    col,
                });
                i += len;
            }
            other => {
                return Err(AsmError::new(
                    line_no,
                    col,
                    AsmErrorKind::UnexpectedChar(other),
                ))
            }
        }
    }

    Ok(tokens)
}

fn simple(kind: TokenKind, text: &str, col: usize) -> Token {
    Token {
        kind,
        text: text.to_string(),
        col,
    }
}

fn scan_word(chars: &[char], col: usize) -> (Token, usize) {
    let mut len = 1;
    while len < chars.len()
        && (chars[len].is_ascii_alphanumeric() || chars[len] == '_' || chars[len] == '.')
    {
        len += 1;
    }
    let text: String = chars[..len].iter().collect();
    let kind = if text.starts_with('.') {
        TokenKind::Directive
    } else {
        TokenKind::Ident
    };
    (Token { kind, text, col }, len)
}

fn scan_integer(chars: &[char], line_no: usize, col: usize) -> Result<(i64, usize), AsmError> {
    let negative = chars[0] == '-';
    let mut len = usize::from(negative);
    let start = len;

    let hex = chars.len() > start + 1 && chars[start] == '0' && matches!(chars[start + 1], 'x' | 'X');
    if hex {
        len += 2;
    }
    let digits_start = len;
    while len < chars.len()
        && (chars[len].is_ascii_hexdigit() && (hex || chars[len].is_ascii_digit()))
    {
        len += 1;
    }
    let digits: String = chars[digits_start..len].iter().collect();
    if digits.is_empty() {
        return Err(AsmError::new(
            line_no,
            col,
            AsmErrorKind::Expected("integer literal"),
        ));
    }

    let radix = if hex { 16 } else { 10 };
    let magnitude = i64::from_str_radix(&digits, radix).map_err(|_| {
        AsmError::new(
            line_no,
            col,
            AsmErrorKind::ImmediateRange {
                value: 0,
                width: 64,
            },
        )
    })?;
    Ok((if negative { -magnitude } else { magnitude }, len))
}

fn scan_string(
    chars: &[char],
    line_no: usize,
    col: usize,
) -> Result<(String, usize), AsmError> {
    let mut text = String::new();
    let mut i = 1;
    while i < chars.len() {
        match chars[i] {
            '"' => return Ok((text, i + 1)),
            '\\' => {
                let escape = chars.get(i + 1).ok_or_else(|| {
                    AsmError::new(line_no, col, AsmErrorKind::UnterminatedString)
                })?;
                text.push(match escape {
                    'n' => '\n',
                    't' => '\t',
                    '0' => '\0',
                    other => *other,
                });
                i += 2;
            }
            other => {
                text.push(other);
                i += 1;
            }
        }
    }
    Err(AsmError::new(line_no, col, AsmErrorKind::UnterminatedString))
}
