//! Tokenizer for condition expressions.
use crate::error::ConditionError;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    And,
    Or,
    Not,
    In,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
}

/// A token with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub(super) fn tokenize(src: &str) -> Result<Vec<Spanned>, ConditionError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '(' | ')' | '[' | ']' | ',' | '.' => {
                chars.next();
                match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    ',' => Token::Comma,
                    _ => Token::Dot,
                }
            }
            '=' | '!' | '<' | '>' => {
                chars.next();
                let followed_by_eq = chars.next_if(|&(_, n)| n == '=').is_some();
                match (c, followed_by_eq) {
                    ('=', true) => Token::Eq,
                    ('!', true) => Token::Ne,
                    ('<', true) => Token::Le,
                    ('>', true) => Token::Ge,
                    ('<', false) => Token::Lt,
                    ('>', false) => Token::Gt,
                    _ => return Err(syntax(offset, format!("unexpected '{c}'"))),
                }
            }
            '"' | '\'' => {
                chars.next();
                Token::Str(read_string(&mut chars, c, offset)?)
            }
            c if c.is_ascii_digit() => read_number(&mut chars, offset)?,
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some((_, n)) = chars.next_if(|&(_, n)| n.is_alphanumeric() || n == '_') {
                    word.push(n);
                }
                match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "in" => Token::In,
                    _ => Token::Ident(word),
                }
            }
            other => return Err(syntax(offset, format!("unexpected '{other}'"))),
        };
        tokens.push(Spanned { token, offset });
    }

    Ok(tokens)
}

type CharStream<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn read_string(chars: &mut CharStream<'_>, quote: char, start: usize) -> Result<String, ConditionError> {
    let mut out = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            c if c == quote => return Ok(out),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, other)) => out.push(other),
                None => break,
            },
            c => out.push(c),
        }
    }
    Err(syntax(start, "unterminated string"))
}

fn read_number(chars: &mut CharStream<'_>, start: usize) -> Result<Token, ConditionError> {
    let mut text = String::new();
    let mut seen_dot = false;
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() || c == '_' {
            text.push(c);
        } else if c == '.' && !seen_dot {
            // `1.x` is a member access on an integer, not a float.
            let mut lookahead = chars.clone();
            lookahead.next();
            if !lookahead.peek().is_some_and(|&(_, n)| n.is_ascii_digit()) {
                break;
            }
            seen_dot = true;
            text.push(c);
        } else {
            break;
        }
        chars.next();
    }

    let clean = text.replace('_', "");
    if seen_dot {
        clean
            .parse()
            .map(Token::Float)
            .map_err(|_| syntax(start, format!("invalid number '{text}'")))
    } else {
        clean
            .parse()
            .map(Token::Int)
            .map_err(|_| syntax(start, format!("invalid number '{text}'")))
    }
}

fn syntax(offset: usize, message: impl Into<String>) -> ConditionError {
    ConditionError::Syntax {
        offset,
        message: message.into(),
    }
}
