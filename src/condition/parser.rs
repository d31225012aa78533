//! Recursive-descent parser for condition expressions.
//!
//! ```text
//! expr       := and ("or" and)*
//! and        := not ("and" not)*
//! not        := "not" not | comparison
//! comparison := postfix (cmp_op postfix)*
//! cmp_op     := "==" | "!=" | "<" | "<=" | ">" | ">=" | "in" | "not" "in"
//! postfix    := atom ("." IDENT)*
//! atom       := literal | IDENT | IDENT "(" args ")" | "(" expr ")" | "[" args "]"
//! ```
use serde_json::Value;

use super::lexer::{Spanned, Token};
use crate::error::ConditionError;

/// Deepest nesting of parentheses, calls, lists, `not`, and operator chains
/// accepted before the expression is rejected.
pub(super) const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Expr {
    Literal(Value),
    Var(String),
    Attr(Box<Self>, String),
    Call(String, Vec<Self>),
    List(Vec<Self>),
    Not(Box<Self>),
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    /// `a < b <= c` is `a < b and b <= c`, evaluated left to right.
    Compare(Box<Self>, Vec<(CmpOp, Self)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

pub(super) fn parse(tokens: &[Spanned], src_len: usize) -> Result<Expr, ConditionError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        src_len,
        depth: 0,
    };
    let expr = parser.or()?;
    if let Some(extra) = parser.tokens.get(parser.pos) {
        return Err(ConditionError::Syntax {
            offset: extra.offset,
            message: "unexpected trailing input".to_string(),
        });
    }
    Ok(expr)
}

struct Parser<'t> {
    tokens: &'t [Spanned],
    pos: usize,
    src_len: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead).map(|s| &s.token)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.src_len, |s| s.offset)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<(), ConditionError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn error(&self, message: impl Into<String>) -> ConditionError {
        ConditionError::Syntax {
            offset: self.offset(),
            message: message.into(),
        }
    }

    /// Count one more level of nesting. Errors abort the whole parse, so the
    /// counter is only restored on success.
    fn descend(&mut self) -> Result<(), ConditionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(format!(
                "expression nested more than {MAX_DEPTH} levels deep"
            )));
        }
        Ok(())
    }

    fn or(&mut self) -> Result<Expr, ConditionError> {
        let depth = self.depth;
        let mut lhs = self.and()?;
        while self.eat(&Token::Or) {
            self.descend()?;
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, ConditionError> {
        let depth = self.depth;
        let mut lhs = self.not()?;
        while self.eat(&Token::And) {
            self.descend()?;
            let rhs = self.not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn not(&mut self) -> Result<Expr, ConditionError> {
        if self.eat(&Token::Not) {
            self.descend()?;
            let inner = self.not()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ConditionError> {
        let first = self.postfix()?;
        let mut rest = Vec::new();
        while let Some(op) = self.cmp_op() {
            rest.push((op, self.postfix()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), rest))
        }
    }

    fn cmp_op(&mut self) -> Option<CmpOp> {
        let op = match self.peek()? {
            Token::Eq => CmpOp::Eq,
            Token::Ne => CmpOp::Ne,
            Token::Lt => CmpOp::Lt,
            Token::Le => CmpOp::Le,
            Token::Gt => CmpOp::Gt,
            Token::Ge => CmpOp::Ge,
            Token::In => CmpOp::In,
            Token::Not if self.peek_at(1) == Some(&Token::In) => {
                self.pos += 1;
                CmpOp::NotIn
            }
            _ => return None,
        };
        self.pos += 1;
        Some(op)
    }

    fn postfix(&mut self) -> Result<Expr, ConditionError> {
        let depth = self.depth;
        let mut expr = self.atom()?;
        while self.eat(&Token::Dot) {
            self.descend()?;
            match self.peek() {
                Some(Token::Ident(name)) => {
                    let name = name.clone();
                    self.pos += 1;
                    expr = Expr::Attr(Box::new(expr), name);
                }
                _ => return Err(self.error("expected attribute name after '.'")),
            }
        }
        self.depth = depth;
        Ok(expr)
    }

    fn atom(&mut self) -> Result<Expr, ConditionError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("unexpected end of expression"));
        };
        self.pos += 1;

        match token {
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::Int(i) => Ok(Expr::Literal(Value::from(i))),
            Token::Float(f) => Ok(Expr::Literal(
                serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
            )),
            Token::Ident(name) => Ok(match name.as_str() {
                "True" | "true" => Expr::Literal(Value::Bool(true)),
                "False" | "false" => Expr::Literal(Value::Bool(false)),
                "None" | "null" => Expr::Literal(Value::Null),
                _ if self.eat(&Token::LParen) => Expr::Call(name, self.nested_args(&Token::RParen)?),
                _ => Expr::Var(name),
            }),
            Token::LParen => {
                self.descend()?;
                let inner = self.or()?;
                self.expect(&Token::RParen, "')'")?;
                self.depth -= 1;
                Ok(inner)
            }
            Token::LBracket => Ok(Expr::List(self.nested_args(&Token::RBracket)?)),
            _ => {
                self.pos -= 1;
                Err(self.error("expected a value"))
            }
        }
    }

    /// [`Self::args`] one nesting level down.
    fn nested_args(&mut self, close: &Token) -> Result<Vec<Expr>, ConditionError> {
        self.descend()?;
        let items = self.args(close)?;
        self.depth -= 1;
        Ok(items)
    }

    /// Comma-separated expressions up to `close`, allowing a trailing comma.
    fn args(&mut self, close: &Token) -> Result<Vec<Expr>, ConditionError> {
        let mut items = Vec::new();
        while !self.eat(close) {
            items.push(self.or()?);
            if !self.eat(&Token::Comma) {
                let what = if *close == Token::RParen { "')'" } else { "']'" };
                self.expect(close, what)?;
                break;
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse_str(src: &str) -> Result<Expr, ConditionError> {
        parse(&tokenize(src)?, src.len())
    }

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Var(name.to_string()))
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(
            parse_str("a or b and c").unwrap(),
            Expr::Or(var("a"), Box::new(Expr::And(var("b"), var("c"))))
        );
    }

    #[test]
    fn not_in_is_one_operator() {
        assert_eq!(
            parse_str("'x' not in items").unwrap(),
            Expr::Compare(
                Box::new(Expr::Literal(Value::from("x"))),
                vec![(CmpOp::NotIn, Expr::Var("items".into()))]
            )
        );
    }

    #[test]
    fn calls_and_lists() {
        assert_eq!(
            parse_str("pyproject_get('project.name', [1, 2,])").unwrap(),
            Expr::Call(
                "pyproject_get".into(),
                vec![
                    Expr::Literal(Value::from("project.name")),
                    Expr::List(vec![
                        Expr::Literal(Value::from(1)),
                        Expr::Literal(Value::from(2))
                    ]),
                ]
            )
        );
    }

    #[test]
    fn member_access_chains() {
        assert_eq!(
            parse_str("adt.version").unwrap(),
            Expr::Attr(var("adt"), "version".into())
        );
    }

    #[test]
    fn syntax_errors() {
        assert!(parse_str("").is_err());
        assert!(parse_str("a and").is_err());
        assert!(parse_str("(a").is_err());
        assert!(parse_str("a b").is_err());
        assert!(parse_str("f(a b)").is_err());
    }

    #[test]
    fn nesting_is_bounded() {
        let ok = format!("{}a{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        assert!(parse_str(&ok).is_ok());

        let deep = format!("{}a{}", "(".repeat(100_000), ")".repeat(100_000));
        assert!(matches!(
            parse_str(&deep),
            Err(ConditionError::Syntax { ref message, .. }) if message.contains("nested")
        ));
        assert!(parse_str(&format!("{}a", "not ".repeat(100_000))).is_err());
        assert!(parse_str(&format!("a{}", " or a".repeat(100_000))).is_err());
        assert!(parse_str(&format!("a{}", ".b".repeat(100_000))).is_err());
        assert!(parse_str(&format!("{}1{}", "[".repeat(100_000), "]".repeat(100_000))).is_err());
    }

    #[test]
    fn depth_is_restored_between_siblings() {
        let siblings = vec!["(a and (b or c))"; 40].join(", ");
        assert!(parse_str(&format!("f({siblings})")).is_ok());
    }
}
