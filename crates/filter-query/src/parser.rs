//! Search phrase parser.
//!
//! Turns the text a user types into a [`Node`] tree.
//!
//! # Grammar
//!
//! ```text
//! query      = orExp
//! orExp      = andExp *( ("or" / "||" / "|") andExp )
//! andExp     = notExp *( [ "and" / "&&" / "&" ] notExp )
//! notExp     = ("not" / "!") notExp / primary
//! primary    = "(" orExp ")" / compareOp value / value [ compareOp value ]
//! compareOp  = "=" / "==" / "!=" / "<>" / ">" / ">=" / "<" / "<=" / "~" / "!~"
//! value      = word / quoted string
//! ```
//!
//! # Example
//!
//! ```
//! use filter_query::parser::parse;
//!
//! // Keyword and explicit comparison, implicitly ANDed
//! let ast = parse(r#"web created > "3 days ago""#).unwrap();
//! assert!(ast.is_some());
//! ```

use crate::ast::{Connective, Node, Operator};
use crate::error::ParseError;

/// Kinds of lexical tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare word or quoted string.
    Value(String),
    /// A comparison operator.
    Operator(Operator),
    /// `and`, `&&` or `&`.
    And,
    /// `or`, `||` or `|`.
    Or,
    /// `not` or `!`.
    Not,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
}

/// A token with its byte offset in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was read.
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub position: usize,
}

/// Characters that end a bare word.
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\'' | '&' | '|' | '!' | '=' | '<' | '>' | '~')
}

/// Splits `input` into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match c {
            '(' => {
                chars.next();
                TokenKind::LeftParen
            }
            ')' => {
                chars.next();
                TokenKind::RightParen
            }
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, next)) = chars.next() {
                    match next {
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        q if q == c => {
                            closed = true;
                            break;
                        }
                        other => value.push(other),
                    }
                }
                if !closed {
                    return Err(ParseError::new("unterminated string", position));
                }
                TokenKind::Value(value)
            }
            '&' | '|' => {
                chars.next();
                if chars.peek().map(|&(_, n)| n) == Some(c) {
                    chars.next();
                }
                if c == '&' {
                    TokenKind::And
                } else {
                    TokenKind::Or
                }
            }
            '!' | '=' | '<' | '>' | '~' => {
                chars.next();
                let next = chars.peek().map(|&(_, n)| n);
                let two: Option<String> = next.map(|n| [c, n].iter().collect());
                match two.as_deref().and_then(Operator::from_token) {
                    Some(op) => {
                        chars.next();
                        TokenKind::Operator(op)
                    }
                    None if c == '!' => TokenKind::Not,
                    None => match Operator::from_token(&c.to_string()) {
                        Some(op) => TokenKind::Operator(op),
                        None => {
                            return Err(ParseError::new(
                                format!("unexpected character '{}'", c),
                                position,
                            ));
                        }
                    },
                }
            }
            _ => {
                let mut word = String::new();
                while let Some(&(_, next)) = chars.peek() {
                    if is_delimiter(next) {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                match word.to_lowercase().as_str() {
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "not" => TokenKind::Not,
                    _ => TokenKind::Value(word),
                }
            }
        };

        tokens.push(Token { kind, position });
    }

    Ok(tokens)
}

/// Parses `input` into a tree. Blank input yields `None`.
pub fn parse(input: &str) -> Result<Option<Node>, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        end: input.len(),
    };
    let node = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(ParseError::new(
            "unexpected token after expression",
            token.position,
        ));
    }
    Ok(Some(node))
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn position(&self) -> usize {
        self.peek().map_or(self.end, |t| t.position)
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let mut children = vec![self.parse_and()?];
        while self.peek_kind() == Some(&TokenKind::Or) {
            self.advance();
            children.push(self.parse_and()?);
        }
        Ok(collapse(Connective::Or, children))
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let mut children = vec![self.parse_not()?];
        loop {
            match self.peek_kind() {
                Some(TokenKind::And) => {
                    self.advance();
                    children.push(self.parse_not()?);
                }
                Some(
                    TokenKind::Value(_)
                    | TokenKind::Operator(_)
                    | TokenKind::Not
                    | TokenKind::LeftParen,
                ) => children.push(self.parse_not()?),
                _ => break,
            }
        }
        Ok(collapse(Connective::And, children))
    }

    fn parse_not(&mut self) -> Result<Node, ParseError> {
        if self.peek_kind() == Some(&TokenKind::Not) {
            self.advance();
            let child = self.parse_not()?;
            return Ok(Node::logical(Connective::Not, vec![child]));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let position = self.position();
        match self.advance().map(|t| t.kind.clone()) {
            Some(TokenKind::LeftParen) => {
                let node = self.parse_or()?;
                if self.peek_kind() != Some(&TokenKind::RightParen) {
                    return Err(ParseError::new(
                        "expected closing parenthesis",
                        self.position(),
                    ));
                }
                self.advance();
                Ok(node)
            }
            Some(TokenKind::Operator(op)) => {
                let value = self.expect_value()?;
                Ok(Node::unary(op, Node::leaf(value)))
            }
            Some(TokenKind::Value(lhs)) => {
                if let Some(TokenKind::Operator(op)) = self.peek_kind().cloned() {
                    self.advance();
                    let rhs = self.expect_value()?;
                    Ok(Node::binary(Node::leaf(lhs), op, Node::leaf(rhs)))
                } else {
                    Ok(Node::leaf(lhs))
                }
            }
            Some(_) => Err(ParseError::new("unexpected token", position)),
            None => Err(ParseError::new("unexpected end of input", position)),
        }
    }

    fn expect_value(&mut self) -> Result<String, ParseError> {
        let position = self.position();
        match self.advance().map(|t| t.kind.clone()) {
            Some(TokenKind::Value(value)) => Ok(value),
            _ => Err(ParseError::new("expected value after operator", position)),
        }
    }
}

/// A single child stands alone; several become one logical node.
fn collapse(connective: Connective, mut children: Vec<Node>) -> Node {
    if children.len() == 1 {
        children.remove(0)
    } else {
        Node::logical(connective, children)
    }
}
