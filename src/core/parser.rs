use crate::{JSError, core::Token, raise_internal_error, raise_parse_error};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    StrictEqual,
    NotEqual,
    StrictNotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    LogicalAnd,
    LogicalOr,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64),
    StringLit(String),
    Boolean(bool),
    Null,
    Identifier(String),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Assignment(AssignOp, Box<Expr>, Box<Expr>),
    /// `++`/`--`; the flag is true for the prefix form.
    Update(UpdateOp, Box<Expr>, bool),
    Call(Box<Expr>, Vec<Expr>),
    /// `object.name`
    Property(Box<Expr>, String),
    /// `object[key]`
    Index(Box<Expr>, Box<Expr>),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
}

/// Explicit parser state: the token sequence plus a cursor. `save`/`restore`
/// back the single speculative decision in the grammar (`for` vs
/// `for-in`/`for-of`).
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream { tokens, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the next token if it equals `expected`.
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, expected: &Token) -> Result<(), JSError> {
        match self.peek() {
            Some(found) if found == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(raise_parse_error!("Expected '{}' but found '{}'", expected, found)),
            None => Err(raise_parse_error!("Expected '{}' but reached end of input", expected)),
        }
    }

    pub fn save(&self) -> usize {
        self.pos
    }

    pub fn restore(&mut self, mark: usize) {
        self.pos = mark;
    }
}

pub fn parse_expression(stream: &mut TokenStream) -> Result<Expr, JSError> {
    parse_logical_or(stream)
}

fn parse_logical_or(stream: &mut TokenStream) -> Result<Expr, JSError> {
    let mut left = parse_logical_and(stream)?;
    while stream.eat(&Token::LogicalOr) {
        let right = parse_logical_and(stream)?;
        left = Expr::Binary(Box::new(left), BinaryOp::LogicalOr, Box::new(right));
    }
    Ok(left)
}

fn parse_logical_and(stream: &mut TokenStream) -> Result<Expr, JSError> {
    let mut left = parse_equality(stream)?;
    while stream.eat(&Token::LogicalAnd) {
        let right = parse_equality(stream)?;
        left = Expr::Binary(Box::new(left), BinaryOp::LogicalAnd, Box::new(right));
    }
    Ok(left)
}

fn parse_equality(stream: &mut TokenStream) -> Result<Expr, JSError> {
    let mut left = parse_relational(stream)?;
    loop {
        let op = match stream.peek() {
            Some(Token::Equal) => BinaryOp::Equal,
            Some(Token::StrictEqual) => BinaryOp::StrictEqual,
            Some(Token::NotEqual) => BinaryOp::NotEqual,
            Some(Token::StrictNotEqual) => BinaryOp::StrictNotEqual,
            _ => break,
        };
        stream.advance();
        let right = parse_relational(stream)?;
        left = Expr::Binary(Box::new(left), op, Box::new(right));
    }
    Ok(left)
}

fn parse_relational(stream: &mut TokenStream) -> Result<Expr, JSError> {
    let mut left = parse_additive(stream)?;
    loop {
        let op = match stream.peek() {
            Some(Token::LessThan) => BinaryOp::LessThan,
            Some(Token::GreaterThan) => BinaryOp::GreaterThan,
            Some(Token::LessEqual) => BinaryOp::LessEqual,
            Some(Token::GreaterEqual) => BinaryOp::GreaterEqual,
            _ => break,
        };
        stream.advance();
        let right = parse_additive(stream)?;
        left = Expr::Binary(Box::new(left), op, Box::new(right));
    }
    Ok(left)
}

fn parse_additive(stream: &mut TokenStream) -> Result<Expr, JSError> {
    let mut left = parse_multiplicative(stream)?;
    loop {
        let op = match stream.peek() {
            Some(Token::Plus) => BinaryOp::Add,
            Some(Token::Minus) => BinaryOp::Sub,
            _ => break,
        };
        stream.advance();
        let right = parse_multiplicative(stream)?;
        left = Expr::Binary(Box::new(left), op, Box::new(right));
    }
    Ok(left)
}

fn parse_multiplicative(stream: &mut TokenStream) -> Result<Expr, JSError> {
    let mut left = parse_primary(stream)?;
    loop {
        let op = match stream.peek() {
            Some(Token::Multiply) => BinaryOp::Mul,
            Some(Token::Divide) => BinaryOp::Div,
            Some(Token::Mod) => BinaryOp::Mod,
            _ => break,
        };
        stream.advance();
        let right = parse_primary(stream)?;
        left = Expr::Binary(Box::new(left), op, Box::new(right));
    }
    Ok(left)
}

fn parse_primary(stream: &mut TokenStream) -> Result<Expr, JSError> {
    let token = match stream.advance() {
        Some(t) => t,
        None => return Err(raise_parse_error!("Unexpected end of input in expression")),
    };
    match token {
        Token::Increment => {
            let argument = parse_primary(stream)?;
            Ok(Expr::Update(UpdateOp::Increment, Box::new(argument), true))
        }
        Token::Decrement => {
            let argument = parse_primary(stream)?;
            Ok(Expr::Update(UpdateOp::Decrement, Box::new(argument), true))
        }
        Token::Minus => {
            // A `-` in primary position only makes a negative numeric
            // literal; anything else here cannot be subtraction (there is
            // no left operand yet), so report it.
            match stream.peek() {
                Some(Token::Number(n)) => {
                    let n = -*n;
                    stream.advance();
                    Ok(Expr::Number(n))
                }
                Some(found) => Err(raise_parse_error!("Unexpected token '-' before '{}'", found)),
                None => Err(raise_parse_error!("Unexpected end of input after '-'")),
            }
        }
        Token::Number(n) => Ok(Expr::Number(n)),
        Token::StringLit(s) => Ok(Expr::StringLit(s)),
        Token::True => Ok(Expr::Boolean(true)),
        Token::False => Ok(Expr::Boolean(false)),
        Token::Null => Ok(Expr::Null),
        Token::LParen => {
            let inner = parse_expression(stream)?;
            stream.expect(&Token::RParen)?;
            Ok(inner)
        }
        Token::LBracket => parse_array_literal(stream),
        Token::LBrace => parse_object_literal(stream),
        Token::Identifier(name) => parse_identifier_chain(stream, name),
        other => Err(raise_parse_error!("Unexpected token '{}'", other)),
    }
}

fn parse_array_literal(stream: &mut TokenStream) -> Result<Expr, JSError> {
    let mut elements = Vec::new();
    loop {
        match stream.peek() {
            Some(Token::RBracket) => break,
            Some(Token::Comma) => {
                // Stray commas are skipped rather than producing holes.
                stream.advance();
                continue;
            }
            Some(_) => {
                elements.push(parse_expression(stream)?);
                stream.eat(&Token::Comma);
            }
            None => return Err(raise_parse_error!("Expected ']' but reached end of input")),
        }
    }
    stream.expect(&Token::RBracket)?;
    Ok(Expr::Array(elements))
}

fn parse_object_literal(stream: &mut TokenStream) -> Result<Expr, JSError> {
    let mut properties = Vec::new();
    loop {
        match stream.peek() {
            Some(Token::RBrace) => break,
            Some(Token::Comma) => {
                stream.advance();
                continue;
            }
            Some(Token::Identifier(_)) | Some(Token::StringLit(_)) => {
                let key = match stream.advance() {
                    Some(Token::Identifier(name)) => name,
                    Some(Token::StringLit(s)) => s,
                    other => {
                        return Err(raise_internal_error!(
                            "Token stream desynchronized at object key: {:?}",
                            other
                        ));
                    }
                };
                stream.expect(&Token::Colon)?;
                let value = parse_expression(stream)?;
                properties.push((key, value));
                stream.eat(&Token::Comma);
            }
            Some(found) => return Err(raise_parse_error!("Invalid object key '{}'", found)),
            None => return Err(raise_parse_error!("Expected '}}' but reached end of input")),
        }
    }
    stream.expect(&Token::RBrace)?;
    Ok(Expr::Object(properties))
}

/// An identifier may be followed by a left-associative chain of member
/// accesses and calls, then by at most one assignment or one postfix
/// update.
fn parse_identifier_chain(stream: &mut TokenStream, name: String) -> Result<Expr, JSError> {
    let mut node = Expr::Identifier(name);
    loop {
        match stream.peek() {
            Some(Token::Dot) => {
                stream.advance();
                match stream.advance() {
                    Some(Token::Identifier(property)) => {
                        node = Expr::Property(Box::new(node), property);
                    }
                    Some(found) => return Err(raise_parse_error!("Expected property name but found '{}'", found)),
                    None => return Err(raise_parse_error!("Expected property name but reached end of input")),
                }
            }
            Some(Token::LBracket) => {
                stream.advance();
                let key = parse_expression(stream)?;
                stream.expect(&Token::RBracket)?;
                node = Expr::Index(Box::new(node), Box::new(key));
            }
            Some(Token::LParen) => {
                stream.advance();
                let args = parse_arguments(stream)?;
                node = Expr::Call(Box::new(node), args);
            }
            _ => break,
        }
    }

    let assign_op = match stream.peek() {
        Some(Token::Assign) => Some(AssignOp::Assign),
        Some(Token::AddAssign) => Some(AssignOp::AddAssign),
        Some(Token::SubAssign) => Some(AssignOp::SubAssign),
        Some(Token::MulAssign) => Some(AssignOp::MulAssign),
        Some(Token::DivAssign) => Some(AssignOp::DivAssign),
        _ => None,
    };
    if let Some(op) = assign_op {
        stream.advance();
        let value = parse_expression(stream)?;
        return Ok(Expr::Assignment(op, Box::new(node), Box::new(value)));
    }

    match stream.peek() {
        Some(Token::Increment) => {
            stream.advance();
            Ok(Expr::Update(UpdateOp::Increment, Box::new(node), false))
        }
        Some(Token::Decrement) => {
            stream.advance();
            Ok(Expr::Update(UpdateOp::Decrement, Box::new(node), false))
        }
        _ => Ok(node),
    }
}

fn parse_arguments(stream: &mut TokenStream) -> Result<Vec<Expr>, JSError> {
    let mut args = Vec::new();
    loop {
        match stream.peek() {
            Some(Token::RParen) => break,
            Some(_) => {
                args.push(parse_expression(stream)?);
                stream.eat(&Token::Comma);
            }
            None => return Err(raise_parse_error!("Expected ')' but reached end of input")),
        }
    }
    stream.expect(&Token::RParen)?;
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenize;

    fn expr(src: &str) -> Expr {
        let mut stream = TokenStream::new(tokenize(src).unwrap());
        parse_expression(&mut stream).unwrap()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        match expr("1 + 2 * 3") {
            Expr::Binary(_, BinaryOp::Add, right) => {
                assert!(matches!(*right, Expr::Binary(_, BinaryOp::Mul, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn parentheses_override_precedence() {
        match expr("(1 + 2) * 3") {
            Expr::Binary(left, BinaryOp::Mul, _) => {
                assert!(matches!(*left, Expr::Binary(_, BinaryOp::Add, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn member_chain_is_left_associative() {
        match expr("a.b[0](1)") {
            Expr::Call(callee, args) => {
                assert_eq!(args.len(), 1);
                assert!(matches!(*callee, Expr::Index(_, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn negative_literal_versus_subtraction() {
        assert!(matches!(expr("-5"), Expr::Number(n) if n == -5.0));
        assert!(matches!(expr("1 - 5"), Expr::Binary(_, BinaryOp::Sub, _)));
        assert!(matches!(expr("2 * -3"), Expr::Binary(_, BinaryOp::Mul, _)));
    }

    #[test]
    fn assignment_after_member_chain() {
        match expr("a[0] = 9") {
            Expr::Assignment(AssignOp::Assign, target, _) => {
                assert!(matches!(*target, Expr::Index(_, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn prefix_and_postfix_updates() {
        assert!(matches!(expr("++x"), Expr::Update(UpdateOp::Increment, _, true)));
        assert!(matches!(expr("x--"), Expr::Update(UpdateOp::Decrement, _, false)));
    }

    #[test]
    fn unexpected_token_is_named() {
        let mut stream = TokenStream::new(tokenize("1 + *").unwrap());
        let err = parse_expression(&mut stream).unwrap_err();
        assert!(err.to_string().contains('*'), "got: {}", err);
    }
}
