use crate::{
    JSError,
    core::{Expr, Token, TokenStream, parse_expression},
    raise_parse_error,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeclKind {
    Let,
    Const,
}

/// The loop variable of a `for...in` / `for...of` head: either a fresh
/// declaration or an existing binding.
#[derive(Debug, Clone)]
pub enum ForBinding {
    Declaration(DeclKind, String),
    Identifier(String),
}

#[derive(Debug, Clone)]
pub enum Statement {
    Empty,
    Block(Vec<Statement>),
    VariableDeclaration {
        kind: DeclKind,
        declarations: Vec<(String, Expr)>,
    },
    FunctionDeclaration(String, Vec<String>, Vec<Statement>),
    If(Expr, Box<Statement>, Option<Box<Statement>>),
    While(Expr, Box<Statement>),
    DoWhile(Box<Statement>, Expr),
    For {
        init: Option<Box<Statement>>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Statement>,
    },
    ForIn(ForBinding, Expr, Box<Statement>),
    ForOf(ForBinding, Expr, Box<Statement>),
    /// Cases in source order plus the optional default body. Cases are
    /// matched by strict equality; fallthrough runs subsequent case bodies
    /// until a `break`.
    Switch(Expr, Vec<(Expr, Vec<Statement>)>, Option<Vec<Statement>>),
    Try {
        block: Vec<Statement>,
        handler: Option<(String, Vec<Statement>)>,
        finalizer: Option<Vec<Statement>>,
    },
    Throw(Expr),
    Break,
    Continue,
    Return(Expr),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct Program {
    pub body: Vec<Statement>,
}

/// Consume the whole token sequence into a program.
pub fn parse(tokens: Vec<Token>) -> Result<Program, JSError> {
    let mut stream = TokenStream::new(tokens);
    let mut body = Vec::new();
    while !stream.is_empty() {
        body.push(parse_statement(&mut stream)?);
    }
    log::trace!("parse: {} top-level statements", body.len());
    Ok(Program { body })
}

fn parse_statement(stream: &mut TokenStream) -> Result<Statement, JSError> {
    match stream.peek() {
        Some(Token::Semicolon) => {
            stream.advance();
            Ok(Statement::Empty)
        }
        Some(Token::Let) | Some(Token::Const) => parse_variable_declaration(stream),
        Some(Token::Function) => parse_function_declaration(stream),
        Some(Token::Return) => {
            stream.advance();
            let argument = parse_expression(stream)?;
            Ok(Statement::Return(argument))
        }
        Some(Token::If) => parse_if(stream),
        Some(Token::While) => parse_while(stream),
        Some(Token::Do) => parse_do_while(stream),
        Some(Token::For) => parse_for(stream),
        Some(Token::Break) => {
            stream.advance();
            Ok(Statement::Break)
        }
        Some(Token::Continue) => {
            stream.advance();
            Ok(Statement::Continue)
        }
        Some(Token::Switch) => parse_switch(stream),
        Some(Token::Try) => parse_try(stream),
        Some(Token::Throw) => {
            stream.advance();
            let argument = parse_expression(stream)?;
            Ok(Statement::Throw(argument))
        }
        Some(_) => {
            let expr = parse_expression(stream)?;
            Ok(Statement::Expr(expr))
        }
        None => Err(raise_parse_error!("Unexpected end of input, expected a statement")),
    }
}

fn expect_identifier(stream: &mut TokenStream, what: &str) -> Result<String, JSError> {
    match stream.advance() {
        Some(Token::Identifier(name)) => Ok(name),
        Some(found) => Err(raise_parse_error!("Invalid {} '{}'", what, found)),
        None => Err(raise_parse_error!("Expected {} but reached end of input", what)),
    }
}

/// `let`/`const` take one or more comma-separated names, optionally
/// followed by `=` and a comma-separated initializer list zipped
/// positionally with the names; unmatched names default to `null`.
fn parse_variable_declaration(stream: &mut TokenStream) -> Result<Statement, JSError> {
    let kind = match stream.advance() {
        Some(Token::Const) => DeclKind::Const,
        _ => DeclKind::Let,
    };

    let mut names = Vec::new();
    loop {
        names.push(expect_identifier(stream, "variable name")?);
        if !stream.eat(&Token::Comma) {
            break;
        }
    }

    let mut inits = Vec::new();
    if stream.eat(&Token::Assign) {
        loop {
            inits.push(parse_expression(stream)?);
            if !stream.eat(&Token::Comma) {
                break;
            }
        }
    }

    let declarations = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let init = inits.get(i).cloned().unwrap_or(Expr::Null);
            (name, init)
        })
        .collect();
    Ok(Statement::VariableDeclaration { kind, declarations })
}

fn parse_parameters(stream: &mut TokenStream) -> Result<Vec<String>, JSError> {
    let mut params = Vec::new();
    loop {
        match stream.peek() {
            Some(Token::RParen) => break,
            Some(Token::Identifier(_)) => {
                params.push(expect_identifier(stream, "parameter name")?);
                stream.eat(&Token::Comma);
            }
            Some(found) => return Err(raise_parse_error!("Invalid parameter name '{}'", found)),
            None => return Err(raise_parse_error!("Expected ')' but reached end of input")),
        }
    }
    stream.expect(&Token::RParen)?;
    Ok(params)
}

fn parse_statement_block(stream: &mut TokenStream) -> Result<Vec<Statement>, JSError> {
    stream.expect(&Token::LBrace)?;
    let mut body = Vec::new();
    loop {
        match stream.peek() {
            Some(Token::RBrace) => break,
            Some(_) => body.push(parse_statement(stream)?),
            None => return Err(raise_parse_error!("Expected '}}' but reached end of input")),
        }
    }
    stream.expect(&Token::RBrace)?;
    Ok(body)
}

/// Loop and branch bodies are either a `{ ... }` block or a single
/// statement.
fn parse_block_or_statement(stream: &mut TokenStream) -> Result<Statement, JSError> {
    if stream.peek() == Some(&Token::LBrace) {
        Ok(Statement::Block(parse_statement_block(stream)?))
    } else {
        parse_statement(stream)
    }
}

fn parse_function_declaration(stream: &mut TokenStream) -> Result<Statement, JSError> {
    stream.advance(); // consume `function`
    let name = expect_identifier(stream, "function name")?;
    stream.expect(&Token::LParen)?;
    let params = parse_parameters(stream)?;
    let body = parse_statement_block(stream)?;
    Ok(Statement::FunctionDeclaration(name, params, body))
}

fn parse_if(stream: &mut TokenStream) -> Result<Statement, JSError> {
    stream.advance(); // consume `if`
    stream.expect(&Token::LParen)?;
    let test = parse_expression(stream)?;
    stream.expect(&Token::RParen)?;
    let consequent = Box::new(parse_block_or_statement(stream)?);
    let alternate = if stream.eat(&Token::Else) {
        Some(Box::new(parse_block_or_statement(stream)?))
    } else {
        None
    };
    Ok(Statement::If(test, consequent, alternate))
}

fn parse_while(stream: &mut TokenStream) -> Result<Statement, JSError> {
    stream.advance(); // consume `while`
    stream.expect(&Token::LParen)?;
    let test = parse_expression(stream)?;
    stream.expect(&Token::RParen)?;
    let body = Box::new(parse_block_or_statement(stream)?);
    Ok(Statement::While(test, body))
}

fn parse_do_while(stream: &mut TokenStream) -> Result<Statement, JSError> {
    stream.advance(); // consume `do`
    let body = Box::new(parse_block_or_statement(stream)?);
    stream.eat(&Token::Semicolon);
    stream.expect(&Token::While)?;
    stream.expect(&Token::LParen)?;
    let test = parse_expression(stream)?;
    stream.expect(&Token::RParen)?;
    stream.eat(&Token::Semicolon);
    Ok(Statement::DoWhile(body, test))
}

/// The one speculative point of the grammar: parse a left-hand binding
/// first, and only commit to `for-in`/`for-of` if the next token is
/// `in`/`of`; otherwise rewind and parse the classic three-clause form.
fn parse_for(stream: &mut TokenStream) -> Result<Statement, JSError> {
    stream.advance(); // consume `for`
    stream.expect(&Token::LParen)?;
    let mark = stream.save();

    if stream.peek() != Some(&Token::Semicolon) {
        let binding = match stream.peek() {
            Some(Token::Let) | Some(Token::Const) => {
                let kind = match stream.advance() {
                    Some(Token::Const) => DeclKind::Const,
                    _ => DeclKind::Let,
                };
                match stream.advance() {
                    Some(Token::Identifier(name)) => Some(ForBinding::Declaration(kind, name)),
                    _ => None,
                }
            }
            _ => match parse_expression(stream) {
                Ok(Expr::Identifier(name)) => Some(ForBinding::Identifier(name)),
                _ => None,
            },
        };

        let loop_kind = match stream.peek() {
            Some(Token::In) => Some(true),
            Some(Token::Of) => Some(false),
            _ => None,
        };
        if let Some(is_for_in) = loop_kind {
            let binding = binding
                .ok_or_else(|| raise_parse_error!("Invalid left-hand side in for-{} loop", if is_for_in { "in" } else { "of" }))?;
            stream.advance(); // consume `in`/`of`
            let right = parse_expression(stream)?;
            stream.expect(&Token::RParen)?;
            let body = Box::new(parse_block_or_statement(stream)?);
            return Ok(if is_for_in {
                Statement::ForIn(binding, right, body)
            } else {
                Statement::ForOf(binding, right, body)
            });
        }
    }

    // Not a for-in/for-of head: rewind and parse `init; test; update`.
    stream.restore(mark);
    let init = if stream.peek() != Some(&Token::Semicolon) {
        Some(Box::new(parse_statement(stream)?))
    } else {
        None
    };
    stream.eat(&Token::Semicolon);
    let test = if stream.peek() != Some(&Token::Semicolon) {
        Some(parse_expression(stream)?)
    } else {
        None
    };
    stream.eat(&Token::Semicolon);
    let update = if stream.peek() != Some(&Token::RParen) {
        Some(parse_expression(stream)?)
    } else {
        None
    };
    stream.expect(&Token::RParen)?;
    let body = Box::new(parse_block_or_statement(stream)?);
    Ok(Statement::For { init, test, update, body })
}

fn parse_switch(stream: &mut TokenStream) -> Result<Statement, JSError> {
    stream.advance(); // consume `switch`
    stream.expect(&Token::LParen)?;
    let discriminant = parse_expression(stream)?;
    stream.expect(&Token::RParen)?;
    stream.expect(&Token::LBrace)?;

    let mut cases = Vec::new();
    let mut default_body: Option<Vec<Statement>> = None;
    loop {
        match stream.peek() {
            Some(Token::RBrace) => break,
            Some(Token::Case) => {
                stream.advance();
                let test = parse_expression(stream)?;
                stream.expect(&Token::Colon)?;
                let mut body = Vec::new();
                while !matches!(
                    stream.peek(),
                    Some(Token::RBrace) | Some(Token::Case) | Some(Token::Default) | None
                ) {
                    body.push(parse_statement(stream)?);
                }
                cases.push((test, body));
            }
            Some(Token::Default) => {
                stream.advance();
                stream.expect(&Token::Colon)?;
                let mut body = Vec::new();
                while !matches!(stream.peek(), Some(Token::RBrace) | Some(Token::Case) | None) {
                    body.push(parse_statement(stream)?);
                }
                default_body = Some(body);
            }
            Some(found) => return Err(raise_parse_error!("Unexpected token '{}' in switch body", found)),
            None => return Err(raise_parse_error!("Expected '}}' but reached end of input")),
        }
    }
    stream.expect(&Token::RBrace)?;
    Ok(Statement::Switch(discriminant, cases, default_body))
}

fn parse_try(stream: &mut TokenStream) -> Result<Statement, JSError> {
    stream.advance(); // consume `try`
    let block = parse_statement_block(stream)?;

    let handler = if stream.eat(&Token::Catch) {
        stream.expect(&Token::LParen)?;
        let param = expect_identifier(stream, "catch parameter")?;
        stream.expect(&Token::RParen)?;
        let body = parse_statement_block(stream)?;
        Some((param, body))
    } else {
        None
    };

    let finalizer = if stream.eat(&Token::Finally) {
        Some(parse_statement_block(stream)?)
    } else {
        None
    };

    Ok(Statement::Try { block, handler, finalizer })
}
