use crate::{JSError, raise_lex_error};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    StringLit(String),
    Identifier(String),
    True,
    False,
    Null,
    Function,
    Return,
    Let,
    Const,
    If,
    Else,
    Do,
    While,
    For,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Try,
    Catch,
    Finally,
    Throw,
    In,
    Of,
    Plus,
    Minus,
    Multiply,
    Divide,
    Mod,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
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
    Increment,
    Decrement,
    Arrow,
    QuestionMark,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semicolon,
    Colon,
    Comma,
    Dot,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::StringLit(s) => write!(f, "\"{}\"", s),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Function => write!(f, "function"),
            Token::Return => write!(f, "return"),
            Token::Let => write!(f, "let"),
            Token::Const => write!(f, "const"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::Do => write!(f, "do"),
            Token::While => write!(f, "while"),
            Token::For => write!(f, "for"),
            Token::Break => write!(f, "break"),
            Token::Continue => write!(f, "continue"),
            Token::Switch => write!(f, "switch"),
            Token::Case => write!(f, "case"),
            Token::Default => write!(f, "default"),
            Token::Try => write!(f, "try"),
            Token::Catch => write!(f, "catch"),
            Token::Finally => write!(f, "finally"),
            Token::Throw => write!(f, "throw"),
            Token::In => write!(f, "in"),
            Token::Of => write!(f, "of"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Multiply => write!(f, "*"),
            Token::Divide => write!(f, "/"),
            Token::Mod => write!(f, "%"),
            Token::Assign => write!(f, "="),
            Token::AddAssign => write!(f, "+="),
            Token::SubAssign => write!(f, "-="),
            Token::MulAssign => write!(f, "*="),
            Token::DivAssign => write!(f, "/="),
            Token::Equal => write!(f, "=="),
            Token::StrictEqual => write!(f, "==="),
            Token::NotEqual => write!(f, "!="),
            Token::StrictNotEqual => write!(f, "!=="),
            Token::LessThan => write!(f, "<"),
            Token::GreaterThan => write!(f, ">"),
            Token::LessEqual => write!(f, "<="),
            Token::GreaterEqual => write!(f, ">="),
            Token::LogicalAnd => write!(f, "&&"),
            Token::LogicalOr => write!(f, "||"),
            Token::Increment => write!(f, "++"),
            Token::Decrement => write!(f, "--"),
            Token::Arrow => write!(f, "=>"),
            Token::QuestionMark => write!(f, "?"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Semicolon => write!(f, ";"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
        }
    }
}

fn keyword_token(word: &str) -> Option<Token> {
    let token = match word {
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        "function" => Token::Function,
        "return" => Token::Return,
        "let" => Token::Let,
        "const" => Token::Const,
        "if" => Token::If,
        "else" => Token::Else,
        "do" => Token::Do,
        "while" => Token::While,
        "for" => Token::For,
        "break" => Token::Break,
        "continue" => Token::Continue,
        "switch" => Token::Switch,
        "case" => Token::Case,
        "default" => Token::Default,
        "try" => Token::Try,
        "catch" => Token::Catch,
        "finally" => Token::Finally,
        "throw" => Token::Throw,
        "in" => Token::In,
        "of" => Token::Of,
        _ => return None,
    };
    Some(token)
}

/// Strip `//` and `/* */` comments as a pure text pre-pass. Line comments
/// keep their trailing newline so later diagnostics stay roughly aligned
/// with the source. Comment markers inside string literals are left alone.
pub fn strip_comments(code: &str) -> Result<String, JSError> {
    let chars: Vec<char> = code.chars().collect();
    let mut result = String::with_capacity(code.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '"' | '\'' => {
                let quote = chars[i];
                result.push(quote);
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        result.push(chars[i]);
                        i += 1;
                    }
                    result.push(chars[i]);
                    i += 1;
                }
                if i < chars.len() {
                    result.push(quote);
                    i += 1;
                }
            }
            '/' if i + 1 < chars.len() && chars[i + 1] == '/' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if i + 1 < chars.len() && chars[i + 1] == '*' => {
                let mut j = i + 2;
                loop {
                    if j + 1 >= chars.len() {
                        return Err(raise_lex_error!("Unterminated block comment"));
                    }
                    if chars[j] == '*' && chars[j + 1] == '/' {
                        break;
                    }
                    j += 1;
                }
                i = j + 2;
            }
            c => {
                result.push(c);
                i += 1;
            }
        }
    }
    Ok(result)
}

fn parse_string_literal(chars: &[char], i: &mut usize, quote: char) -> Result<String, JSError> {
    let mut result = String::new();
    while *i < chars.len() && chars[*i] != quote {
        if chars[*i] == '\\' {
            *i += 1;
            if *i >= chars.len() {
                return Err(raise_lex_error!("Unterminated string literal"));
            }
            match chars[*i] {
                'n' => result.push('\n'),
                't' => result.push('\t'),
                'r' => result.push('\r'),
                '"' => result.push('"'),
                '\'' => result.push('\''),
                '\\' => result.push('\\'),
                other => {
                    // Unknown escape: keep the character as-is.
                    result.push(other);
                }
            }
        } else {
            result.push(chars[*i]);
        }
        *i += 1;
    }
    if *i >= chars.len() {
        return Err(raise_lex_error!("Unterminated string literal"));
    }
    *i += 1; // consume closing quote
    Ok(result)
}

/// Convert source text into a token sequence. Literals are classified
/// before keywords, keywords before identifiers (whole-word discipline so
/// `index` never splits into `in` + `dex`), and multi-character operators
/// before their single-character prefixes.
pub fn tokenize(source: &str) -> Result<Vec<Token>, JSError> {
    let clean = strip_comments(source)?;
    let chars: Vec<char> = clean.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            c if c.is_whitespace() => i += 1,
            '"' | '\'' => {
                let quote = chars[i];
                i += 1;
                let s = parse_string_literal(&chars, &mut i, quote)?;
                tokens.push(Token::StringLit(s));
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i < chars.len() && chars[i] == '.' {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| raise_lex_error!("Invalid number literal '{}'", text))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match keyword_token(&word) {
                    Some(token) => tokens.push(token),
                    None => tokens.push(Token::Identifier(word)),
                }
            }
            '+' => {
                if i + 1 < chars.len() && chars[i + 1] == '+' {
                    tokens.push(Token::Increment);
                    i += 2;
                } else if i + 1 < chars.len() && chars[i + 1] == '=' {
                    tokens.push(Token::AddAssign);
                    i += 2;
                } else {
                    tokens.push(Token::Plus);
                    i += 1;
                }
            }
            '-' => {
                if i + 1 < chars.len() && chars[i + 1] == '-' {
                    tokens.push(Token::Decrement);
                    i += 2;
                } else if i + 1 < chars.len() && chars[i + 1] == '=' {
                    tokens.push(Token::SubAssign);
                    i += 2;
                } else {
                    tokens.push(Token::Minus);
                    i += 1;
                }
            }
            '*' => {
                if i + 1 < chars.len() && chars[i + 1] == '=' {
                    tokens.push(Token::MulAssign);
                    i += 2;
                } else {
                    tokens.push(Token::Multiply);
                    i += 1;
                }
            }
            '/' => {
                if i + 1 < chars.len() && chars[i + 1] == '=' {
                    tokens.push(Token::DivAssign);
                    i += 2;
                } else {
                    tokens.push(Token::Divide);
                    i += 1;
                }
            }
            '%' => {
                tokens.push(Token::Mod);
                i += 1;
            }
            '=' => {
                if i + 2 < chars.len() && chars[i + 1] == '=' && chars[i + 2] == '=' {
                    tokens.push(Token::StrictEqual);
                    i += 3;
                } else if i + 1 < chars.len() && chars[i + 1] == '=' {
                    tokens.push(Token::Equal);
                    i += 2;
                } else if i + 1 < chars.len() && chars[i + 1] == '>' {
                    tokens.push(Token::Arrow);
                    i += 2;
                } else {
                    tokens.push(Token::Assign);
                    i += 1;
                }
            }
            '!' => {
                if i + 2 < chars.len() && chars[i + 1] == '=' && chars[i + 2] == '=' {
                    tokens.push(Token::StrictNotEqual);
                    i += 3;
                } else if i + 1 < chars.len() && chars[i + 1] == '=' {
                    tokens.push(Token::NotEqual);
                    i += 2;
                } else {
                    return Err(raise_lex_error!("Unexpected input near '{}'", remainder(&chars, i)));
                }
            }
            '<' => {
                if i + 1 < chars.len() && chars[i + 1] == '=' {
                    tokens.push(Token::LessEqual);
                    i += 2;
                } else {
                    tokens.push(Token::LessThan);
                    i += 1;
                }
            }
            '>' => {
                if i + 1 < chars.len() && chars[i + 1] == '=' {
                    tokens.push(Token::GreaterEqual);
                    i += 2;
                } else {
                    tokens.push(Token::GreaterThan);
                    i += 1;
                }
            }
            '&' => {
                if i + 1 < chars.len() && chars[i + 1] == '&' {
                    tokens.push(Token::LogicalAnd);
                    i += 2;
                } else {
                    return Err(raise_lex_error!("Unexpected input near '{}'", remainder(&chars, i)));
                }
            }
            '|' => {
                if i + 1 < chars.len() && chars[i + 1] == '|' {
                    tokens.push(Token::LogicalOr);
                    i += 2;
                } else {
                    return Err(raise_lex_error!("Unexpected input near '{}'", remainder(&chars, i)));
                }
            }
            '?' => {
                tokens.push(Token::QuestionMark);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            '{' => {
                tokens.push(Token::LBrace);
                i += 1;
            }
            '}' => {
                tokens.push(Token::RBrace);
                i += 1;
            }
            ';' => {
                tokens.push(Token::Semicolon);
                i += 1;
            }
            ':' => {
                tokens.push(Token::Colon);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            _ => {
                return Err(raise_lex_error!("Unexpected input near '{}'", remainder(&chars, i)));
            }
        }
    }
    log::trace!("tokenize: {} tokens", tokens.len());
    Ok(tokens)
}

fn remainder(chars: &[char], i: usize) -> String {
    chars[i..].iter().take(16).collect()
}
