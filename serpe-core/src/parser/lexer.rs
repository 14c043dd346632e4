use std::fmt;

use super::error::{Span, UpiError, UpiErrorKind};
use crate::types::Radix;

/// Tokens of the pattern notation
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Ident(String),         // E, tresillo, B (transformer)
    Digits(String),        // 10010010, 8
    Codec(Radix, String),  // 0x94, 0o44, o44, d73 (digits without prefix)
    Morse(String),         // M:SOS, m:.-- (text after the colon)

    // Delimiters
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,
    Colon,        // :

    // Operators
    Plus,      // +
    Minus,     // -
    Star,      // *
    Greater,   // >
    Semicolon, // ;
    Tilde,     // ~
    At,        // @
    Pipe,      // |
    Percent,   // %

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "{}", name),
            Token::Digits(digits) => write!(f, "{}", digits),
            Token::Codec(radix, digits) => write!(f, "{}{}", radix.prefix(), digits),
            Token::Morse(text) => write!(f, "M:{}", text),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Greater => write!(f, ">"),
            Token::Semicolon => write!(f, ";"),
            Token::Tilde => write!(f, "~"),
            Token::At => write!(f, "@"),
            Token::Pipe => write!(f, "|"),
            Token::Percent => write!(f, "%"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Tokenizes notation text
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Lexer {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char {
            if accept(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Read the digits of a `0x` / `0o` literal; the prefix is consumed here
    fn read_prefixed(&mut self, radix: Radix, start: usize) -> Result<Token, UpiError> {
        self.advance();
        self.advance();
        let digits = self.read_while(|c| c.is_ascii_hexdigit());
        if digits.is_empty() {
            return Err(UpiError::new(
                UpiErrorKind::EmptyLiteral,
                format!("'{}' has no digits", radix.prefix()),
                Span::new(start, 2),
            ));
        }
        Ok(Token::Codec(radix, digits))
    }

    /// `M:` followed by letters, dots and dashes; a `-` here is a dash, not
    /// subtraction
    fn read_morse(&mut self, start: usize) -> Result<Token, UpiError> {
        self.advance();
        self.advance();
        let text = self.read_while(|c| c.is_alphabetic() || c == '.' || c == '-');
        if text.is_empty() {
            return Err(UpiError::new(
                UpiErrorKind::EmptyLiteral,
                "'M:' has no morse text",
                Span::new(start, 2),
            ));
        }
        Ok(Token::Morse(text))
    }

    /// Next token and where it starts
    pub fn next_token(&mut self) -> Result<SpannedToken, UpiError> {
        self.skip_whitespace();
        let start = self.position;

        let punct = match self.current_char {
            None => {
                return Ok(SpannedToken {
                    token: Token::Eof,
                    span: Span::new(start, 0),
                })
            }
            Some('(') => Some(Token::LeftParen),
            Some(')') => Some(Token::RightParen),
            Some('{') => Some(Token::LeftBrace),
            Some('}') => Some(Token::RightBrace),
            Some('[') => Some(Token::LeftBracket),
            Some(']') => Some(Token::RightBracket),
            Some(',') => Some(Token::Comma),
            Some(':') => Some(Token::Colon),
            Some('+') => Some(Token::Plus),
            Some('-') => Some(Token::Minus),
            Some('*') => Some(Token::Star),
            Some('>') => Some(Token::Greater),
            Some(';') => Some(Token::Semicolon),
            Some('~') => Some(Token::Tilde),
            Some('@') => Some(Token::At),
            Some('|') => Some(Token::Pipe),
            Some('%') => Some(Token::Percent),
            Some(_) => None,
        };
        if let Some(token) = punct {
            self.advance();
            return Ok(SpannedToken {
                token,
                span: Span::new(start, 1),
            });
        }

        let token = match self.current_char {
            Some('0') if matches!(self.peek(), Some('x' | 'X')) => {
                self.read_prefixed(Radix::Hex, start)?
            }
            Some('0') if matches!(self.peek(), Some('o' | 'O')) => {
                self.read_prefixed(Radix::Octal, start)?
            }
            Some('d' | 'D') if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.advance();
                Token::Codec(Radix::Decimal, self.read_while(|c| c.is_ascii_digit()))
            }
            Some('o' | 'O') if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.advance();
                Token::Codec(Radix::Octal, self.read_while(|c| c.is_ascii_digit()))
            }
            Some('m' | 'M') if self.peek() == Some(':') => self.read_morse(start)?,
            Some(ch) if ch.is_ascii_digit() => Token::Digits(self.read_while(|c| c.is_ascii_digit())),
            Some(ch) if ch.is_alphabetic() => Token::Ident(self.read_while(|c| c.is_alphabetic())),
            Some(ch) => {
                return Err(UpiError::new(
                    UpiErrorKind::UnexpectedToken,
                    format!("unexpected character '{}'", ch),
                    Span::new(start, 1),
                ))
            }
            None => Token::Eof,
        };

        Ok(SpannedToken {
            token,
            span: Span::new(start, self.position - start),
        })
    }

    /// Tokenize the entire input; the last token is always `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>, UpiError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.token, Token::Eof);
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }
}
