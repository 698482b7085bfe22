use crate::diagnostics::RuntimeError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(i64),
    Float(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Nil,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Bang,
    AndAnd,
    OrOr,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Eof,
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

pub(crate) struct Lexer {
    src: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            src: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.src.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    pub(crate) fn tokenize(&mut self) -> Result<Vec<Token>, RuntimeError> {
        let mut tokens = Vec::new();
        // A leading shebang is a comment, so script line numbers survive.
        if self.pos == 0 && self.peek() == Some('#') && self.peek_at(1) == Some('!') {
            self.skip_line();
        }
        loop {
            while let Some(c) = self.peek() {
                if c.is_whitespace() {
                    self.advance();
                } else if c == '/' && self.peek_at(1) == Some('/') {
                    self.skip_line();
                } else {
                    break;
                }
            }
            let (line, column) = (self.line, self.column);
            let Some(c) = self.advance() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };
            let kind = match c {
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                '=' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::EqEq
                    } else {
                        TokenKind::Eq
                    }
                }
                '!' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::BangEq
                    } else {
                        TokenKind::Bang
                    }
                }
                '<' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::Lte
                    } else {
                        TokenKind::Lt
                    }
                }
                '>' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::Gte
                    } else {
                        TokenKind::Gt
                    }
                }
                '&' => {
                    if self.peek() == Some('&') {
                        self.advance();
                        TokenKind::AndAnd
                    } else {
                        return Err(RuntimeError::syntax(
                            "unexpected character '&' (did you mean '&&'?)",
                            line,
                            column,
                        ));
                    }
                }
                '|' => {
                    if self.peek() == Some('|') {
                        self.advance();
                        TokenKind::OrOr
                    } else {
                        return Err(RuntimeError::syntax(
                            "unexpected character '|' (did you mean '||'?)",
                            line,
                            column,
                        ));
                    }
                }
                '"' => self.lex_string(line, column)?,
                c if c.is_ascii_digit() => self.lex_number(c, line, column)?,
                c if c.is_alphabetic() || c == '_' => self.lex_ident(c),
                other => {
                    return Err(RuntimeError::syntax(
                        format!("unexpected character {:?}", other),
                        line,
                        column,
                    ));
                }
            };
            tokens.push(Token { kind, line, column });
        }
    }

    fn lex_string(&mut self, line: usize, column: usize) -> Result<TokenKind, RuntimeError> {
        let mut s = String::new();
        loop {
            let Some(c) = self.advance() else {
                return Err(RuntimeError::syntax("unterminated string literal", line, column));
            };
            match c {
                '"' => return Ok(TokenKind::Str(s)),
                '\\' => {
                    let Some(esc) = self.advance() else {
                        return Err(RuntimeError::syntax(
                            "unterminated string literal",
                            line,
                            column,
                        ));
                    };
                    match esc {
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        'r' => s.push('\r'),
                        '\\' => s.push('\\'),
                        '"' => s.push('"'),
                        other => {
                            return Err(RuntimeError::syntax(
                                format!("unknown escape sequence '\\{}'", other),
                                self.line,
                                self.column,
                            ));
                        }
                    }
                }
                other => s.push(other),
            }
        }
    }

    fn lex_number(&mut self, first: char, line: usize, column: usize) -> Result<TokenKind, RuntimeError> {
        let mut digits = String::new();
        digits.push(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            digits.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            let value: f64 = digits.parse().map_err(|_| {
                RuntimeError::syntax(format!("invalid number literal '{}'", digits), line, column)
            })?;
            return Ok(TokenKind::Float(value));
        }
        let value: i64 = digits.parse().map_err(|_| {
            RuntimeError::syntax(
                format!("integer literal '{}' out of range", digits),
                line,
                column,
            )
        })?;
        Ok(TokenKind::Number(value))
    }

    fn lex_ident(&mut self, first: char) -> TokenKind {
        let mut name = String::new();
        name.push(first);
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        match name.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nil" => TokenKind::Nil,
            _ => TokenKind::Ident(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize().expect("tokenize")
    }

    #[test]
    fn positions_are_one_based() {
        let tokens = lex("let x = 1;");
        assert_eq!(tokens[0].kind, TokenKind::Ident("let".to_string()));
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!(tokens[1].kind, TokenKind::Ident("x".to_string()));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 5));
        assert_eq!(tokens[3].kind, TokenKind::Number(1));
        assert_eq!((tokens[3].line, tokens[3].column), (1, 9));
    }

    #[test]
    fn comments_and_newlines_advance_lines() {
        let tokens = lex("// header\nsay(1);");
        assert_eq!(tokens[0].kind, TokenKind::Ident("say".to_string()));
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn shebang_counts_as_first_line() {
        let tokens = lex("#!/usr/bin/env wsj\nlet x = 1;");
        assert_eq!(tokens[0].kind, TokenKind::Ident("let".to_string()));
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn string_escapes() {
        let tokens = lex(r#""a\nb""#);
        assert_eq!(tokens[0].kind, TokenKind::Str("a\nb".to_string()));
    }

    #[test]
    fn unterminated_string_is_positioned() {
        let err = Lexer::new("say(\"oops").tokenize().unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.line, Some(1));
        assert_eq!(err.column, Some(5));
    }

    #[test]
    fn float_and_int_literals() {
        let tokens = lex("1.5 2");
        assert_eq!(tokens[0].kind, TokenKind::Float(1.5));
        assert_eq!(tokens[1].kind, TokenKind::Number(2));
    }

    #[test]
    fn keywords_become_dedicated_tokens() {
        let tokens = lex("true false nil");
        assert_eq!(tokens[0].kind, TokenKind::True);
        assert_eq!(tokens[1].kind, TokenKind::False);
        assert_eq!(tokens[2].kind, TokenKind::Nil);
    }
}
