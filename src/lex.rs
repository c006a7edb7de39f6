use std::{fmt::Display, iter::Peekable, str::CharIndices};

use crate::CalcNumber;

#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    source_data: &'src str,
    source: Peekable<CharIndices<'src>>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source_data: source,
            source: source.char_indices().peekable(),
        }
    }

    /// Tokenizes the whole expression, stopping at the first lexical error.
    /// The returned stream is always terminated by a `Token::EndOfInput`.
    pub fn lex(mut self) -> Result<Vec<ContextualizedToken<'src>>, LexError<'src>> {
        let mut tokens = Vec::new();

        while let Some((start, c)) = self.source.next() {
            if let Some(token) = self.process_char(start, c)? {
                // Retrieve the lexeme from the source data, extracting either the token span or the remaining span if the pushed token is the last
                let lexeme = self.lexeme_from(start);

                tokens.push(ContextualizedToken {
                    token,
                    lexeme,
                    column: start,
                });
            }
        }

        tokens.push(ContextualizedToken {
            token: Token::EndOfInput,
            lexeme: "",
            column: self.source_data.len(),
        });

        Ok(tokens)
    }

    fn process_char(
        &mut self,
        start: usize,
        c: char,
    ) -> Result<Option<Token<'src>>, LexError<'src>> {
        match c {
            // Single characters
            '(' => Ok(Some(Token::LeftParen)),
            ')' => Ok(Some(Token::RightParen)),
            '+' => Ok(Some(Token::Plus)),
            '-' => Ok(Some(Token::Minus)),
            '*' => Ok(Some(Token::Star)),
            '/' => Ok(Some(Token::Slash)),
            '%' => Ok(Some(Token::Percent)),
            '^' => Ok(Some(Token::Caret)),
            '=' => Ok(Some(Token::Equal)),

            // Numeric literals
            c if c.is_ascii_digit() || c == '.' => self.scan_number(start, c).map(Some),

            // Whitespace
            c if c.is_whitespace() => Ok(None),

            // Identifiers
            c if c.is_ascii_alphabetic() || c == '_' => {
                let identifier =
                    if let Some((end, _)) = self.consume_while(Self::is_valid_for_identifier) {
                        &self.source_data[start..end]
                    } else {
                        &self.source_data[start..]
                    };

                Ok(Some(Token::Identifier(identifier)))
            }

            // Unknown character
            _ => Err(LexError::UnexpectedCharacter(c)),
        }
    }

    /// Scans a numeric literal. Disambiguation is base-prefix driven:
    /// a `0x`/`0X` prefix means base 16, a run of `0`/`1` digits directly
    /// followed by a `b`/`B` suffix means base 2, anything else is a base-10
    /// float. Integer literals of every base widen to `CalcNumber`.
    fn scan_number(&mut self, start: usize, c: char) -> Result<Token<'src>, LexError<'src>> {
        // Hex
        if c == '0' && (self.chase('x') || self.chase('X')) {
            self.consume_while(char::is_ascii_hexdigit);
            let digits = &self.lexeme_from(start)[2..];

            return match u64::from_str_radix(digits, 16) {
                Ok(value) => Ok(Token::Number(value as CalcNumber)),
                Err(_) => Err(LexError::InvalidNumericLiteral(self.lexeme_from(start))),
            };
        }

        // Binary (run of 0/1 digits ending with a 'b' suffix)
        if c == '0' || c == '1' {
            if let Some((end, 'b' | 'B')) = self.consume_while(|c| *c == '0' || *c == '1') {
                let digits = &self.source_data[start..end];

                // Consume the suffix
                self.source.next();

                return match u64::from_str_radix(digits, 2) {
                    Ok(value) => Ok(Token::Number(value as CalcNumber)),
                    Err(_) => Err(LexError::InvalidNumericLiteral(digits)),
                };
            }
        }

        // Decimal
        self.consume_while(|c| c.is_ascii_digit() || *c == '.');
        let literal = self.lexeme_from(start);

        literal
            .parse::<CalcNumber>()
            .map(Token::Number)
            .map_err(|_| LexError::InvalidNumericLiteral(literal))
    }

    fn chase(&mut self, expected: char) -> bool {
        self.source.next_if(|(_, c)| *c == expected).is_some()
    }

    fn consume_while(&mut self, f: impl Fn(&char) -> bool) -> Option<(usize, char)> {
        while self.source.next_if(|(_, c)| f(c)).is_some() {}
        self.source.peek().copied()
    }

    fn lexeme_from(&mut self, start: usize) -> &'src str {
        if let Some((end, _)) = self.source.peek() {
            &self.source_data[start..*end]
        } else {
            &self.source_data[start..]
        }
    }

    fn is_valid_for_identifier(c: &char) -> bool {
        c.is_ascii_alphanumeric() || *c == '_'
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Token<'src> {
    // One character
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Equal,
    // Literals
    Identifier(&'src str),
    Number(CalcNumber),
    EndOfInput,
}

#[derive(Debug, Copy, Clone)]
pub struct ContextualizedToken<'src> {
    pub token: Token<'src>,
    pub lexeme: &'src str,
    pub column: usize,
}

impl<'src> Display for ContextualizedToken<'src> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lexeme = if let Token::EndOfInput = self.token {
            "end of input"
        } else {
            self.lexeme
        };

        write!(f, "\"{}\" @ column {}", lexeme, self.column)
    }
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum LexError<'src> {
    #[error("Invalid numeric literal \"{0}\".")]
    InvalidNumericLiteral(&'src str),

    #[error("Unexpected character \"{0}\".")]
    UnexpectedCharacter(char),
}
