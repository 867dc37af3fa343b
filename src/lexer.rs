use crate::error::TranslateError;

/// Token types for the notation language
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Command(String), // \relative, \tuplet, \major ...
    Word(String),    // c, fis, r, treble, NoteHead.color
    Marks(String),   // ' or , runs
    Number(String),  // 4, 8., 120
    Text(String),    // "Allegro", "|."
    Scheme(String),  // #red
    BlockComment(String),

    Slash,      // /
    Tie,        // ~
    Equals,     // =
    ChordOpen,  // <
    ChordClose, // >
    GroupOpen,  // {
    GroupClose, // }
    BarCheck,   // |
}

/// A token with its position in the source
#[derive(Debug, Clone)]
pub struct LocatedToken {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

/// Lexer for tokenizing notation text
pub struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
            position: 0,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(&c) = self.peek() {
            if !keep(c) {
                break;
            }
            text.push(c);
            self.advance();
        }
        text
    }

    fn check_block_comment(&self) -> bool {
        self.input[self.position..].starts_with("%{")
    }

    /// Consume `%{ ... %}` and return the inner text, trimmed
    fn block_comment(&mut self) -> Result<String, TranslateError> {
        self.advance(); // %
        self.advance(); // {
        let start = self.position;
        loop {
            if self.input[self.position..].starts_with("%}") {
                let content = self.input[start..self.position].trim().to_string();
                self.advance(); // %
                self.advance(); // }
                return Ok(content);
            }
            if self.advance().is_none() {
                return Err(TranslateError::UnexpectedEndOfInput {
                    expected: "'%}' closing the comment block".to_string(),
                });
            }
        }
    }

    fn quoted_text(&mut self) -> Result<String, TranslateError> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(text),
                Some('\\') => {
                    // \" and \\ inside strings
                    if let Some(escaped) = self.advance() {
                        text.push(escaped);
                    }
                }
                Some(c) => text.push(c),
                None => {
                    return Err(TranslateError::UnexpectedEndOfInput {
                        expected: "closing '\"'".to_string(),
                    })
                }
            }
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<LocatedToken>, TranslateError> {
        let mut tokens = Vec::new();

        while let Some(&c) = self.peek() {
            let line = self.line;
            let column = self.column;

            if c.is_whitespace() {
                self.advance();
                continue;
            }

            if self.check_block_comment() {
                let content = self.block_comment()?;
                tokens.push(LocatedToken {
                    token: Token::BlockComment(content),
                    line,
                    column,
                });
                continue;
            }

            let token = match c {
                '%' => {
                    // line comment
                    self.take_while(|c| c != '\n');
                    continue;
                }
                '\\' => {
                    self.advance();
                    let name = self.take_while(|c| c.is_ascii_alphabetic());
                    if name.is_empty() {
                        return Err(TranslateError::UnknownToken(format!(
                            "'\\' at line {}, column {}",
                            line, column
                        )));
                    }
                    Token::Command(name)
                }
                'a'..='z' | 'A'..='Z' => {
                    Token::Word(self.take_while(|c| c.is_ascii_alphabetic() || c == '.'))
                }
                '0'..='9' => {
                    let mut number = self.take_while(|c| c.is_ascii_digit());
                    number.push_str(&self.take_while(|c| c == '.'));
                    Token::Number(number)
                }
                '\'' | ',' => Token::Marks(self.take_while(|c| c == '\'' || c == ',')),
                '"' => Token::Text(self.quoted_text()?),
                '#' => {
                    self.advance();
                    Token::Scheme(self.take_while(|c| !c.is_whitespace() && c != '}'))
                }
                '/' => {
                    self.advance();
                    Token::Slash
                }
                '~' => {
                    self.advance();
                    Token::Tie
                }
                '=' => {
                    self.advance();
                    Token::Equals
                }
                '<' => {
                    self.advance();
                    Token::ChordOpen
                }
                '>' => {
                    self.advance();
                    Token::ChordClose
                }
                '{' => {
                    self.advance();
                    Token::GroupOpen
                }
                '}' => {
                    self.advance();
                    Token::GroupClose
                }
                '|' => {
                    self.advance();
                    Token::BarCheck
                }
                _ => {
                    return Err(TranslateError::UnknownToken(format!(
                        "'{}' at line {}, column {}",
                        c, line, column
                    )));
                }
            };

            tokens.push(LocatedToken {
                token,
                line,
                column,
            });
        }

        Ok(tokens)
    }
}
