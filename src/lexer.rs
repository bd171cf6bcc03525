use std::{iter::Peekable, num::ParseFloatError};

use crate::token::{Span, Spanned, Token, TokenKind, KEYWORDS};

const SUGGESTED_TOKENS_CAPACITY: usize = 1_024;

/// Lexes the provided string, producing the token sequence and the collected
/// errors.
///
/// The lexer is resilient: an error aborts only the current token, records
/// its position, and scanning continues with the next character. The returned
/// sequence is never empty and always ends with a single `Eof` token.
pub fn tokenize(src: &str) -> (Vec<Token>, Vec<Spanned<Error>>) {
    Lexer::new(src).lex()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedChar,
    UnterminatedString,
}

struct Lexer<'src> {
    src: &'src str,
    iter: Peekable<std::str::Chars<'src>>,
    cursor: usize,
    current_lo: usize,
    tokens: Vec<Token>,
    errors: Vec<Spanned<Error>>,
}

impl Lexer<'_> {
    /// Scans the source string until the input is exhausted.
    fn lex(mut self) -> (Vec<Token>, Vec<Spanned<Error>>) {
        loop {
            self.skip_trivia();
            match self.scan_token_kind() {
                Ok(kind) => {
                    let is_eof = matches!(kind, TokenKind::Eof);
                    self.produce(kind);
                    if is_eof {
                        break;
                    }
                }
                Err(error) => {
                    let span = self.span();
                    self.errors.push(span.wrap(error));
                }
            }
        }
        (self.tokens, self.errors)
    }

    /// Skips whitespace and `//` line comments. Neither produces a token.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                c if c.is_ascii_whitespace() => {
                    self.advance();
                }
                '/' if self.src[self.cursor..].starts_with("//") => {
                    while !matches!(self.peek(), '\n' | '\0') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Tries to scan the token starting at the current character.
    ///
    /// Two-character operators are attempted before their one-character
    /// prefixes (maximal munch).
    fn scan_token_kind(&mut self) -> Result<TokenKind, Error> {
        use TokenKind::*;
        let kind = match self.mark_advance() {
            '\0' => Eof,
            '+' => Plus,
            '-' => match self.peek() {
                '>' => self.advance_with(Arrow),
                _ => Minus,
            },
            '*' => Star,
            '/' => Slash,
            '=' => match self.peek() {
                '=' => self.advance_with(EqEq),
                _ => Assign,
            },
            '>' => match self.peek() {
                '=' => self.advance_with(GreaterEq),
                _ => Greater,
            },
            '<' => match self.peek() {
                '=' => self.advance_with(LessEq),
                _ => Less,
            },
            '!' => match self.peek() {
                '=' => self.advance_with(BangEq),
                _ => Bang,
            },
            '&' => match self.peek() {
                '&' => self.advance_with(AndAnd),
                _ => return Err(Error::UnexpectedChar),
            },
            '|' => match self.peek() {
                '|' => self.advance_with(OrOr),
                _ => return Err(Error::UnexpectedChar),
            },
            '(' => LParen,
            ')' => RParen,
            '{' => LBrace,
            '}' => RBrace,
            '[' => LBracket,
            ']' => RBracket,
            ':' => Colon,
            ';' => Semicolon,
            ',' => Comma,
            '.' => Dot,
            quote @ ('"' | '\'') => self.string(quote)?,
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(),
            _ => return Err(Error::UnexpectedChar),
        };
        Ok(kind)
    }

    /// Scans a string delimited by `quote`. The escape pass itself is
    /// deferred until the value is actually needed (see
    /// [`extract::escaped_string`]); here only the token bounds and the
    /// presence of escapes are determined.
    fn string(&mut self, quote: char) -> Result<TokenKind, Error> {
        let mut has_escaped = false;
        loop {
            match self.advance() {
                '\0' => return Err(Error::UnterminatedString),
                '\\' => {
                    has_escaped = true;
                    if self.advance() == '\0' {
                        return Err(Error::UnterminatedString);
                    }
                }
                c if c == quote => {
                    return Ok(if has_escaped {
                        TokenKind::EscapedStr
                    } else {
                        TokenKind::Str
                    });
                }
                _ => {}
            }
        }
    }

    /// Scans a maximal run of digits, optionally followed by `.` and more
    /// digits. There is no exponent form.
    fn number(&mut self) -> TokenKind {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        TokenKind::Number
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        let valid_suffix = |c: char| c.is_ascii_alphanumeric() || c == '_';
        while valid_suffix(self.peek()) {
            self.advance();
        }
        match KEYWORDS.get(self.substr()) {
            Some(keyword) => *keyword,
            None => TokenKind::Identifier,
        }
    }
}

impl Lexer<'_> {
    fn new(src: &str) -> Lexer<'_> {
        Lexer {
            src,
            iter: src.chars().peekable(),
            cursor: 0,
            current_lo: 0,
            tokens: Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY),
            errors: Vec::new(),
        }
    }

    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> char {
        self.current_lo = self.cursor;
        self.advance()
    }

    /// Returns the next character and advances the iterator.
    fn advance(&mut self) -> char {
        self.iter
            .next()
            .inspect(|c| self.cursor += c.len_utf8())
            .unwrap_or('\0')
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the next character without advancing the iterator.
    fn peek(&mut self) -> char {
        self.iter.peek().copied().unwrap_or('\0')
    }

    /// Returns the current marked span.
    fn span(&self) -> Span {
        Span::new_of_bounds(self.current_lo..self.cursor)
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        self.span().substr(self.src)
    }

    /// Produces a token using the marked bounds.
    fn produce(&mut self, kind: TokenKind) {
        let span = self.span();
        self.tokens.push(Token::new(kind, span));
    }
}

pub mod extract {
    use super::*;

    pub fn number(token: Token, src: &str) -> Result<f64, ParseFloatError> {
        debug_assert_eq!(token.kind, TokenKind::Number);
        token.span().substr(src).parse()
    }

    pub fn ident<'src>(token: Token, src: &'src str) -> &'src str {
        debug_assert_eq!(token.kind, TokenKind::Identifier);
        token.span().substr(src)
    }

    pub fn string<'src>(token: Token, src: &'src str) -> &'src str {
        debug_assert_eq!(token.kind, TokenKind::Str);
        token.span().trim(1).substr(src)
    }

    pub fn escaped_string(token: Token, src: &str) -> Box<str> {
        debug_assert_eq!(token.kind, TokenKind::EscapedStr);
        let raw = token.span().trim(1).substr(src);
        perform_escape(raw).into_boxed_str()
    }
}

fn perform_escape(raw: &str) -> String {
    let mut buf = String::with_capacity(raw.len());
    let mut escaped = false;
    for char in raw.chars() {
        let char = match (escaped, char) {
            (true, 'n') => '\n',
            (true, 't') => '\t',
            (true, 'r') => '\r',
            (false, '\\') => {
                escaped = true;
                continue;
            }
            // Any other escaped character passes through unchanged.
            (_, char) => char,
        };
        escaped = false;
        buf.push(char);
    }
    buf.shrink_to_fit();
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lex_ok(input: &str) -> Vec<Token> {
        let (tokens, errors) = tokenize(input);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        tokens
    }

    #[test]
    fn tests_with_span() {
        use TokenKind::*;
        let cases = cases!(match .. {
            "->" => [(Arrow, 0..2), (Eof, 2..2)],
            "- >" => [(Minus, 0..1), (Greater, 2..3), (Eof, 3..3)],
            "3.14" => [(Number, 0..4), (Eof, 4..4)],
            "3." => [(Number, 0..2), (Eof, 2..2)],
            "1 2.5 100" => [
                (Number, 0..1),
                (Number, 2..5),
                (Number, 6..9),
                (Eof, 9..9),
            ],
            "fn let mut in" => [
                (Fn, 0..2),
                (Let, 3..6),
                (Mut, 7..10),
                (In, 11..13),
                (Eof, 13..13),
            ],
            "_x x1 lettuce" => [
                (Identifier, 0..2),
                (Identifier, 3..5),
                (Identifier, 6..13),
                (Eof, 13..13),
            ],
            "== = != ! <= < >= > && ||" => [
                (EqEq, 0..2),
                (Assign, 3..4),
                (BangEq, 5..7),
                (Bang, 8..9),
                (LessEq, 10..12),
                (Less, 13..14),
                (GreaterEq, 15..17),
                (Greater, 18..19),
                (AndAnd, 20..22),
                (OrOr, 23..25),
                (Eof, 25..25),
            ],
            "a.b(x)[0].c" => [
                (Identifier, 0..1),
                (Dot, 1..2),
                (Identifier, 2..3),
                (LParen, 3..4),
                (Identifier, 4..5),
                (RParen, 5..6),
                (LBracket, 6..7),
                (Number, 7..8),
                (RBracket, 8..9),
                (Dot, 9..10),
                (Identifier, 10..11),
                (Eof, 11..11),
            ],
            r#""hi""# => [(Str, 0..4), (Eof, 4..4)],
            "'hi'" => [(Str, 0..4), (Eof, 4..4)],
            r#""a\nb""# => [(EscapedStr, 0..6), (Eof, 6..6)],
            r#""it's""# => [(Str, 0..6), (Eof, 6..6)],
            "1 // comment\n2" => [(Number, 0..1), (Number, 13..14), (Eof, 14..14)],
            "// only a comment" => [(Eof, 17..17)],
            "" => [(Eof, 0..0)],
        });

        for (input, tokens) in cases {
            let lexed = lex_ok(input);
            assert_eq!(&lexed, tokens, "input: {input:?}");
        }
    }

    #[test]
    fn unexpected_char_is_skipped() {
        use TokenKind::*;
        let (tokens, errors) = tokenize("let @ x = 1;");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, [Let, Identifier, Assign, Number, Semicolon, Eof]);
        assert_eq!(
            errors,
            [Span::new_of_bounds(4..5).wrap(Error::UnexpectedChar)]
        );
    }

    #[test]
    fn lone_ampersand_and_pipe_are_errors() {
        use TokenKind::*;
        let (tokens, errors) = tokenize("a & b | c");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, [Identifier, Identifier, Identifier, Eof]);
        assert_eq!(
            errors,
            [
                Span::new_of_bounds(2..3).wrap(Error::UnexpectedChar),
                Span::new_of_bounds(6..7).wrap(Error::UnexpectedChar),
            ]
        );
    }

    #[test]
    fn unterminated_string() {
        let (tokens, errors) = tokenize("\"abc");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
        assert_eq!(
            errors,
            [Span::new_of_bounds(0..4).wrap(Error::UnterminatedString)]
        );
    }

    #[test]
    fn eof_is_always_last_and_unique() {
        for input in ["", "1 + 2", "let x = 1;", "@", "\"unterminated"] {
            let (tokens, _) = tokenize(input);
            let eofs = tokens.iter().filter(|t| t.is_eof()).count();
            assert_eq!(eofs, 1, "input: {input:?}");
            assert!(tokens.last().unwrap().is_eof(), "input: {input:?}");
        }
    }

    #[test]
    fn extract_number_value() {
        let tokens = lex_ok("3.14");
        assert_eq!(extract::number(tokens[0], "3.14"), Ok(3.14));
    }

    #[test]
    fn extract_string_values() {
        let src = r#""plain" "a\nb\q""#;
        let tokens = lex_ok(src);
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(extract::string(tokens[0], src), "plain");
        assert_eq!(tokens[1].kind, TokenKind::EscapedStr);
        assert_eq!(&*extract::escaped_string(tokens[1], src), "a\nbq");
    }

    macro_rules! cases {
        (match .. {
            $($str:expr => [$(($kind:expr, $range:expr)),* $(,)?]),* $(,)?
        }) => {{
            &[$((
                $str,
                vec![
                    $(Token::new($kind, Span::new_of_bounds($range.start..$range.end))),*
                ],
            )),*]
        }};
    }
    use cases;
}
