//! Hand-written lexer/scanner for the block language
//!
//! Converts source code into a stream of tokens. Like Go, a newline
//! terminates a statement when the last token on the line could end
//! one; the lexer inserts the `;` itself so the parser only ever sees
//! explicit separators.

use super::token::{Comment, Keyword, Token, TokenKind};
use crate::errors::SourceSpan;

/// The lexer/scanner for block source code
pub struct Lexer<'src> {
    /// The source code being lexed
    source: &'src str,
    /// Current byte position in the source
    pos: usize,
    /// Start position of the current token
    start: usize,
    /// Whether a line break here must produce a `;`
    insert_semi: bool,
    /// Comments seen so far
    comments: Vec<Comment>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            start: 0,
            insert_semi: false,
            comments: Vec::new(),
        }
    }

    /// Peek at the current character without consuming it
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Peek at the next character (one ahead of current)
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advance to the next character and return it
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Check if we've reached the end of the source
    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Get the current span (from start to current position)
    fn current_span(&self) -> SourceSpan {
        SourceSpan::new(self.start, self.pos)
    }

    /// Get the current lexeme (text from start to current position)
    fn current_lexeme(&self) -> &'src str {
        &self.source[self.start..self.pos]
    }

    /// Create a token with the current span
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.current_span())
    }

    /// Consume the character if it matches the expected one
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip whitespace and comments, reporting whether a line break was crossed
    fn skip_whitespace(&mut self) -> bool {
        let mut newline = false;
        loop {
            match self.peek() {
                Some('\n') => {
                    newline = true;
                    self.advance();
                }
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                    self.push_comment(start);
                }
                Some('/') if self.peek_next() == Some('*') => {
                    let start = self.pos;
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some('\n') => newline = true,
                            Some(_) => {}
                            None => break,
                        }
                    }
                    self.push_comment(start);
                }
                _ => break,
            }
        }
        newline
    }

    fn push_comment(&mut self, start: usize) {
        self.comments.push(Comment {
            text: self.source[start..self.pos].trim_end().to_string(),
            span: SourceSpan::new(start, self.pos),
        });
    }

    /// Scan a number literal; the first digit (or `.`) is already consumed
    fn scan_number(&mut self, first: char) -> Token {
        if first == '0' && matches!(self.peek(), Some('x' | 'X' | 'b' | 'B' | 'o' | 'O')) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
                self.advance();
            }
            if self.current_lexeme().len() == 2 {
                return self.make_token(TokenKind::Error("malformed number literal".to_string()));
            }
            return self.make_token(TokenKind::Int(self.current_lexeme().to_string()));
        }

        let mut float = first == '.';
        self.skip_digits();

        if !float && self.peek() == Some('.') && self.peek_next() != Some('.') {
            float = true;
            self.advance();
            self.skip_digits();
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            float = true;
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return self.make_token(TokenKind::Error("exponent has no digits".to_string()));
            }
            self.skip_digits();
        }

        let text = self.current_lexeme().to_string();
        if float {
            self.make_token(TokenKind::Float(text))
        } else {
            self.make_token(TokenKind::Int(text))
        }
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.advance();
        }
    }

    /// Scan an interpreted string or rune literal up to the closing quote
    fn scan_quoted(&mut self, quote: char) -> Token {
        loop {
            match self.advance() {
                Some(c) if c == quote => break,
                Some('\\') => {
                    if self.advance().is_none() {
                        break;
                    }
                }
                Some('\n') | None => {
                    let what = if quote == '"' { "string" } else { "rune" };
                    return self.make_token(TokenKind::Error(format!("{} literal not terminated", what)));
                }
                Some(_) => {}
            }
        }

        let text = self.current_lexeme().to_string();
        if quote == '"' {
            self.make_token(TokenKind::String(text))
        } else if text.len() <= 2 {
            self.make_token(TokenKind::Error("empty rune literal or unescaped ' in rune literal".to_string()))
        } else {
            self.make_token(TokenKind::Char(text))
        }
    }

    /// Scan a raw (backquoted) string literal
    fn scan_raw_string(&mut self) -> Token {
        while let Some(c) = self.advance() {
            if c == '`' {
                return self.make_token(TokenKind::String(self.current_lexeme().to_string()));
            }
        }
        self.make_token(TokenKind::Error("raw string literal not terminated".to_string()))
    }

    /// Scan an identifier or keyword
    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = self.current_lexeme();
        if let Some(kw) = Keyword::parse(text) {
            self.make_token(TokenKind::Keyword(kw))
        } else {
            self.make_token(TokenKind::Ident(text.to_string()))
        }
    }

    /// Scan the next token
    pub fn next_token(&mut self) -> Token {
        let newline = self.skip_whitespace();
        if self.insert_semi && (newline || self.is_at_end()) {
            self.insert_semi = false;
            return Token::new(TokenKind::Semicolon, SourceSpan::new(self.pos, self.pos));
        }

        self.start = self.pos;
        let token = self.scan_token();
        self.insert_semi = token.kind.ends_statement();
        token
    }

    fn scan_token(&mut self) -> Token {
        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        if c.is_alphabetic() || c == '_' {
            return self.scan_identifier();
        }

        if c.is_ascii_digit() || (c == '.' && self.peek().is_some_and(|d| d.is_ascii_digit())) {
            return self.scan_number(c);
        }

        match c {
            '"' => self.scan_quoted('"'),
            '\'' => self.scan_quoted('\''),
            '`' => self.scan_raw_string(),
            '(' => self.make_token(TokenKind::LParen),
            ')' => self.make_token(TokenKind::RParen),
            '{' => self.make_token(TokenKind::LBrace),
            '}' => self.make_token(TokenKind::RBrace),
            '[' => self.make_token(TokenKind::LBracket),
            ']' => self.make_token(TokenKind::RBracket),
            ';' => self.make_token(TokenKind::Semicolon),
            ',' => self.make_token(TokenKind::Comma),
            ':' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::ColonEq)
                } else {
                    self.make_token(TokenKind::Colon)
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    self.make_token(TokenKind::Ellipsis)
                } else {
                    self.make_token(TokenKind::Dot)
                }
            }
            '+' => {
                if self.match_char('+') {
                    self.make_token(TokenKind::PlusPlus)
                } else if self.match_char('=') {
                    self.make_token(TokenKind::PlusEq)
                } else {
                    self.make_token(TokenKind::Plus)
                }
            }
            '-' => {
                if self.match_char('-') {
                    self.make_token(TokenKind::MinusMinus)
                } else if self.match_char('=') {
                    self.make_token(TokenKind::MinusEq)
                } else {
                    self.make_token(TokenKind::Minus)
                }
            }
            '*' => self.with_assign(TokenKind::Star, TokenKind::StarEq),
            '/' => self.with_assign(TokenKind::Slash, TokenKind::SlashEq),
            '%' => self.with_assign(TokenKind::Percent, TokenKind::PercentEq),
            '^' => self.with_assign(TokenKind::Caret, TokenKind::CaretEq),
            '&' => {
                if self.match_char('&') {
                    self.make_token(TokenKind::AmpAmp)
                } else if self.match_char('^') {
                    self.with_assign(TokenKind::AndNot, TokenKind::AndNotEq)
                } else {
                    self.with_assign(TokenKind::Amp, TokenKind::AmpEq)
                }
            }
            '|' => {
                if self.match_char('|') {
                    self.make_token(TokenKind::PipePipe)
                } else {
                    self.with_assign(TokenKind::Pipe, TokenKind::PipeEq)
                }
            }
            '!' => self.with_assign(TokenKind::Bang, TokenKind::BangEq),
            '=' => self.with_assign(TokenKind::Eq, TokenKind::EqEq),
            '<' => {
                if self.match_char('<') {
                    self.with_assign(TokenKind::Shl, TokenKind::ShlEq)
                } else if self.match_char('-') {
                    self.make_token(TokenKind::Arrow)
                } else {
                    self.with_assign(TokenKind::Lt, TokenKind::LtEq)
                }
            }
            '>' => {
                if self.match_char('>') {
                    self.with_assign(TokenKind::Shr, TokenKind::ShrEq)
                } else {
                    self.with_assign(TokenKind::Gt, TokenKind::GtEq)
                }
            }
            _ => self.make_token(TokenKind::Error(format!("invalid character {:?}", c))),
        }
    }

    /// `plain`, or `assign` when followed by `=`
    fn with_assign(&mut self, plain: TokenKind, assign: TokenKind) -> Token {
        if self.match_char('=') {
            self.make_token(assign)
        } else {
            self.make_token(plain)
        }
    }

    /// Collect all tokens (ending with EOF) and the comments between them
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Comment>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        (tokens, self.comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .0
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Ident(s.to_string())
    }

    #[test]
    fn test_semicolon_insertion() {
        let tokens = lex("x := 1\ny++\n");
        assert_eq!(
            tokens,
            vec![
                ident("x"),
                TokenKind::ColonEq,
                TokenKind::Int("1".to_string()),
                TokenKind::Semicolon,
                ident("y"),
                TokenKind::PlusPlus,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_no_semicolon_after_operator() {
        let tokens = lex("a +\nb");
        assert_eq!(
            tokens,
            vec![ident("a"), TokenKind::Plus, ident("b"), TokenKind::Semicolon, TokenKind::Eof]
        );
    }

    #[test]
    fn test_semicolon_at_eof_and_after_brace() {
        let tokens = lex("func f() {}");
        assert_eq!(tokens.last(), Some(&TokenKind::Eof));
        assert_eq!(tokens[tokens.len() - 2], TokenKind::Semicolon);
    }

    #[test]
    fn test_operators() {
        let tokens = lex("&^ &^= <<= >>= && || <- ... := != ==");
        assert_eq!(
            tokens,
            vec![
                TokenKind::AndNot,
                TokenKind::AndNotEq,
                TokenKind::ShlEq,
                TokenKind::ShrEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Arrow,
                TokenKind::Ellipsis,
                TokenKind::ColonEq,
                TokenKind::BangEq,
                TokenKind::EqEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("42 0x1F 3.14 1e9 .5 1_000");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Int("42".to_string()),
                TokenKind::Int("0x1F".to_string()),
                TokenKind::Float("3.14".to_string()),
                TokenKind::Float("1e9".to_string()),
                TokenKind::Float(".5".to_string()),
                TokenKind::Int("1_000".to_string()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_keep_source_text() {
        let tokens = lex(r#""a\"b" `raw
text` 'x'"#);
        assert_eq!(
            tokens,
            vec![
                TokenKind::String(r#""a\"b""#.to_string()),
                TokenKind::String("`raw\ntext`".to_string()),
                TokenKind::Char("'x'".to_string()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = lex("\"abc\nx");
        assert!(matches!(tokens[0], TokenKind::Error(_)));
    }

    #[test]
    fn test_keywords() {
        let tokens = lex("func go defer range");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Keyword(Keyword::Func),
                TokenKind::Keyword(Keyword::Go),
                TokenKind::Keyword(Keyword::Defer),
                TokenKind::Keyword(Keyword::Range),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_collected() {
        let (tokens, comments) = Lexer::new("// head\nx /* mid */ = 1 // tail\n").tokenize();
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].text, "// head");
        assert_eq!(comments[1].text, "/* mid */");
        assert_eq!(comments[2].text, "// tail");
        assert_eq!(
            tokens.into_iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                ident("x"),
                TokenKind::Eq,
                TokenKind::Int("1".to_string()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }
}
