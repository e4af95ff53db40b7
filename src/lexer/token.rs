//! Token definitions for the block language
//!
//! Defines all token types produced by the lexer.

use crate::errors::SourceSpan;
use std::fmt;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Source location of this token
    pub span: SourceSpan,
}

impl Token {
    pub fn new(kind: TokenKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }
}

/// A comment collected by the lexer, text included (`// ...` or `/* ... */`)
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub span: SourceSpan,
}

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Break,
    Case,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    For,
    Func,
    Go,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Struct,
    Switch,
    Type,
    Var,
    // Recognized so that they are rejected with a clear message
    Chan,
    Fallthrough,
    Goto,
    Select,
}

impl Keyword {
    /// Try to parse a string as a keyword
    pub fn parse(s: &str) -> Option<Keyword> {
        match s {
            "break" => Some(Keyword::Break),
            "case" => Some(Keyword::Case),
            "const" => Some(Keyword::Const),
            "continue" => Some(Keyword::Continue),
            "default" => Some(Keyword::Default),
            "defer" => Some(Keyword::Defer),
            "else" => Some(Keyword::Else),
            "for" => Some(Keyword::For),
            "func" => Some(Keyword::Func),
            "go" => Some(Keyword::Go),
            "if" => Some(Keyword::If),
            "import" => Some(Keyword::Import),
            "interface" => Some(Keyword::Interface),
            "map" => Some(Keyword::Map),
            "package" => Some(Keyword::Package),
            "range" => Some(Keyword::Range),
            "return" => Some(Keyword::Return),
            "struct" => Some(Keyword::Struct),
            "switch" => Some(Keyword::Switch),
            "type" => Some(Keyword::Type),
            "var" => Some(Keyword::Var),
            "chan" => Some(Keyword::Chan),
            "fallthrough" => Some(Keyword::Fallthrough),
            "goto" => Some(Keyword::Goto),
            "select" => Some(Keyword::Select),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Break => "break",
            Keyword::Case => "case",
            Keyword::Const => "const",
            Keyword::Continue => "continue",
            Keyword::Default => "default",
            Keyword::Defer => "defer",
            Keyword::Else => "else",
            Keyword::For => "for",
            Keyword::Func => "func",
            Keyword::Go => "go",
            Keyword::If => "if",
            Keyword::Import => "import",
            Keyword::Interface => "interface",
            Keyword::Map => "map",
            Keyword::Package => "package",
            Keyword::Range => "range",
            Keyword::Return => "return",
            Keyword::Struct => "struct",
            Keyword::Switch => "switch",
            Keyword::Type => "type",
            Keyword::Var => "var",
            Keyword::Chan => "chan",
            Keyword::Fallthrough => "fallthrough",
            Keyword::Goto => "goto",
            Keyword::Select => "select",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of a token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals keep their source text so they print back unchanged
    /// Integer literal
    Int(String),
    /// Floating-point literal
    Float(String),
    /// Rune literal, quotes included
    Char(String),
    /// Interpreted or raw string literal, quotes included
    String(String),
    /// Identifier
    Ident(String),
    /// Keyword
    Keyword(Keyword),

    // Punctuation
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `;`, explicit or inserted at a line break
    Semicolon,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `&^`
    AndNot,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `<-`
    Arrow,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `!`
    Bang,
    /// `=`
    Eq,
    /// `:=`
    ColonEq,
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `*=`
    StarEq,
    /// `/=`
    SlashEq,
    /// `%=`
    PercentEq,
    /// `&=`
    AmpEq,
    /// `|=`
    PipeEq,
    /// `^=`
    CaretEq,
    /// `<<=`
    ShlEq,
    /// `>>=`
    ShrEq,
    /// `&^=`
    AndNotEq,

    // Special
    /// End of file
    Eof,
    /// Error token (lexer error, but we keep going)
    Error(String),
}

impl TokenKind {
    /// Check if this is an EOF token
    pub fn is_eof(&self) -> bool {
        matches!(self, TokenKind::Eof)
    }

    /// Whether a line break after this token ends the statement
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Char(_)
                | TokenKind::String(_)
                | TokenKind::Ident(_)
                | TokenKind::Keyword(
                    Keyword::Break | Keyword::Continue | Keyword::Return | Keyword::Fallthrough
                )
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }

    /// The operator text for operator and punctuation tokens
    pub fn symbol(&self) -> Option<&'static str> {
        let s = match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Ellipsis => "...",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::AndNot => "&^",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Arrow => "<-",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Bang => "!",
            TokenKind::Eq => "=",
            TokenKind::ColonEq => ":=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::ShlEq => "<<=",
            TokenKind::ShrEq => ">>=",
            TokenKind::AndNotEq => "&^=",
            _ => return None,
        };
        Some(s)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(s) | TokenKind::Float(s) | TokenKind::Char(s) | TokenKind::String(s) => {
                write!(f, "literal {}", s)
            }
            TokenKind::Ident(name) => write!(f, "name {}", name),
            TokenKind::Keyword(kw) => write!(f, "keyword {}", kw),
            TokenKind::Semicolon => write!(f, "newline or ';'"),
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::Error(msg) => write!(f, "invalid token ({})", msg),
            other => write!(f, "'{}'", other.symbol().unwrap_or("?")),
        }
    }
}
