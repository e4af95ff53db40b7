//! Lexer module
//!
//! Hand-written lexer that tokenizes block source code into a stream of
//! tokens, with automatic semicolon insertion and comment capture.

mod scanner;
mod token;

pub use scanner::Lexer;
pub use token::{Comment, Keyword, Token, TokenKind};
