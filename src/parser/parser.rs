//! Recursive descent parser
//!
//! Parses a token stream into an AST. Two entry points exist: a REPL
//! block (imports, then any mix of statements and declarations) and an
//! ordinary package file.

use super::ast::*;
use crate::errors::{LgoError, LgoResult, SourceSpan};
use crate::lexer::{Comment, Keyword, Lexer, Token, TokenKind};

/// The parser for block and package source code
pub struct Parser<'src> {
    /// The source code (to tell trailing comments from leading ones)
    source: &'src str,
    /// Tokens from the lexer
    tokens: Vec<Token>,
    /// Comments from the lexer, in source order
    comments: Vec<Comment>,
    /// First comment not yet attached to a node
    next_comment: usize,
    /// Current position in the token stream
    pos: usize,
    /// Nesting level of parens/brackets; negative in control clauses,
    /// where `T{` is a block rather than a composite literal
    expr_lev: i32,
}

/// Result of parsing a simple statement where a range clause may appear
enum Simple {
    Stmt(Stmt),
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
    },
}

/// One entry of a parameter list before names are grouped with types
enum ParamEntry {
    Type(Expr),
    Named(Ident, Expr),
}

impl<'src> Parser<'src> {
    /// Create a new parser for the given source code
    pub fn new(source: &'src str) -> Self {
        let (tokens, comments) = Lexer::new(source).tokenize();
        Self {
            source,
            tokens,
            comments,
            next_comment: 0,
            pos: 0,
            expr_lev: 0,
        }
    }

    /// Parse a REPL block
    pub fn parse_block(mut self) -> LgoResult<LgoBlock> {
        self.check_lex_errors()?;
        let mut stmts = Vec::new();

        self.skip_semis();
        while self.check_keyword(Keyword::Import) {
            let doc = self.take_doc();
            let start = self.current_span();
            let decl = self.parse_gen_decl(GenKind::Import, doc)?;
            let span = start.merge(self.previous().span);
            stmts.push(Stmt::new(StmtKind::Decl(Decl::Gen(decl)), span));
            self.expect_stmt_end()?;
            self.skip_semis();
        }

        while !self.is_at_end() {
            stmts.push(self.parse_top_stmt()?);
            self.expect_stmt_end()?;
            self.skip_semis();
        }

        Ok(LgoBlock { stmts })
    }

    /// Parse a package file
    pub fn parse_file(mut self) -> LgoResult<SourceFile> {
        self.check_lex_errors()?;
        self.skip_semis();
        self.take_doc();
        self.expect_keyword(Keyword::Package, "expected 'package'")?;
        let package = self.parse_ident()?;
        self.expect_stmt_end()?;
        self.skip_semis();

        let mut decls = Vec::new();
        while self.check_keyword(Keyword::Import) {
            let doc = self.take_doc();
            decls.push(Decl::Gen(self.parse_gen_decl(GenKind::Import, doc)?));
            self.expect_stmt_end()?;
            self.skip_semis();
        }

        while !self.is_at_end() {
            let doc = self.take_doc();
            let decl = match &self.peek().kind {
                TokenKind::Keyword(Keyword::Func) => Decl::Func(self.parse_func_decl(doc)?),
                TokenKind::Keyword(Keyword::Var) => Decl::Gen(self.parse_gen_decl(GenKind::Var, doc)?),
                TokenKind::Keyword(Keyword::Const) => {
                    Decl::Gen(self.parse_gen_decl(GenKind::Const, doc)?)
                }
                TokenKind::Keyword(Keyword::Type) => {
                    Decl::Gen(self.parse_gen_decl(GenKind::Type, doc)?)
                }
                TokenKind::Keyword(Keyword::Import) => {
                    return Err(self.error("imports must appear before other declarations"));
                }
                _ => return Err(self.error("non-declaration statement outside function body")),
            };
            decls.push(decl);
            self.expect_stmt_end()?;
            self.skip_semis();
        }

        Ok(SourceFile { package, decls })
    }

    // ==================== Helpers ====================

    fn check_lex_errors(&self) -> LgoResult<()> {
        for token in &self.tokens {
            if let TokenKind::Error(message) = &token.kind {
                return Err(LgoError::lexer(message.clone(), token.span));
            }
        }
        Ok(())
    }

    /// Check if we've reached EOF
    fn is_at_end(&self) -> bool {
        self.peek().kind.is_eof()
    }

    /// Peek at the current token
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Peek `n` tokens ahead
    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    /// Get the current token's span
    fn current_span(&self) -> SourceSpan {
        self.peek().span
    }

    /// Advance and return the previous token
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous()
    }

    /// Get the previous token
    fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Check if current token matches (by kind, ignoring payload)
    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    /// Check if current token is a keyword
    fn check_keyword(&self, kw: Keyword) -> bool {
        matches!(&self.peek().kind, TokenKind::Keyword(k) if *k == kw)
    }

    fn error(&self, message: impl Into<String>) -> LgoError {
        LgoError::parser(message, self.current_span())
    }

    fn unexpected(&self, expected: &str) -> LgoError {
        self.error(format!("{}, found {}", expected, self.peek().kind))
    }

    /// Consume a token if it matches, otherwise error
    fn expect(&mut self, kind: &TokenKind, msg: &str) -> LgoResult<SourceSpan> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(msg))
        }
    }

    /// Consume a keyword if it matches, otherwise error
    fn expect_keyword(&mut self, kw: Keyword, msg: &str) -> LgoResult<SourceSpan> {
        if self.check_keyword(kw) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(msg))
        }
    }

    /// Consume token if it matches
    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume keyword if it matches
    fn match_keyword(&mut self, kw: Keyword) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_semis(&mut self) {
        while self.match_token(&TokenKind::Semicolon) {}
    }

    /// A statement ends at `;`, or right before `}` / EOF
    fn expect_stmt_end(&mut self) -> LgoResult<()> {
        if self.match_token(&TokenKind::Semicolon) || self.check(&TokenKind::RBrace) || self.is_at_end() {
            Ok(())
        } else {
            Err(self.error(format!("unexpected {} at end of statement", self.peek().kind)))
        }
    }

    /// Parse an identifier
    fn parse_ident(&mut self) -> LgoResult<Ident> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let span = self.current_span();
                self.advance();
                Ok(Ident::new(name, span))
            }
            _ => Err(self.unexpected("expected name")),
        }
    }

    fn parse_ident_list(&mut self) -> LgoResult<Vec<Ident>> {
        let mut names = vec![self.parse_ident()?];
        while self.match_token(&TokenKind::Comma) {
            names.push(self.parse_ident()?);
        }
        Ok(names)
    }

    /// Leading comments of the node starting at the current token.
    /// Comments inside the previous node and trailing ones are dropped.
    fn take_doc(&mut self) -> Vec<String> {
        let start = self.current_span().start;
        let prev_end = self.tokens[..self.pos]
            .iter()
            .rev()
            .find(|t| !t.span.is_empty())
            .map(|t| t.span.end);

        let mut doc = Vec::new();
        while let Some(comment) = self.comments.get(self.next_comment) {
            if comment.span.end > start {
                break;
            }
            let leading = match prev_end {
                Some(end) => end <= comment.span.start && self.source[end..comment.span.start].contains('\n'),
                None => true,
            };
            if leading {
                doc.push(comment.text.clone());
            }
            self.next_comment += 1;
        }
        doc
    }

    // ==================== Declarations ====================

    /// A statement at the top of a block, where `func` and `type`
    /// introduce declarations
    fn parse_top_stmt(&mut self) -> LgoResult<Stmt> {
        if self.check_keyword(Keyword::Func)
            && (matches!(self.peek_at(1).kind, TokenKind::Ident(_)) || self.is_method_decl())
        {
            let doc = self.take_doc();
            let start = self.current_span();
            let func = self.parse_func_decl(doc)?;
            let span = start.merge(self.previous().span);
            return Ok(Stmt::new(StmtKind::Decl(Decl::Func(func)), span));
        }
        if self.check_keyword(Keyword::Import) {
            return Err(self.error("imports must appear before other declarations"));
        }
        self.parse_stmt()
    }

    /// `func (` starts a method when the parenthesised list is followed by a name
    fn is_method_decl(&self) -> bool {
        if !matches!(self.peek_at(1).kind, TokenKind::LParen) {
            return false;
        }
        let mut depth = 0usize;
        let mut i = 1;
        loop {
            match &self.peek_at(i).kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(self.peek_at(i + 1).kind, TokenKind::Ident(_));
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            i += 1;
        }
    }

    fn parse_func_decl(&mut self, doc: Vec<String>) -> LgoResult<FuncDecl> {
        let start = self.expect_keyword(Keyword::Func, "expected 'func'")?;

        let recv = if self.check(&TokenKind::LParen) {
            let recv_span = self.current_span();
            let mut fields = self.parse_params()?;
            if fields.len() != 1 || fields[0].names.len() > 1 {
                return Err(LgoError::parser("method must have exactly one receiver", recv_span));
            }
            fields.pop()
        } else {
            None
        };

        let name = self.parse_ident()?;
        let ty = self.parse_signature()?;
        let body = if self.check(&TokenKind::LBrace) {
            let saved = std::mem::replace(&mut self.expr_lev, 0);
            let body = self.parse_block_stmt();
            self.expr_lev = saved;
            Some(body?)
        } else {
            None
        };

        Ok(FuncDecl {
            recv,
            name,
            ty,
            body,
            span: start.merge(self.previous().span),
            doc,
        })
    }

    /// `import`/`var`/`const`/`type`, single or grouped
    fn parse_gen_decl(&mut self, kind: GenKind, doc: Vec<String>) -> LgoResult<GenDecl> {
        let start = self.current_span();
        self.advance();

        let mut specs = Vec::new();
        let grouped = self.match_token(&TokenKind::LParen);
        if grouped {
            self.skip_semis();
            while !self.check(&TokenKind::RParen) {
                specs.push(self.parse_spec(kind)?);
                if !self.check(&TokenKind::RParen) {
                    self.expect(&TokenKind::Semicolon, "expected ';' or ')'")?;
                    self.skip_semis();
                }
            }
            self.expect(&TokenKind::RParen, "expected ')'")?;
        } else {
            specs.push(self.parse_spec(kind)?);
        }

        Ok(GenDecl {
            kind,
            specs,
            grouped,
            span: start.merge(self.previous().span),
            doc,
        })
    }

    fn parse_spec(&mut self, kind: GenKind) -> LgoResult<Spec> {
        let start = self.current_span();
        match kind {
            GenKind::Import => {
                let name = match &self.peek().kind {
                    TokenKind::Ident(_) => Some(self.parse_ident()?),
                    TokenKind::Dot => return Err(self.error("dot imports are not supported")),
                    _ => None,
                };
                let path = match &self.peek().kind {
                    TokenKind::String(lit) => unquote(lit),
                    _ => return Err(self.unexpected("expected import path")),
                };
                self.advance();
                Ok(Spec::Import(ImportSpec {
                    name,
                    path,
                    span: start.merge(self.previous().span),
                    id: NodeId::fresh(),
                }))
            }
            GenKind::Var | GenKind::Const => {
                let names = self.parse_ident_list()?;
                let ty = if self.check(&TokenKind::Eq)
                    || self.check(&TokenKind::Semicolon)
                    || self.check(&TokenKind::RParen)
                {
                    None
                } else {
                    Some(self.parse_type()?)
                };
                let values = if self.match_token(&TokenKind::Eq) {
                    self.parse_expr_list()?
                } else {
                    Vec::new()
                };
                if kind == GenKind::Const && values.is_empty() {
                    return Err(LgoError::parser("missing init expr for const declaration", start));
                }
                if ty.is_none() && values.is_empty() {
                    return Err(LgoError::parser("missing variable type or initialization", start));
                }
                Ok(Spec::Value(ValueSpec {
                    names,
                    ty,
                    values,
                    span: start.merge(self.previous().span),
                }))
            }
            GenKind::Type => {
                let name = self.parse_ident()?;
                if self.check(&TokenKind::Eq) {
                    return Err(self.error("type aliases are not supported"));
                }
                let ty = self.parse_type()?;
                Ok(Spec::Type(TypeSpec {
                    name,
                    ty,
                    span: start.merge(self.previous().span),
                }))
            }
        }
    }

    // ==================== Types ====================

    fn starts_type(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Ident(_)
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::Keyword(
                    Keyword::Map | Keyword::Struct | Keyword::Interface | Keyword::Func | Keyword::Chan
                )
        )
    }

    fn parse_type(&mut self) -> LgoResult<Expr> {
        let start = self.current_span();
        let kind = match &self.peek().kind {
            TokenKind::Ident(_) => {
                let name = self.parse_ident()?;
                if self.match_token(&TokenKind::Dot) {
                    let sel = self.parse_ident()?;
                    let pkg = Expr::new(ExprKind::Ident(name), start);
                    ExprKind::Selector {
                        expr: Box::new(pkg),
                        sel,
                    }
                } else {
                    ExprKind::Ident(name)
                }
            }
            TokenKind::Star => {
                self.advance();
                ExprKind::Star(Box::new(self.parse_type()?))
            }
            TokenKind::LBracket => {
                self.advance();
                if !self.match_token(&TokenKind::RBracket) {
                    return Err(self.error("array types are not supported"));
                }
                ExprKind::SliceType(Box::new(self.parse_type()?))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(&TokenKind::RParen, "expected ')'")?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::Keyword(Keyword::Map) => {
                self.advance();
                self.expect(&TokenKind::LBracket, "expected '['")?;
                let key = self.parse_type()?;
                self.expect(&TokenKind::RBracket, "expected ']'")?;
                let value = self.parse_type()?;
                ExprKind::MapType {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            TokenKind::Keyword(Keyword::Struct) => ExprKind::StructType(self.parse_struct_fields()?),
            TokenKind::Keyword(Keyword::Interface) => {
                ExprKind::InterfaceType(self.parse_interface_methods()?)
            }
            TokenKind::Keyword(Keyword::Func) => {
                self.advance();
                ExprKind::FuncType(self.parse_signature()?)
            }
            TokenKind::Keyword(Keyword::Chan) => return Err(self.error("channel types are not supported")),
            _ => return Err(self.unexpected("expected type")),
        };
        Ok(Expr::new(kind, start.merge(self.previous().span)))
    }

    fn parse_struct_fields(&mut self) -> LgoResult<Vec<Field>> {
        self.expect_keyword(Keyword::Struct, "expected 'struct'")?;
        self.expect(&TokenKind::LBrace, "expected '{'")?;
        self.skip_semis();

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let start = self.current_span();
            let names = self.parse_ident_list()?;
            if self.check(&TokenKind::Semicolon) || self.check(&TokenKind::RBrace) || self.check(&TokenKind::Dot) {
                return Err(LgoError::parser("embedded fields are not supported", start));
            }
            let ty = self.parse_type()?;
            if self.check(&TokenKind::String(String::new())) {
                return Err(self.error("struct tags are not supported"));
            }
            fields.push(Field {
                names,
                ty,
                span: start.merge(self.previous().span),
            });
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Semicolon, "expected ';' or '}'")?;
                self.skip_semis();
            }
        }
        self.expect(&TokenKind::RBrace, "expected '}'")?;
        Ok(fields)
    }

    fn parse_interface_methods(&mut self) -> LgoResult<Vec<Field>> {
        self.expect_keyword(Keyword::Interface, "expected 'interface'")?;
        self.expect(&TokenKind::LBrace, "expected '{'")?;
        self.skip_semis();

        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let start = self.current_span();
            let name = self.parse_ident()?;
            if !self.check(&TokenKind::LParen) {
                return Err(LgoError::parser("embedded interfaces are not supported", start));
            }
            let sig = self.parse_signature()?;
            let span = start.merge(self.previous().span);
            methods.push(Field {
                names: vec![name],
                ty: Expr::new(ExprKind::FuncType(sig), span),
                span,
            });
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Semicolon, "expected ';' or '}'")?;
                self.skip_semis();
            }
        }
        self.expect(&TokenKind::RBrace, "expected '}'")?;
        Ok(methods)
    }

    /// Parameters and optional results, after `func` and the name
    fn parse_signature(&mut self) -> LgoResult<FuncType> {
        let params = self.parse_params()?;
        let results = if self.check(&TokenKind::LParen) {
            self.parse_params()?
        } else if self.starts_type() {
            let ty = self.parse_type()?;
            vec![Field {
                names: Vec::new(),
                span: ty.span,
                ty,
            }]
        } else {
            Vec::new()
        };
        Ok(FuncType { params, results })
    }

    fn parse_param_type(&mut self) -> LgoResult<Expr> {
        if self.check(&TokenKind::Ellipsis) {
            let start = self.advance().span;
            let elem = self.parse_type()?;
            let span = start.merge(elem.span);
            Ok(Expr::new(ExprKind::Ellipsis(Box::new(elem)), span))
        } else {
            self.parse_type()
        }
    }

    /// `(a, b int, c string)` or `(int, string)`
    fn parse_params(&mut self) -> LgoResult<Vec<Field>> {
        let open = self.expect(&TokenKind::LParen, "expected '('")?;

        let mut entries = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let first = self.parse_param_type()?;
            if self.check(&TokenKind::Comma) || self.check(&TokenKind::RParen) {
                entries.push(ParamEntry::Type(first));
            } else {
                let ExprKind::Ident(name) = first.kind else {
                    return Err(self.unexpected("expected ',' or ')'"));
                };
                entries.push(ParamEntry::Named(name, self.parse_param_type()?));
            }
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "expected ')'")?;

        if !entries.iter().any(|e| matches!(e, ParamEntry::Named(..))) {
            return Ok(entries
                .into_iter()
                .filter_map(|e| match e {
                    ParamEntry::Type(ty) => Some(Field {
                        names: Vec::new(),
                        span: ty.span,
                        ty,
                    }),
                    ParamEntry::Named(..) => None,
                })
                .collect());
        }

        // Named form: bare names share the type that follows them
        let mut fields = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();
        for entry in entries {
            match entry {
                ParamEntry::Type(Expr {
                    kind: ExprKind::Ident(name),
                    ..
                }) => pending.push(name),
                ParamEntry::Type(_) => {
                    return Err(LgoError::parser("mixed named and unnamed parameters", open));
                }
                ParamEntry::Named(name, ty) => {
                    pending.push(name);
                    let span = pending[0].span.merge(ty.span);
                    fields.push(Field {
                        names: std::mem::take(&mut pending),
                        ty,
                        span,
                    });
                }
            }
        }
        if !pending.is_empty() {
            return Err(LgoError::parser("mixed named and unnamed parameters", open));
        }
        Ok(fields)
    }

    // ==================== Statements ====================

    fn parse_block_stmt(&mut self) -> LgoResult<BlockStmt> {
        let start = self.expect(&TokenKind::LBrace, "expected '{'")?;
        let stmts = self.parse_stmt_list()?;
        self.expect(&TokenKind::RBrace, "expected '}'")?;
        Ok(BlockStmt {
            stmts,
            span: start.merge(self.previous().span),
        })
    }

    /// Statements up to `}`, `case` or `default`
    fn parse_stmt_list(&mut self) -> LgoResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            self.skip_semis();
            if self.check(&TokenKind::RBrace)
                || self.check_keyword(Keyword::Case)
                || self.check_keyword(Keyword::Default)
                || self.is_at_end()
            {
                break;
            }
            stmts.push(self.parse_stmt()?);
            self.expect_stmt_end()?;
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> LgoResult<Stmt> {
        let doc = self.take_doc();
        let start = self.current_span();

        let kind = match &self.peek().kind {
            TokenKind::Keyword(Keyword::Var) => {
                StmtKind::Decl(Decl::Gen(self.parse_gen_decl(GenKind::Var, doc.clone())?))
            }
            TokenKind::Keyword(Keyword::Const) => {
                StmtKind::Decl(Decl::Gen(self.parse_gen_decl(GenKind::Const, doc.clone())?))
            }
            TokenKind::Keyword(Keyword::Type) => {
                StmtKind::Decl(Decl::Gen(self.parse_gen_decl(GenKind::Type, doc.clone())?))
            }
            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                if self.check(&TokenKind::Semicolon) || self.check(&TokenKind::RBrace) || self.is_at_end() {
                    StmtKind::Return(Vec::new())
                } else {
                    StmtKind::Return(self.parse_expr_list()?)
                }
            }
            TokenKind::Keyword(Keyword::Break) => {
                self.advance();
                StmtKind::Break
            }
            TokenKind::Keyword(Keyword::Continue) => {
                self.advance();
                StmtKind::Continue
            }
            TokenKind::Keyword(kw @ (Keyword::Go | Keyword::Defer)) => {
                let kw = *kw;
                self.advance();
                let call = self.parse_expr()?;
                if !matches!(call.unparen().kind, ExprKind::Call { .. }) {
                    return Err(LgoError::parser(
                        format!("expression in {} must be function call", kw),
                        call.span,
                    ));
                }
                if kw == Keyword::Go {
                    StmtKind::Go(call)
                } else {
                    StmtKind::Defer(call)
                }
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if()?,
            TokenKind::Keyword(Keyword::For) => self.parse_for()?,
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch()?,
            TokenKind::LBrace => StmtKind::Block(self.parse_block_stmt()?),
            TokenKind::Semicolon => StmtKind::Empty,
            TokenKind::Keyword(
                kw @ (Keyword::Fallthrough | Keyword::Goto | Keyword::Select | Keyword::Chan),
            ) => {
                return Err(self.error(format!("{} is not supported", kw)));
            }
            TokenKind::Keyword(Keyword::Import) => {
                return Err(self.error("imports must appear before other declarations"));
            }
            _ => match self.parse_simple_stmt(false)? {
                Simple::Stmt(stmt) => stmt.kind,
                Simple::Range { .. } => unreachable!("range clause outside for"),
            },
        };

        let span = start.merge(self.previous().span);
        let mut stmt = Stmt::new(kind, span);
        if !matches!(stmt.kind, StmtKind::Decl(_)) {
            stmt.doc = doc;
        }
        Ok(stmt)
    }

    fn parse_simple_stmt(&mut self, range_ok: bool) -> LgoResult<Simple> {
        let start = self.current_span();

        if range_ok && self.match_keyword(Keyword::Range) {
            let expr = self.parse_expr()?;
            return Ok(Simple::Range {
                key: None,
                value: None,
                define: false,
                expr,
            });
        }

        let mut lhs = self.parse_expr_list()?;
        let op = match &self.peek().kind {
            TokenKind::ColonEq => Some(AssignOp::Define),
            TokenKind::Eq => Some(AssignOp::Assign),
            TokenKind::PlusEq => Some(AssignOp::Op(BinaryOp::Add)),
            TokenKind::MinusEq => Some(AssignOp::Op(BinaryOp::Sub)),
            TokenKind::StarEq => Some(AssignOp::Op(BinaryOp::Mul)),
            TokenKind::SlashEq => Some(AssignOp::Op(BinaryOp::Div)),
            TokenKind::PercentEq => Some(AssignOp::Op(BinaryOp::Rem)),
            TokenKind::AmpEq => Some(AssignOp::Op(BinaryOp::BitAnd)),
            TokenKind::PipeEq => Some(AssignOp::Op(BinaryOp::BitOr)),
            TokenKind::CaretEq => Some(AssignOp::Op(BinaryOp::BitXor)),
            TokenKind::ShlEq => Some(AssignOp::Op(BinaryOp::Shl)),
            TokenKind::ShrEq => Some(AssignOp::Op(BinaryOp::Shr)),
            TokenKind::AndNotEq => Some(AssignOp::Op(BinaryOp::AndNot)),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            if range_ok && op != AssignOp::Define && op != AssignOp::Assign && self.check_keyword(Keyword::Range) {
                return Err(self.error("range clause requires := or ="));
            }
            if range_ok && self.match_keyword(Keyword::Range) {
                if lhs.len() > 2 {
                    return Err(LgoError::parser(
                        "range clause permits at most two iteration variables",
                        start,
                    ));
                }
                let expr = self.parse_expr()?;
                let value = if lhs.len() == 2 { lhs.pop() } else { None };
                let key = lhs.pop();
                return Ok(Simple::Range {
                    key,
                    value,
                    define: op == AssignOp::Define,
                    expr,
                });
            }
            let rhs = self.parse_expr_list()?;
            if matches!(op, AssignOp::Op(_)) && (lhs.len() != 1 || rhs.len() != 1) {
                return Err(LgoError::parser(
                    format!("assignment operation {} requires single-valued expressions", op),
                    start,
                ));
            }
            let span = start.merge(self.previous().span);
            return Ok(Simple::Stmt(Stmt::new(StmtKind::Assign { lhs, op, rhs }, span)));
        }

        if lhs.len() > 1 {
            return Err(self.unexpected("expected := or = or comma"));
        }
        let Some(expr) = lhs.pop() else {
            return Err(self.unexpected("expected statement"));
        };

        let kind = match &self.peek().kind {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let inc = matches!(self.peek().kind, TokenKind::PlusPlus);
                self.advance();
                StmtKind::IncDec { expr, inc }
            }
            TokenKind::Colon if matches!(expr.kind, ExprKind::Ident(_)) => {
                return Err(self.error("labels are not supported"));
            }
            _ => StmtKind::Expr(expr),
        };
        let span = start.merge(self.previous().span);
        Ok(Simple::Stmt(Stmt::new(kind, span)))
    }

    /// The simple statement of a control clause, required to be an expression
    fn simple_to_expr(&self, simple: Simple, what: &str) -> LgoResult<Expr> {
        match simple {
            Simple::Stmt(Stmt {
                kind: StmtKind::Expr(e),
                ..
            }) => Ok(e),
            Simple::Stmt(stmt) => Err(LgoError::parser(
                format!("cannot use a statement as {}", what),
                stmt.span,
            )),
            Simple::Range { expr, .. } => Err(LgoError::parser("unexpected range clause", expr.span)),
        }
    }

    fn simple_to_stmt(&self, simple: Simple) -> LgoResult<Stmt> {
        match simple {
            Simple::Stmt(stmt) => Ok(stmt),
            Simple::Range { expr, .. } => Err(LgoError::parser("unexpected range clause", expr.span)),
        }
    }

    fn parse_if(&mut self) -> LgoResult<StmtKind> {
        self.expect_keyword(Keyword::If, "expected 'if'")?;
        let saved = std::mem::replace(&mut self.expr_lev, -1);
        let header = self.parse_if_header();
        self.expr_lev = saved;
        let (init, cond) = header?;

        let then = self.parse_block_stmt()?;
        let els = if self.match_keyword(Keyword::Else) {
            let start = self.current_span();
            let kind = if self.check_keyword(Keyword::If) {
                self.parse_if()?
            } else if self.check(&TokenKind::LBrace) {
                StmtKind::Block(self.parse_block_stmt()?)
            } else {
                return Err(self.error("else must be followed by if or statement block"));
            };
            Some(Box::new(Stmt::new(kind, start.merge(self.previous().span))))
        } else {
            None
        };

        Ok(StmtKind::If {
            init,
            cond,
            then,
            els,
        })
    }

    fn parse_if_header(&mut self) -> LgoResult<(Option<Box<Stmt>>, Expr)> {
        if self.check(&TokenKind::LBrace) {
            return Err(self.error("missing condition in if statement"));
        }
        if self.match_token(&TokenKind::Semicolon) {
            return Ok((None, self.parse_expr()?));
        }
        let first = self.parse_simple_stmt(false)?;
        if self.match_token(&TokenKind::Semicolon) {
            let init = self.simple_to_stmt(first)?;
            if self.check(&TokenKind::LBrace) {
                return Err(self.error("missing condition in if statement"));
            }
            Ok((Some(Box::new(init)), self.parse_expr()?))
        } else {
            Ok((None, self.simple_to_expr(first, "if condition")?))
        }
    }

    fn parse_for(&mut self) -> LgoResult<StmtKind> {
        self.expect_keyword(Keyword::For, "expected 'for'")?;
        let saved = std::mem::replace(&mut self.expr_lev, -1);
        let header = self.parse_for_header();
        self.expr_lev = saved;
        let header = header?;
        let body = self.parse_block_stmt()?;

        Ok(match header {
            ForHeader::Range {
                key,
                value,
                define,
                expr,
            } => StmtKind::Range {
                key,
                value,
                define,
                expr,
                body,
            },
            ForHeader::Loop { init, cond, post } => StmtKind::For {
                init,
                cond,
                post,
                body,
            },
        })
    }

    fn parse_for_header(&mut self) -> LgoResult<ForHeader> {
        if self.check(&TokenKind::LBrace) {
            return Ok(ForHeader::Loop {
                init: None,
                cond: None,
                post: None,
            });
        }

        let mut init = None;
        if !self.check(&TokenKind::Semicolon) {
            match self.parse_simple_stmt(true)? {
                Simple::Range {
                    key,
                    value,
                    define,
                    expr,
                } => {
                    return Ok(ForHeader::Range {
                        key,
                        value,
                        define,
                        expr,
                    });
                }
                Simple::Stmt(stmt) => {
                    if !self.check(&TokenKind::Semicolon) {
                        let cond = self.simple_to_expr(Simple::Stmt(stmt), "for condition")?;
                        return Ok(ForHeader::Loop {
                            init: None,
                            cond: Some(cond),
                            post: None,
                        });
                    }
                    init = Some(Box::new(stmt));
                }
            }
        }

        self.expect(&TokenKind::Semicolon, "expected ';'")?;
        let cond = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semicolon, "expected ';'")?;
        let post = if self.check(&TokenKind::LBrace) {
            None
        } else {
            let post = self.parse_simple_stmt(false)?;
            let post = self.simple_to_stmt(post)?;
            if matches!(post.kind, StmtKind::Assign { op: AssignOp::Define, .. }) {
                return Err(LgoError::parser("cannot declare in post statement of for loop", post.span));
            }
            Some(Box::new(post))
        };

        Ok(ForHeader::Loop { init, cond, post })
    }

    fn parse_switch(&mut self) -> LgoResult<StmtKind> {
        self.expect_keyword(Keyword::Switch, "expected 'switch'")?;
        let saved = std::mem::replace(&mut self.expr_lev, -1);
        let header = self.parse_switch_header();
        self.expr_lev = saved;
        let (init, tag) = header?;

        self.expect(&TokenKind::LBrace, "expected '{'")?;
        self.skip_semis();
        let mut clauses = Vec::new();
        let mut seen_default = false;
        while !self.check(&TokenKind::RBrace) {
            let start = self.current_span();
            let exprs = if self.match_keyword(Keyword::Case) {
                self.parse_expr_list()?
            } else if self.match_keyword(Keyword::Default) {
                if seen_default {
                    return Err(LgoError::parser("multiple defaults in switch", start));
                }
                seen_default = true;
                Vec::new()
            } else {
                return Err(self.unexpected("expected case or default or '}'"));
            };
            self.expect(&TokenKind::Colon, "expected ':'")?;
            let body = self.parse_stmt_list()?;
            clauses.push(CaseClause {
                exprs,
                body,
                span: start.merge(self.previous().span),
            });
        }
        self.expect(&TokenKind::RBrace, "expected '}'")?;

        Ok(StmtKind::Switch { init, tag, clauses })
    }

    fn parse_switch_header(&mut self) -> LgoResult<(Option<Box<Stmt>>, Option<Expr>)> {
        if self.check(&TokenKind::LBrace) {
            return Ok((None, None));
        }
        let first = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_simple_stmt(false)?)
        };
        if self.match_token(&TokenKind::Semicolon) {
            let init = first.map(|s| self.simple_to_stmt(s)).transpose()?.map(Box::new);
            let tag = if self.check(&TokenKind::LBrace) {
                None
            } else {
                let tag = self.parse_simple_stmt(false)?;
                Some(self.simple_to_expr(tag, "switch expression")?)
            };
            Ok((init, tag))
        } else {
            let tag = first.map(|s| self.simple_to_expr(s, "switch expression")).transpose()?;
            Ok((None, tag))
        }
    }

    // ==================== Expressions ====================

    fn parse_expr_list(&mut self) -> LgoResult<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.match_token(&TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    pub(crate) fn parse_expr(&mut self) -> LgoResult<Expr> {
        self.parse_binary_expr(1)
    }

    fn peek_binary_op(&self) -> Option<BinaryOp> {
        let op = match &self.peek().kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::Shl => BinaryOp::Shl,
            TokenKind::Shr => BinaryOp::Shr,
            TokenKind::AndNot => BinaryOp::AndNot,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::Ge,
            _ => return None,
        };
        Some(op)
    }

    fn parse_binary_expr(&mut self, min_prec: u8) -> LgoResult<Expr> {
        let mut left = self.parse_unary_expr()?;

        loop {
            let Some(op) = self.peek_binary_op() else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }

            self.advance();
            let right = self.parse_binary_expr(prec + 1)?;

            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> LgoResult<Expr> {
        let start = self.current_span();

        let op = match &self.peek().kind {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Caret => Some(UnaryOp::BitNot),
            TokenKind::Amp => Some(UnaryOp::Addr),
            TokenKind::Star => {
                self.advance();
                let operand = self.parse_unary_expr()?;
                let span = start.merge(operand.span);
                return Ok(Expr::new(ExprKind::Star(Box::new(operand)), span));
            }
            TokenKind::Arrow => return Err(self.error("channel operations are not supported")),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary_expr()?;
            let span = start.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    expr: Box::new(operand),
                },
                span,
            ));
        }

        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> LgoResult<Expr> {
        let mut expr = self.parse_operand()?;

        loop {
            match &self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    if self.check(&TokenKind::LParen) {
                        return Err(self.error("type assertions are not supported"));
                    }
                    let sel = self.parse_ident()?;
                    let span = expr.span.merge(sel.span);
                    expr = Expr::new(
                        ExprKind::Selector {
                            expr: Box::new(expr),
                            sel,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    self.expr_lev += 1;
                    let kind = self.parse_index_or_slice(expr);
                    self.expr_lev -= 1;
                    let kind = kind?;
                    let close = self.expect(&TokenKind::RBracket, "expected ']'")?;
                    let span = match &kind {
                        ExprKind::Index { expr, .. } | ExprKind::Slice { expr, .. } => expr.span.merge(close),
                        _ => close,
                    };
                    expr = Expr::new(kind, span);
                }
                TokenKind::LParen => {
                    self.advance();
                    self.expr_lev += 1;
                    let args = self.parse_call_args();
                    self.expr_lev -= 1;
                    let (args, ellipsis) = args?;
                    let close = self.expect(&TokenKind::RParen, "expected ')'")?;
                    let span = expr.span.merge(close);
                    expr = Expr::new(
                        ExprKind::Call {
                            func: Box::new(expr),
                            args,
                            ellipsis,
                        },
                        span,
                    );
                }
                TokenKind::LBrace
                    if is_literal_type(&expr) && (self.expr_lev >= 0 || !is_type_name(&expr)) =>
                {
                    expr = self.parse_composite_lit(Some(expr))?;
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_index_or_slice(&mut self, expr: Expr) -> LgoResult<ExprKind> {
        let low = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        if self.match_token(&TokenKind::Colon) {
            let high = if self.check(&TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            };
            if self.check(&TokenKind::Colon) {
                return Err(self.error("3-index slices are not supported"));
            }
            return Ok(ExprKind::Slice {
                expr: Box::new(expr),
                low,
                high,
            });
        }
        match low {
            Some(index) => Ok(ExprKind::Index {
                expr: Box::new(expr),
                index,
            }),
            None => Err(self.unexpected("expected operand")),
        }
    }

    fn parse_call_args(&mut self) -> LgoResult<(Vec<Expr>, bool)> {
        let mut args = Vec::new();
        let mut ellipsis = false;
        while !self.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if self.match_token(&TokenKind::Ellipsis) {
                ellipsis = true;
            }
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok((args, ellipsis))
    }

    fn parse_composite_lit(&mut self, ty: Option<Expr>) -> LgoResult<Expr> {
        let start = ty.as_ref().map(|t| t.span).unwrap_or_else(|| self.current_span());
        self.expect(&TokenKind::LBrace, "expected '{'")?;
        let saved = std::mem::replace(&mut self.expr_lev, 0);
        let elts = self.parse_elements();
        self.expr_lev = saved;
        let elts = elts?;
        if !self.check(&TokenKind::RBrace) {
            return Err(self.unexpected("expected ',' or '}' in composite literal"));
        }
        let close = self.advance().span;
        Ok(Expr::new(
            ExprKind::CompositeLit {
                ty: ty.map(Box::new),
                elts,
            },
            start.merge(close),
        ))
    }

    fn parse_elements(&mut self) -> LgoResult<Vec<Expr>> {
        let mut elts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let elt = self.parse_element()?;
            let elt = if self.match_token(&TokenKind::Colon) {
                let value = self.parse_element()?;
                let span = elt.span.merge(value.span);
                Expr::new(
                    ExprKind::KeyValue {
                        key: Box::new(elt),
                        value: Box::new(value),
                    },
                    span,
                )
            } else {
                elt
            };
            elts.push(elt);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(elts)
    }

    fn parse_element(&mut self) -> LgoResult<Expr> {
        if self.check(&TokenKind::LBrace) {
            self.parse_composite_lit(None)
        } else {
            self.parse_expr()
        }
    }

    fn parse_operand(&mut self) -> LgoResult<Expr> {
        let start = self.current_span();
        let lit = |kind: LitKind, value: &str| ExprKind::BasicLit(BasicLit {
            kind,
            value: value.to_string(),
        });

        let kind = match &self.peek().kind {
            TokenKind::Int(v) => lit(LitKind::Int, v),
            TokenKind::Float(v) => lit(LitKind::Float, v),
            TokenKind::Char(v) => lit(LitKind::Char, v),
            TokenKind::String(v) => lit(LitKind::String, v),
            TokenKind::Ident(_) => {
                let ident = self.parse_ident()?;
                return Ok(Expr::new(ExprKind::Ident(ident), start));
            }
            TokenKind::LParen => {
                self.advance();
                self.expr_lev += 1;
                let inner = self.parse_expr();
                self.expr_lev -= 1;
                let inner = inner?;
                let close = self.expect(&TokenKind::RParen, "expected ')'")?;
                return Ok(Expr::new(ExprKind::Paren(Box::new(inner)), start.merge(close)));
            }
            TokenKind::Keyword(Keyword::Func) => {
                self.advance();
                let ty = self.parse_signature()?;
                if !self.check(&TokenKind::LBrace) {
                    return Ok(Expr::new(ExprKind::FuncType(ty), start.merge(self.previous().span)));
                }
                let saved = std::mem::replace(&mut self.expr_lev, 0);
                let body = self.parse_block_stmt();
                self.expr_lev = saved;
                let body = body?;
                let span = start.merge(body.span);
                return Ok(Expr::new(ExprKind::FuncLit { ty, body }, span));
            }
            TokenKind::LBracket
            | TokenKind::Keyword(Keyword::Map | Keyword::Struct | Keyword::Interface | Keyword::Chan) => {
                return self.parse_type();
            }
            _ => return Err(self.unexpected("expected expression")),
        };

        self.advance();
        Ok(Expr::new(kind, start))
    }
}

/// Header of a `for` statement
enum ForHeader {
    Loop {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
    },
}

/// Expressions that may be followed by `{` to form a composite literal
fn is_literal_type(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(_) | ExprKind::SliceType(_) | ExprKind::MapType { .. } | ExprKind::StructType(_) => true,
        ExprKind::Selector { expr, .. } => matches!(expr.kind, ExprKind::Ident(_)),
        _ => false,
    }
}

fn is_type_name(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(_) => true,
        ExprKind::Selector { expr, .. } => matches!(expr.kind, ExprKind::Ident(_)),
        _ => false,
    }
}

/// Strip the quotes of an import path literal
fn unquote(lit: &str) -> String {
    lit.trim_matches(|c| c == '"' || c == '`').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(source: &str) -> LgoBlock {
        Parser::new(source).parse_block().unwrap()
    }

    #[test]
    fn test_parse_block_with_imports_and_decls() {
        let b = block(
            r#"
            import "fmt"
            import (
                s "strings"
            )

            type point struct { x, y int }
            func (p *point) norm() int { return p.x*p.x + p.y*p.y }
            p := point{x: 3, y: 4}
            fmt.Println(s.ToUpper("hi"), p.norm())
            "#,
        );
        assert_eq!(b.stmts.len(), 6);
        match &b.stmts[1].kind {
            StmtKind::Decl(Decl::Gen(g)) => {
                assert_eq!(g.kind, GenKind::Import);
                assert!(g.grouped);
                let Spec::Import(spec) = &g.specs[0] else { panic!("expected import") };
                assert_eq!(spec.name.as_ref().map(|n| n.name.as_str()), Some("s"));
                assert_eq!(spec.path, "strings");
            }
            other => panic!("unexpected {:?}", other),
        }
        match &b.stmts[3].kind {
            StmtKind::Decl(Decl::Func(f)) => {
                assert_eq!(f.name.name, "norm");
                assert!(f.recv.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            &b.stmts[4].kind,
            StmtKind::Assign { op: AssignOp::Define, .. }
        ));
    }

    #[test]
    fn test_param_grouping() {
        let b = block("func f(a, b int, c ...string) (n int, err error) { return }");
        let StmtKind::Decl(Decl::Func(f)) = &b.stmts[0].kind else { panic!("expected func") };
        assert_eq!(f.ty.params.len(), 2);
        assert_eq!(f.ty.params[0].names.len(), 2);
        assert!(matches!(f.ty.params[1].ty.kind, ExprKind::Ellipsis(_)));
        assert_eq!(f.ty.results.len(), 2);

        let b = block("var g func(int, string) bool");
        let StmtKind::Decl(Decl::Gen(g)) = &b.stmts[0].kind else { panic!("expected var") };
        let Spec::Value(v) = &g.specs[0] else { panic!("expected value spec") };
        let Some(Expr { kind: ExprKind::FuncType(ft), .. }) = &v.ty else { panic!("expected func type") };
        assert_eq!(ft.params.len(), 2);
        assert!(ft.params.iter().all(|p| p.names.is_empty()));
    }

    #[test]
    fn test_composite_literal_not_in_if_header() {
        let b = block("if x == y {\n\tz()\n}");
        let StmtKind::If { cond, then, .. } = &b.stmts[0].kind else { panic!("expected if") };
        assert!(matches!(cond.kind, ExprKind::Binary { .. }));
        assert_eq!(then.stmts.len(), 1);

        let b = block("if v := []int{1, 2}; len(v) > 1 {\n}");
        let StmtKind::If { init, .. } = &b.stmts[0].kind else { panic!("expected if") };
        assert!(init.is_some());
    }

    #[test]
    fn test_for_forms() {
        let b = block("for i := 0; i < 3; i++ {\n}\nfor k, v := range m {\n}\nfor x < 3 {\n}\nfor {\n}");
        assert!(matches!(&b.stmts[0].kind, StmtKind::For { init: Some(_), cond: Some(_), post: Some(_), .. }));
        assert!(matches!(&b.stmts[1].kind, StmtKind::Range { key: Some(_), value: Some(_), define: true, .. }));
        assert!(matches!(&b.stmts[2].kind, StmtKind::For { init: None, cond: Some(_), post: None, .. }));
        assert!(matches!(&b.stmts[3].kind, StmtKind::For { init: None, cond: None, post: None, .. }));
    }

    #[test]
    fn test_switch() {
        let b = block("switch x := f(); x {\ncase 1, 2:\n\tg()\ndefault:\n}");
        let StmtKind::Switch { init, tag, clauses } = &b.stmts[0].kind else { panic!("expected switch") };
        assert!(init.is_some());
        assert!(tag.is_some());
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].exprs.len(), 2);
        assert!(clauses[1].exprs.is_empty());
    }

    #[test]
    fn test_func_literal_statement_is_not_a_declaration() {
        let b = block("func() {\n\tprintln(1)\n}()");
        assert!(matches!(&b.stmts[0].kind, StmtKind::Expr(Expr { kind: ExprKind::Call { .. }, .. })));
    }

    #[test]
    fn test_leading_comments_are_attached() {
        let b = block("x := 1 // trailing\n// about y\ny := 2");
        assert!(b.stmts[0].doc.is_empty());
        assert_eq!(b.stmts[1].doc, vec!["// about y".to_string()]);
    }

    #[test]
    fn test_parse_file() {
        let file = Parser::new("package fmt\n\nfunc Println(a ...interface{}) (n int, err error)\n")
            .parse_file()
            .unwrap();
        assert_eq!(file.package.name, "fmt");
        let Decl::Func(f) = &file.decls[0] else { panic!("expected func") };
        assert!(f.body.is_none());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            Parser::new("x := ").parse_block(),
            Err(LgoError::Parser { .. })
        ));
        assert!(matches!(
            Parser::new("s := \"abc").parse_block(),
            Err(LgoError::Lexer { .. })
        ));
        assert!(Parser::new("x := 1\nimport \"fmt\"").parse_block().is_err());
        assert!(Parser::new("go x").parse_block().is_err());
    }
}
