//! Abstract Syntax Tree (AST) definitions
//!
//! These types represent a block or package file after parsing. Types are
//! ordinary expressions (`[]int`, `map[string]T`, `*p`), as in Go, since the
//! same syntax can denote either depending on what a name resolves to.
//!
//! Identifiers, expressions, statements and import specs carry a [`NodeId`]
//! so analysis results can be keyed by node while the tree is rewritten.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::errors::SourceSpan;

/// Identity of a syntax node, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Allocate a fresh id
    pub fn fresh() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// An identifier
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: SourceSpan,
    pub id: NodeId,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            name: name.into(),
            span,
            id: NodeId::fresh(),
        }
    }

    /// An identifier produced by a rewrite rather than the parser
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self::new(name, SourceSpan::default())
    }

    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

/// A REPL block: top-level statements and declarations in source order
#[derive(Debug, Clone, Default)]
pub struct LgoBlock {
    pub stmts: Vec<Stmt>,
}

/// A complete package file
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub package: Ident,
    pub decls: Vec<Decl>,
}

/// A top-level (or block-level) declaration
#[derive(Debug, Clone)]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

impl Decl {
    pub fn span(&self) -> SourceSpan {
        match self {
            Decl::Gen(g) => g.span,
            Decl::Func(f) => f.span,
        }
    }
}

/// `import`, `const`, `var` or `type` declaration with one or more specs
#[derive(Debug, Clone)]
pub struct GenDecl {
    pub kind: GenKind,
    pub specs: Vec<Spec>,
    /// Whether the specs are written inside `( ... )`
    pub grouped: bool,
    pub span: SourceSpan,
    /// Leading comment lines
    pub doc: Vec<String>,
}

impl GenDecl {
    pub fn new(kind: GenKind, specs: Vec<Spec>, grouped: bool) -> Self {
        Self {
            kind,
            specs,
            grouped,
            span: SourceSpan::default(),
            doc: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenKind {
    Import,
    Const,
    Var,
    Type,
}

impl fmt::Display for GenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenKind::Import => "import",
            GenKind::Const => "const",
            GenKind::Var => "var",
            GenKind::Type => "type",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

/// `name "path"`
#[derive(Debug, Clone)]
pub struct ImportSpec {
    pub name: Option<Ident>,
    /// The unquoted import path
    pub path: String,
    pub span: SourceSpan,
    pub id: NodeId,
}

impl ImportSpec {
    pub fn new(name: Option<Ident>, path: impl Into<String>) -> Self {
        Self {
            name,
            path: path.into(),
            span: SourceSpan::default(),
            id: NodeId::fresh(),
        }
    }
}

/// `a, b T = x, y` in a `var` or `const` declaration
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    pub ty: Expr,
    pub span: SourceSpan,
}

/// A function or method declaration; stubs have no body
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub recv: Option<Field>,
    pub name: Ident,
    pub ty: FuncType,
    pub body: Option<BlockStmt>,
    pub span: SourceSpan,
    pub doc: Vec<String>,
}

/// Parameter and result lists of a function signature
#[derive(Debug, Clone, Default)]
pub struct FuncType {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

/// A parameter, result, struct field or interface method.
/// `names` is empty for unnamed parameters.
#[derive(Debug, Clone)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub span: SourceSpan,
}

impl Field {
    pub fn new(names: Vec<Ident>, ty: Expr) -> Self {
        Self {
            names,
            ty,
            span: SourceSpan::default(),
        }
    }
}

/// `{ stmts }`
#[derive(Debug, Clone, Default)]
pub struct BlockStmt {
    pub stmts: Vec<Stmt>,
    pub span: SourceSpan,
}

impl BlockStmt {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self {
            stmts,
            span: SourceSpan::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: SourceSpan,
    pub id: NodeId,
    /// Leading comment lines
    pub doc: Vec<String>,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: SourceSpan) -> Self {
        Self {
            kind,
            span,
            id: NodeId::fresh(),
            doc: Vec::new(),
        }
    }

    pub fn synthetic(kind: StmtKind) -> Self {
        Self::new(kind, SourceSpan::default())
    }
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Declaration inside a body (or anywhere in a block)
    Decl(Decl),
    /// Expression statement
    Expr(Expr),
    /// `lhs op rhs`
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
    },
    /// `x++` / `x--`
    IncDec { expr: Expr, inc: bool },
    /// `go call`
    Go(Expr),
    /// `defer call`
    Defer(Expr),
    Return(Vec<Expr>),
    Break,
    Continue,
    Block(BlockStmt),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: BlockStmt,
        /// Either another `If` or a `Block`
        els: Option<Box<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: BlockStmt,
    },
    /// `for key, value := range expr`
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
        body: BlockStmt,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        clauses: Vec<CaseClause>,
    },
    Empty,
}

/// `case a, b:` or `default:` with its statements
#[derive(Debug, Clone)]
pub struct CaseClause {
    /// Empty for `default`
    pub exprs: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `:=`
    Define,
    /// `=`
    Assign,
    /// `+=`, `<<=`, ...
    Op(BinaryOp),
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignOp::Define => write!(f, ":="),
            AssignOp::Assign => write!(f, "="),
            AssignOp::Op(op) => write!(f, "{}=", op),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: SourceSpan,
    pub id: NodeId,
}

impl Expr {
    pub fn new(kind: ExprKind, span: SourceSpan) -> Self {
        Self {
            kind,
            span,
            id: NodeId::fresh(),
        }
    }

    pub fn synthetic(kind: ExprKind) -> Self {
        Self::new(kind, SourceSpan::default())
    }

    /// A bare identifier expression
    pub fn ident(name: impl Into<String>) -> Self {
        Self::synthetic(ExprKind::Ident(Ident::synthetic(name)))
    }

    /// `pkg.name`
    pub fn qualified(pkg: &str, name: &str) -> Self {
        Self::synthetic(ExprKind::Selector {
            expr: Box::new(Expr::ident(pkg)),
            sel: Ident::synthetic(name),
        })
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Self::synthetic(ExprKind::Call {
            func: Box::new(func),
            args,
            ellipsis: false,
        })
    }

    /// Strip any number of enclosing parentheses
    pub fn unparen(&self) -> &Expr {
        let mut e = self;
        while let ExprKind::Paren(inner) = &e.kind {
            e = inner;
        }
        e
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Ident(Ident),
    BasicLit(BasicLit),
    /// `T{elts}`; the type is omitted for elided inner literals
    CompositeLit {
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
    },
    FuncLit {
        ty: FuncType,
        body: BlockStmt,
    },
    Paren(Box<Expr>),
    Selector {
        expr: Box<Expr>,
        sel: Ident,
    },
    Index {
        expr: Box<Expr>,
        index: Box<Expr>,
    },
    /// `expr[low:high]`
    Slice {
        expr: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        /// Trailing `...` spreading the last argument
        ellipsis: bool,
    },
    /// Dereference, or a pointer type
    Star(Box<Expr>),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `key: value` inside a composite literal
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    SliceType(Box<Expr>),
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    StructType(Vec<Field>),
    FuncType(FuncType),
    /// Method list; each field names one method and has a `FuncType` type
    InterfaceType(Vec<Field>),
    /// `...T` as the type of a final parameter
    Ellipsis(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicLit {
    pub kind: LitKind,
    /// Source text, quotes included
    pub value: String,
}

impl BasicLit {
    /// A string literal holding `s`
    pub fn string(s: &str) -> Self {
        Self {
            kind: LitKind::String,
            value: format!("{:?}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Char,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `^x`
    BitNot,
    /// `&x`
    Addr,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "^",
            UnaryOp::Addr => "&",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    AndNot,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    /// Go operator precedence, 5 binds tightest
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::BitAnd
            | BinaryOp::AndNot => 5,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::BitOr | BinaryOp::BitXor => 4,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::And => 2,
            BinaryOp::Or => 1,
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == 3
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::AndNot => "&^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
