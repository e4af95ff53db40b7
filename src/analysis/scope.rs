//! Objects, scopes and packages
//!
//! An [`Object`] is anything a name can resolve to. Objects are shared
//! (`Rc`) between the scope that declares them, the identifier maps of
//! [`Info`](super::Info), and later conversions that see them as old
//! symbols of a prior block.

use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::types::Type;
use crate::errors::SourceSpan;

pub type ObjectRef = Rc<Object>;

/// A scope containing object definitions, ordered by name
#[derive(Debug, Clone, Default)]
pub struct Scope {
    objects: BTreeMap<String, ObjectRef>,
}

impl Scope {
    /// Create a new empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object, returning the one it replaced
    pub fn insert(&mut self, obj: ObjectRef) -> Option<ObjectRef> {
        self.objects.insert(obj.name.clone(), obj)
    }

    /// Look up a name in this scope only
    pub fn lookup(&self, name: &str) -> Option<&ObjectRef> {
        self.objects.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Sorted names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Objects in name order
    pub fn objects(&self) -> impl Iterator<Item = &ObjectRef> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Predeclared functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Append,
    Cap,
    Copy,
    Delete,
    Len,
    Make,
    New,
    Panic,
    Print,
    Println,
    Recover,
}

impl Builtin {
    pub const ALL: [Builtin; 11] = [
        Builtin::Append,
        Builtin::Cap,
        Builtin::Copy,
        Builtin::Delete,
        Builtin::Len,
        Builtin::Make,
        Builtin::New,
        Builtin::Panic,
        Builtin::Print,
        Builtin::Println,
        Builtin::Recover,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Append => "append",
            Builtin::Cap => "cap",
            Builtin::Copy => "copy",
            Builtin::Delete => "delete",
            Builtin::Len => "len",
            Builtin::Make => "make",
            Builtin::New => "new",
            Builtin::Panic => "panic",
            Builtin::Print => "print",
            Builtin::Println => "println",
            Builtin::Recover => "recover",
        }
    }
}

/// The kind of entity an object names
#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// A variable or parameter
    Var,
    /// A struct field
    Field,
    Const,
    TypeName,
    /// A function or method (interface methods included)
    Func,
    /// An imported package, under the name it is imported as
    PkgName(Rc<Package>),
    Builtin(Builtin),
    Nil,
}

/// A named language entity
#[derive(Debug)]
pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
    ty: RefCell<Type>,
    /// Owning package; `None` for universe objects
    pkg: Option<Rc<Package>>,
    pub span: SourceSpan,
    used: Cell<bool>,
}

impl Object {
    pub fn new(name: impl Into<String>, kind: ObjectKind, ty: Type, pkg: Option<Rc<Package>>) -> ObjectRef {
        Rc::new(Self {
            name: name.into(),
            kind,
            ty: RefCell::new(ty),
            pkg,
            span: SourceSpan::default(),
            used: Cell::new(false),
        })
    }

    /// Same as [`Object::new`], remembering where the object is declared
    pub fn declared(
        name: impl Into<String>,
        kind: ObjectKind,
        ty: Type,
        pkg: &Rc<Package>,
        span: SourceSpan,
    ) -> ObjectRef {
        Rc::new(Self {
            name: name.into(),
            kind,
            ty: RefCell::new(ty),
            pkg: Some(pkg.clone()),
            span,
            used: Cell::new(false),
        })
    }

    /// A package name declared by an import in `owner`
    pub fn pkg_name(name: impl Into<String>, imported: Rc<Package>, owner: &Rc<Package>) -> ObjectRef {
        Self::new(name, ObjectKind::PkgName(imported), Type::Invalid, Some(owner.clone()))
    }

    pub fn ty(&self) -> Type {
        self.ty.borrow().clone()
    }

    pub fn set_ty(&self, ty: Type) {
        *self.ty.borrow_mut() = ty;
    }

    pub fn pkg(&self) -> Option<&Rc<Package>> {
        self.pkg.as_ref()
    }

    pub fn used(&self) -> bool {
        self.used.get()
    }

    pub fn mark_used(&self) {
        self.used.set(true);
    }

    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, ObjectKind::Field)
    }

    /// The imported package of a package name
    pub fn imported(&self) -> Option<&Rc<Package>> {
        match &self.kind {
            ObjectKind::PkgName(pkg) => Some(pkg),
            _ => None,
        }
    }

    /// Whether the object is declared directly in its package's scope
    pub fn is_package_level(self: &Rc<Self>) -> bool {
        self.pkg
            .as_ref()
            .and_then(|pkg| pkg.lookup(&self.name))
            .is_some_and(|found| Rc::ptr_eq(&found, self))
    }

    /// Whether the object is owned by a session (block) package
    pub fn in_session(&self) -> bool {
        self.pkg.as_ref().is_some_and(|p| p.is_session())
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ObjectKind::Var | ObjectKind::Field => write!(f, "var {} {}", self.name, self.ty()),
            ObjectKind::Const => write!(f, "const {} {}", self.name, self.ty()),
            ObjectKind::TypeName => {
                write!(f, "type {} {}", self.name, self.ty().underlying())
            }
            ObjectKind::Func => write!(f, "func {}{}", self.name, self.ty().signature_suffix()),
            ObjectKind::PkgName(pkg) => write!(f, "package {} ({:?})", self.name, pkg.path),
            ObjectKind::Builtin(_) => write!(f, "builtin {}", self.name),
            ObjectKind::Nil => write!(f, "nil"),
        }
    }
}

/// A package: path, name and top-level scope
#[derive(Debug)]
pub struct Package {
    pub path: String,
    pub name: String,
    /// Produced from a REPL block rather than a library stub
    session: bool,
    scope: RefCell<Scope>,
}

impl Package {
    pub fn new(path: impl Into<String>, name: impl Into<String>, session: bool) -> Rc<Self> {
        Rc::new(Self {
            path: path.into(),
            name: name.into(),
            session,
            scope: RefCell::new(Scope::new()),
        })
    }

    pub fn is_session(&self) -> bool {
        self.session
    }

    pub fn scope(&self) -> Ref<'_, Scope> {
        self.scope.borrow()
    }

    pub fn lookup(&self, name: &str) -> Option<ObjectRef> {
        self.scope.borrow().lookup(name).cloned()
    }

    pub fn insert(&self, obj: ObjectRef) -> Option<ObjectRef> {
        self.scope.borrow_mut().insert(obj)
    }

    /// Top-level objects in name order
    pub fn objects(&self) -> Vec<ObjectRef> {
        self.scope.borrow().objects().cloned().collect()
    }
}

/// Exported names start with an upper-case letter
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::BasicKind;

    #[test]
    fn test_scope_insert_replaces() {
        let mut scope = Scope::new();
        let a = Object::new("a", ObjectKind::Var, Type::Basic(BasicKind::Int), None);
        let b = Object::new("a", ObjectKind::Var, Type::Basic(BasicKind::String), None);
        assert!(scope.insert(a.clone()).is_none());
        let prev = scope.insert(b).unwrap();
        assert!(Rc::ptr_eq(&prev, &a));
        assert_eq!(scope.names().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_package_level() {
        let pkg = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let x = Object::declared("x", ObjectKind::Var, Type::Basic(BasicKind::Int), &pkg, SourceSpan::default());
        let local = Object::declared("x", ObjectKind::Var, Type::Basic(BasicKind::Int), &pkg, SourceSpan::default());
        pkg.insert(x.clone());
        assert!(x.is_package_level());
        assert!(!local.is_package_level());
        assert!(x.in_session());
        assert_eq!(x.to_string(), "var x int");
    }

    #[test]
    fn test_is_exported() {
        assert!(is_exported("Println"));
        assert!(!is_exported("x"));
        assert!(!is_exported("_"));
        assert!(!is_exported(""));
    }
}
