//! Type representation for semantic analysis
//!
//! These types are used during type checking and are separate from the AST
//! type expressions. Named types, structs, signatures and interfaces are
//! reference counted so identity can be compared with `Rc::ptr_eq`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::scope::{ObjectKind, ObjectRef, Package};

/// Predeclared basic types, including the untyped constant kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    String,
    /// Alias of `uint8`
    Byte,
    /// Alias of `int32`
    Rune,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedString,
    UntypedNil,
}

impl BasicKind {
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::String => "string",
            BasicKind::Byte => "byte",
            BasicKind::Rune => "rune",
            BasicKind::UntypedBool => "untyped bool",
            BasicKind::UntypedInt => "untyped int",
            BasicKind::UntypedRune => "untyped rune",
            BasicKind::UntypedFloat => "untyped float",
            BasicKind::UntypedString => "untyped string",
            BasicKind::UntypedNil => "untyped nil",
        }
    }

    /// Resolve the `byte`/`rune` aliases
    fn canonical(self) -> BasicKind {
        match self {
            BasicKind::Byte => BasicKind::Uint8,
            BasicKind::Rune => BasicKind::Int32,
            k => k,
        }
    }

    pub fn is_untyped(self) -> bool {
        matches!(
            self,
            BasicKind::UntypedBool
                | BasicKind::UntypedInt
                | BasicKind::UntypedRune
                | BasicKind::UntypedFloat
                | BasicKind::UntypedString
                | BasicKind::UntypedNil
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self.canonical(),
            BasicKind::Int
                | BasicKind::Int8
                | BasicKind::Int16
                | BasicKind::Int32
                | BasicKind::Int64
                | BasicKind::Uint
                | BasicKind::Uint8
                | BasicKind::Uint16
                | BasicKind::Uint32
                | BasicKind::Uint64
                | BasicKind::Uintptr
                | BasicKind::UntypedInt
                | BasicKind::UntypedRune
        )
    }

    /// `byte` or `uint8`
    pub fn is_byte(self) -> bool {
        self.canonical() == BasicKind::Uint8
    }

    pub fn is_float(self) -> bool {
        matches!(self, BasicKind::Float32 | BasicKind::Float64 | BasicKind::UntypedFloat)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_string(self) -> bool {
        matches!(self, BasicKind::String | BasicKind::UntypedString)
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, BasicKind::Bool | BasicKind::UntypedBool)
    }

    /// Type an untyped constant gets when nothing else decides it
    pub fn default_kind(self) -> BasicKind {
        match self {
            BasicKind::UntypedBool => BasicKind::Bool,
            BasicKind::UntypedInt => BasicKind::Int,
            BasicKind::UntypedRune => BasicKind::Rune,
            BasicKind::UntypedFloat => BasicKind::Float64,
            BasicKind::UntypedString => BasicKind::String,
            k => k,
        }
    }

    /// Ordering used to combine two untyped numeric constants
    fn untyped_rank(self) -> u8 {
        match self {
            BasicKind::UntypedInt => 1,
            BasicKind::UntypedRune => 2,
            BasicKind::UntypedFloat => 3,
            _ => 0,
        }
    }
}

/// A defined type: `type T underlying`
#[derive(Debug)]
pub struct NamedType {
    pub name: String,
    /// `None` for the predeclared `error`
    pub pkg: Option<Rc<Package>>,
    underlying: RefCell<Type>,
    methods: RefCell<Vec<ObjectRef>>,
}

impl NamedType {
    pub fn new(name: impl Into<String>, pkg: Option<Rc<Package>>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            pkg,
            underlying: RefCell::new(Type::Invalid),
            methods: RefCell::new(Vec::new()),
        })
    }

    pub fn set_underlying(&self, ty: Type) {
        *self.underlying.borrow_mut() = ty;
    }

    /// The declared type, possibly another named type
    pub fn declared(&self) -> Type {
        self.underlying.borrow().clone()
    }

    pub fn add_method(&self, method: ObjectRef) {
        self.methods.borrow_mut().push(method);
    }

    pub fn methods(&self) -> Vec<ObjectRef> {
        self.methods.borrow().clone()
    }

    pub fn method(&self, name: &str) -> Option<ObjectRef> {
        self.methods.borrow().iter().find(|m| m.name == name).cloned()
    }
}

#[derive(Debug)]
pub struct StructType {
    /// Field objects, in declaration order
    pub fields: Vec<ObjectRef>,
}

#[derive(Debug, Clone)]
pub struct Signature {
    /// Receiver type of a method
    pub recv: Option<Type>,
    pub params: Vec<Type>,
    pub results: Vec<Type>,
    /// The last parameter is `...T`, stored as `[]T`
    pub variadic: bool,
}

impl Signature {
    /// The signature as seen through a method value
    pub fn without_recv(&self) -> Signature {
        Signature {
            recv: None,
            ..self.clone()
        }
    }

    /// Call result: a single type, or a tuple for zero or several results
    pub fn result_type(&self) -> Type {
        match self.results.as_slice() {
            [single] => single.clone(),
            results => Type::Tuple(results.to_vec()),
        }
    }
}

#[derive(Debug, Default)]
pub struct InterfaceType {
    methods: RefCell<Vec<ObjectRef>>,
}

impl InterfaceType {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn add_method(&self, method: ObjectRef) {
        self.methods.borrow_mut().push(method);
    }

    pub fn methods(&self) -> Vec<ObjectRef> {
        self.methods.borrow().clone()
    }

    pub fn method(&self, name: &str) -> Option<ObjectRef> {
        self.methods.borrow().iter().find(|m| m.name == name).cloned()
    }
}

/// A resolved type
#[derive(Debug, Clone, Default)]
pub enum Type {
    /// Unknown type (for error recovery)
    #[default]
    Invalid,
    Basic(BasicKind),
    Named(Rc<NamedType>),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Struct(Rc<StructType>),
    Signature(Rc<Signature>),
    Interface(Rc<InterfaceType>),
    /// Result of a call with zero or several results
    Tuple(Vec<Type>),
}

impl Type {
    pub fn basic(kind: BasicKind) -> Self {
        Type::Basic(kind)
    }

    pub fn pointer(elem: Type) -> Self {
        Type::Pointer(Box::new(elem))
    }

    pub fn slice(elem: Type) -> Self {
        Type::Slice(Box::new(elem))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map(Box::new(key), Box::new(value))
    }

    pub fn signature(sig: Signature) -> Self {
        Type::Signature(Rc::new(sig))
    }

    pub fn empty_interface() -> Self {
        Type::Interface(InterfaceType::new())
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Type::Invalid)
    }

    /// Follow named types down to a type literal
    pub fn underlying(&self) -> Type {
        let mut ty = self.clone();
        // Bounded so that `type A B; type B A` cannot loop
        for _ in 0..64 {
            match ty {
                Type::Named(named) => ty = named.declared(),
                other => return other,
            }
        }
        Type::Invalid
    }

    /// Basic kind of the underlying type
    pub fn basic_kind(&self) -> Option<BasicKind> {
        match self.underlying() {
            Type::Basic(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, Type::Basic(kind) if kind.is_untyped())
    }

    pub fn is_untyped_nil(&self) -> bool {
        matches!(self, Type::Basic(BasicKind::UntypedNil))
    }

    pub fn is_numeric(&self) -> bool {
        self.basic_kind().is_some_and(BasicKind::is_numeric)
    }

    pub fn is_integer(&self) -> bool {
        self.basic_kind().is_some_and(BasicKind::is_integer)
    }

    pub fn is_string(&self) -> bool {
        self.basic_kind().is_some_and(BasicKind::is_string)
    }

    pub fn is_boolean(&self) -> bool {
        self.basic_kind().is_some_and(BasicKind::is_boolean)
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.underlying(), Type::Interface(_))
    }

    /// Types that may be `nil`
    pub fn is_nillable(&self) -> bool {
        matches!(
            self.underlying(),
            Type::Pointer(_) | Type::Slice(_) | Type::Map(..) | Type::Signature(_) | Type::Interface(_)
        )
    }

    /// Default type of an untyped constant, the type itself otherwise
    pub fn default_type(&self) -> Type {
        match self {
            Type::Basic(kind) => Type::Basic(kind.default_kind()),
            other => other.clone(),
        }
    }

    pub fn as_signature(&self) -> Option<Rc<Signature>> {
        match self.underlying() {
            Type::Signature(sig) => Some(sig),
            _ => None,
        }
    }

    /// `func(params) results` without the leading keyword
    pub fn signature_suffix(&self) -> String {
        match self.as_signature() {
            Some(sig) => {
                let text = Type::Signature(sig).to_string();
                text.trim_start_matches("func").to_string()
            }
            None => String::new(),
        }
    }

    /// Combined type of two untyped constants in a binary operation
    pub fn larger_untyped(a: BasicKind, b: BasicKind) -> BasicKind {
        if a.untyped_rank() >= b.untyped_rank() { a } else { b }
    }
}

/// Type identity
pub fn identical(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Invalid, _) | (_, Type::Invalid) => true,
        (Type::Basic(x), Type::Basic(y)) => x.canonical() == y.canonical(),
        (Type::Named(x), Type::Named(y)) => Rc::ptr_eq(x, y),
        (Type::Pointer(x), Type::Pointer(y)) | (Type::Slice(x), Type::Slice(y)) => identical(x, y),
        (Type::Map(k1, v1), Type::Map(k2, v2)) => identical(k1, k2) && identical(v1, v2),
        (Type::Struct(x), Type::Struct(y)) => {
            Rc::ptr_eq(x, y)
                || (x.fields.len() == y.fields.len()
                    && x.fields
                        .iter()
                        .zip(&y.fields)
                        .all(|(f, g)| f.name == g.name && identical(&f.ty(), &g.ty())))
        }
        (Type::Signature(x), Type::Signature(y)) => identical_signatures(x, y),
        (Type::Interface(x), Type::Interface(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let (xm, ym) = (x.methods(), y.methods());
            xm.len() == ym.len()
                && xm.iter().all(|m| {
                    ym.iter()
                        .any(|n| m.name == n.name && identical_method_types(&m.ty(), &n.ty()))
                })
        }
        (Type::Tuple(x), Type::Tuple(y)) => x.len() == y.len() && x.iter().zip(y).all(|(s, t)| identical(s, t)),
        _ => false,
    }
}

fn identical_signatures(x: &Signature, y: &Signature) -> bool {
    x.variadic == y.variadic
        && x.params.len() == y.params.len()
        && x.results.len() == y.results.len()
        && x.params.iter().zip(&y.params).all(|(s, t)| identical(s, t))
        && x.results.iter().zip(&y.results).all(|(s, t)| identical(s, t))
}

fn identical_method_types(a: &Type, b: &Type) -> bool {
    match (a.as_signature(), b.as_signature()) {
        (Some(x), Some(y)) => identical_signatures(&x, &y),
        _ => false,
    }
}

/// Whether a value of type `v` may be assigned to a variable of type `t`
pub fn assignable(v: &Type, t: &Type) -> bool {
    if v.is_invalid() || t.is_invalid() || identical(v, t) {
        return true;
    }

    if let Type::Basic(kind) = v
        && kind.is_untyped()
    {
        let target = t.underlying();
        return match (kind, &target) {
            (BasicKind::UntypedNil, _) => t.is_nillable(),
            (_, Type::Interface(iface)) => iface.methods().is_empty(),
            (BasicKind::UntypedBool, _) => t.is_boolean(),
            (BasicKind::UntypedString, _) => t.is_string(),
            (BasicKind::UntypedFloat, _) => t.is_numeric(),
            (BasicKind::UntypedInt | BasicKind::UntypedRune, _) => t.is_numeric(),
            _ => false,
        };
    }

    let (vu, tu) = (v.underlying(), t.underlying());
    let v_named = matches!(v, Type::Named(_) | Type::Basic(_));
    let t_named = matches!(t, Type::Named(_) | Type::Basic(_));
    if identical(&vu, &tu) && (!v_named || !t_named) {
        return true;
    }

    if let Type::Interface(iface) = &tu {
        return implements(v, iface);
    }
    false
}

/// Whether `t` has every method of `iface`
pub fn implements(t: &Type, iface: &InterfaceType) -> bool {
    iface.methods().iter().all(|m| match lookup_method(t, &m.name) {
        Some(found) => identical_method_types(&found.ty(), &m.ty()),
        None => false,
    })
}

/// Look up a method in the method set of `t`
fn lookup_method(t: &Type, name: &str) -> Option<ObjectRef> {
    match t {
        Type::Named(named) => match named.method(name) {
            Some(m) if !has_pointer_receiver(&m) => Some(m),
            Some(_) => None,
            None => match named.declared().underlying() {
                Type::Interface(iface) => iface.method(name),
                _ => None,
            },
        },
        Type::Pointer(elem) => match elem.as_ref() {
            Type::Named(named) => named.method(name),
            _ => None,
        },
        Type::Interface(iface) => iface.method(name),
        _ => None,
    }
}

fn has_pointer_receiver(method: &ObjectRef) -> bool {
    method
        .ty()
        .as_signature()
        .and_then(|sig| sig.recv.clone())
        .is_some_and(|recv| matches!(recv, Type::Pointer(_)))
}

/// Look up a field or method through automatic pointer indirection.
/// Method lookup is lenient about pointer receivers on addressable values.
pub fn lookup_field_or_method(t: &Type, name: &str) -> Option<ObjectRef> {
    let base = match t {
        Type::Pointer(elem) => elem.as_ref().clone(),
        other => other.clone(),
    };

    if let Type::Named(named) = &base
        && let Some(method) = named.method(name)
    {
        return Some(method);
    }

    match base.underlying() {
        Type::Struct(st) => st.fields.iter().find(|f| f.name == name).cloned(),
        Type::Interface(iface) if !matches!(t, Type::Pointer(_)) => iface.method(name),
        Type::Pointer(_) => None,
        _ => None,
    }
}

/// Write a type, naming packages with `qualifier` (empty means unqualified)
pub fn write_type(
    f: &mut dyn fmt::Write,
    ty: &Type,
    qualifier: &mut dyn FnMut(&Rc<Package>) -> String,
) -> fmt::Result {
    match ty {
        Type::Invalid => write!(f, "invalid type"),
        Type::Basic(kind) => write!(f, "{}", kind.name()),
        Type::Named(named) => {
            if let Some(pkg) = &named.pkg {
                let prefix = qualifier(pkg);
                if !prefix.is_empty() {
                    write!(f, "{}.", prefix)?;
                }
            }
            write!(f, "{}", named.name)
        }
        Type::Pointer(elem) => {
            write!(f, "*")?;
            write_type(f, elem, qualifier)
        }
        Type::Slice(elem) => {
            write!(f, "[]")?;
            write_type(f, elem, qualifier)
        }
        Type::Map(key, value) => {
            write!(f, "map[")?;
            write_type(f, key, qualifier)?;
            write!(f, "]")?;
            write_type(f, value, qualifier)
        }
        Type::Struct(st) => {
            write!(f, "struct{{")?;
            for (i, field) in st.fields.iter().enumerate() {
                if i > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "{} ", field.name)?;
                write_type(f, &field.ty(), qualifier)?;
            }
            write!(f, "}}")
        }
        Type::Signature(sig) => {
            write!(f, "func")?;
            write_signature(f, sig, qualifier)
        }
        Type::Interface(iface) => {
            let methods = iface.methods();
            if methods.is_empty() {
                return write!(f, "interface{{}}");
            }
            write!(f, "interface{{")?;
            for (i, m) in methods.iter().enumerate() {
                if i > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "{}", m.name)?;
                if let Some(sig) = m.ty().as_signature() {
                    write_signature(f, &sig, qualifier)?;
                }
            }
            write!(f, "}}")
        }
        Type::Tuple(types) => {
            write!(f, "(")?;
            for (i, t) in types.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_type(f, t, qualifier)?;
            }
            write!(f, ")")
        }
    }
}

fn write_signature(
    f: &mut dyn fmt::Write,
    sig: &Signature,
    qualifier: &mut dyn FnMut(&Rc<Package>) -> String,
) -> fmt::Result {
    write!(f, "(")?;
    for (i, param) in sig.params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match param {
            Type::Slice(elem) if sig.variadic && i + 1 == sig.params.len() => {
                write!(f, "...")?;
                write_type(f, elem, qualifier)?;
            }
            _ => write_type(f, param, qualifier)?,
        }
    }
    write!(f, ")")?;
    match sig.results.as_slice() {
        [] => Ok(()),
        [single] if !matches!(single, Type::Tuple(_)) => {
            write!(f, " ")?;
            write_type(f, single, qualifier)
        }
        results => {
            write!(f, " ")?;
            write_type(f, &Type::Tuple(results.to_vec()), qualifier)
        }
    }
}

/// Session packages print unqualified, others by package name
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self, &mut |pkg: &Rc<Package>| {
            if pkg.is_session() {
                String::new()
            } else {
                pkg.name.clone()
            }
        })
    }
}

impl ObjectKind {
    /// Short description used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            ObjectKind::Var => "variable",
            ObjectKind::Field => "field",
            ObjectKind::Const => "constant",
            ObjectKind::TypeName => "type",
            ObjectKind::Func => "func",
            ObjectKind::PkgName(_) => "package",
            ObjectKind::Builtin(_) => "built-in",
            ObjectKind::Nil => "nil",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::scope::Object;

    fn int() -> Type {
        Type::Basic(BasicKind::Int)
    }

    #[test]
    fn test_identical_aliases() {
        assert!(identical(&Type::Basic(BasicKind::Byte), &Type::Basic(BasicKind::Uint8)));
        assert!(identical(&Type::slice(int()), &Type::slice(int())));
        assert!(!identical(&Type::slice(int()), &Type::pointer(int())));
    }

    #[test]
    fn test_untyped_assignability() {
        let float = Type::Basic(BasicKind::Float64);
        assert!(assignable(&Type::Basic(BasicKind::UntypedInt), &float));
        assert!(!assignable(&Type::Basic(BasicKind::UntypedString), &int()));
        assert!(assignable(&Type::Basic(BasicKind::UntypedNil), &Type::slice(int())));
        assert!(!assignable(&Type::Basic(BasicKind::UntypedNil), &int()));
        assert!(assignable(&Type::Basic(BasicKind::UntypedInt), &Type::empty_interface()));
    }

    #[test]
    fn test_named_assignability() {
        let pkg = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let ints = NamedType::new("ints", Some(pkg));
        ints.set_underlying(Type::slice(int()));
        let named = Type::Named(ints);
        assert!(assignable(&Type::slice(int()), &named));
        assert!(!assignable(&int(), &named));
    }

    #[test]
    fn test_interface_implementation() {
        let pkg = Package::new("fmt", "fmt", false);
        let iface = InterfaceType::new();
        let string_sig = Type::signature(Signature {
            recv: None,
            params: vec![],
            results: vec![Type::Basic(BasicKind::String)],
            variadic: false,
        });
        iface.add_method(Object::new("String", ObjectKind::Func, string_sig.clone(), Some(pkg.clone())));

        let named = NamedType::new("T", Some(pkg.clone()));
        named.set_underlying(int());
        let ty = Type::Named(named.clone());
        assert!(!implements(&ty, &iface));

        named.add_method(Object::new("String", ObjectKind::Func, string_sig, Some(pkg)));
        assert!(implements(&ty, &iface));
        assert!(implements(&Type::pointer(ty), &iface));
    }

    #[test]
    fn test_display() {
        let sig = Type::signature(Signature {
            recv: None,
            params: vec![int(), Type::slice(Type::empty_interface())],
            results: vec![int(), Type::Basic(BasicKind::String)],
            variadic: true,
        });
        assert_eq!(sig.to_string(), "func(int, ...interface{}) (int, string)");
        assert_eq!(Type::map(Type::Basic(BasicKind::String), int()).to_string(), "map[string]int");
    }
}
