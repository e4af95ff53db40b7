//! The universe scope: predeclared types, constants and functions

use std::rc::Rc;

use super::scope::{Builtin, Object, ObjectKind, ObjectRef, Scope};
use super::types::{BasicKind, InterfaceType, NamedType, Signature, Type};

thread_local! {
    static UNIVERSE: Rc<Scope> = Rc::new(build());
}

/// The shared universe scope of the current thread
pub fn universe() -> Rc<Scope> {
    UNIVERSE.with(Rc::clone)
}

/// Look up a predeclared name
pub fn lookup(name: &str) -> Option<ObjectRef> {
    UNIVERSE.with(|u| u.lookup(name).cloned())
}

/// The predeclared `error` type
pub fn error_type() -> Type {
    lookup("error").map(|obj| obj.ty()).unwrap_or_default()
}

fn build() -> Scope {
    let mut scope = Scope::new();

    let basics = [
        BasicKind::Bool,
        BasicKind::Int,
        BasicKind::Int8,
        BasicKind::Int16,
        BasicKind::Int32,
        BasicKind::Int64,
        BasicKind::Uint,
        BasicKind::Uint8,
        BasicKind::Uint16,
        BasicKind::Uint32,
        BasicKind::Uint64,
        BasicKind::Uintptr,
        BasicKind::Float32,
        BasicKind::Float64,
        BasicKind::String,
        BasicKind::Byte,
        BasicKind::Rune,
    ];
    for kind in basics {
        scope.insert(Object::new(kind.name(), ObjectKind::TypeName, Type::Basic(kind), None));
    }
    scope.insert(Object::new("any", ObjectKind::TypeName, Type::empty_interface(), None));

    // type error interface { Error() string }
    let error = NamedType::new("error", None);
    let iface = InterfaceType::new();
    let sig = Signature {
        recv: Some(Type::Interface(iface.clone())),
        params: Vec::new(),
        results: vec![Type::Basic(BasicKind::String)],
        variadic: false,
    };
    iface.add_method(Object::new("Error", ObjectKind::Func, Type::signature(sig), None));
    error.set_underlying(Type::Interface(iface));
    scope.insert(Object::new("error", ObjectKind::TypeName, Type::Named(error), None));

    for name in ["true", "false"] {
        scope.insert(Object::new(name, ObjectKind::Const, Type::Basic(BasicKind::UntypedBool), None));
    }
    scope.insert(Object::new("nil", ObjectKind::Nil, Type::Basic(BasicKind::UntypedNil), None));

    for builtin in Builtin::ALL {
        scope.insert(Object::new(builtin.name(), ObjectKind::Builtin(builtin), Type::Invalid, None));
    }

    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predeclared_names() {
        assert!(matches!(lookup("int").unwrap().kind, ObjectKind::TypeName));
        assert!(matches!(lookup("len").unwrap().kind, ObjectKind::Builtin(Builtin::Len)));
        assert!(lookup("runctx").is_none());
        assert_eq!(error_type().to_string(), "error");
    }
}
