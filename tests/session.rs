//! Multi-block sessions and identifier inspection

use lgo_convert::{IdentDoc, Session, StdImporter};
use pretty_assertions::assert_eq;

fn run<'a>(session: &mut Session<'a>, src: &str) -> String {
    session
        .convert(src)
        .unwrap_or_else(|e| panic!("{} failed: {}", src, e))
        .src
}

fn offset(src: &str, needle: &str) -> usize {
    src.find(needle).unwrap_or_else(|| panic!("{:?} not in {:?}", needle, src))
}

#[test]
fn test_prior_symbols_use_reference_prefix() {
    let importer = StdImporter::new();
    let mut session = Session::new(&importer);
    let first = run(&mut session, "x := 1\nfunc double(n int) int {\n\treturn n * 2\n}");
    assert!(first.contains("var Def_x int"), "{}", first);
    assert!(first.contains("func Def_double(n int) int"), "{}", first);

    let second = run(&mut session, "y := double(x)");
    assert!(second.contains("import pkg0 \"lgo/exec/pkg0\""), "{}", second);
    assert!(second.contains("Def_y = pkg0.Ref_double(pkg0.Ref_x)"), "{}", second);
    assert!(second.contains("var Def_y int"), "{}", second);
}

#[test]
fn test_exported_symbols_are_never_renamed() {
    let importer = StdImporter::new();
    let mut session = Session::new(&importer);
    let first = run(&mut session, "Answer := 42");
    assert!(first.contains("var Answer int"), "{}", first);

    let second = run(&mut session, "Answer + 1");
    assert!(second.contains("pkg1.LgoPrintln(pkg0.Answer + 1)"), "{}", second);
    assert!(!second.contains("Ref_"), "{}", second);
    assert!(!second.contains("Def_"), "{}", second);
}

#[test]
fn test_redefinition_reads_prior_value() {
    let importer = StdImporter::new();
    let mut session = Session::new(&importer);
    run(&mut session, "x := 1");
    let second = run(&mut session, "x := x * 10");
    assert!(second.contains("Def_x = pkg0.Ref_x * 10"), "{}", second);

    let third = run(&mut session, "x");
    assert!(third.contains("import pkg0 \"lgo/exec/pkg1\""), "{}", third);
    assert!(third.contains("LgoPrintln(pkg0.Ref_x)"), "{}", third);
}

#[test]
fn test_prior_imports_stay_available() {
    let importer = StdImporter::new();
    let mut session = Session::new(&importer);
    run(&mut session, "import \"strings\"\ns := strings.ToUpper(\"a\")");
    let second = run(&mut session, "t := strings.ToLower(s)");
    assert!(second.contains("import strings \"strings\""), "{}", second);
    assert!(second.contains("Def_t = strings.ToLower(pkg0.Ref_s)"), "{}", second);
}

#[test]
fn test_repeated_import_is_declared_once() {
    let importer = StdImporter::new();
    let mut session = Session::new(&importer);
    run(&mut session, "import \"fmt\"\nfmt.Println(1)");
    let second = run(&mut session, "import \"fmt\"\nfmt.Println(2)");
    assert_eq!(second.matches("\"fmt\"").count(), 1, "{}", second);
}

#[test]
fn test_inspect_foreign_symbols() {
    let importer = StdImporter::new();
    let session = Session::new(&importer);

    let src = "import \"strings\"\nstrings.ToUpper(\"a\")";
    assert_eq!(
        session.inspect(src, offset(src, "ToUpper") + 2),
        IdentDoc {
            doc: String::new(),
            query: "strings.ToUpper".to_string(),
        }
    );
    let call = offset(src, "strings.");
    assert_eq!(session.inspect(src, call).query, "strings");

    let src = "import \"strings\"\nvar b strings.Builder\nb.WriteString(\"x\")";
    assert_eq!(
        session.inspect(src, offset(src, "WriteString")).query,
        "strings.Builder.WriteString"
    );

    let src = "import \"fmt\"\nvar s fmt.Stringer\ns.String()";
    assert_eq!(session.inspect(src, offset(src, "String()")).query, "fmt.Stringer.String");
}

#[test]
fn test_inspect_session_symbols() {
    let importer = StdImporter::new();
    let mut session = Session::new(&importer);
    run(&mut session, "x := 1");

    let doc = session.inspect("x + 1", 0);
    assert_eq!(doc.doc, "var x int");
    assert!(doc.query.is_empty());

    let src = "func add(a, b int) int {\n\treturn a + b\n}\nadd(1, 2)";
    let doc = session.inspect(src, offset(src, "add(1"));
    assert!(doc.doc.starts_with("func add("), "{:?}", doc);
    assert!(doc.doc.ends_with(") int"), "{:?}", doc);
}

#[test]
fn test_inspect_misses_are_empty() {
    let importer = StdImporter::new();
    let session = Session::new(&importer);
    assert!(session.inspect("x := len(\"ab\")", 5).is_empty());
    assert!(session.inspect("x := 1 +", 0).is_empty());
    assert!(session.inspect("x := 1", 3).is_empty());
}

#[test]
fn test_prior_package_alias_avoids_nested_locals() {
    let importer = StdImporter::new();
    let mut session = Session::new(&importer);
    run(&mut session, "x := 1");
    let second = run(&mut session, "if true {\n\tpkg0 := 2\n\t_ = pkg0 + x\n}");
    assert!(second.contains("import pkg1 \"lgo/exec/pkg0\""), "{}", second);
    assert!(second.contains("_ = pkg0 + pkg1.Ref_x"), "{}", second);
}
