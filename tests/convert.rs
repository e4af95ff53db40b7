//! Conversion of single blocks

use lgo_convert::{Config, Converted, Converter, LgoResult, StdImporter};
use pretty_assertions::assert_eq;

fn convert_with(src: &str, config: &Config) -> LgoResult<Converted> {
    let importer = StdImporter::new();
    Converter::new(&importer).convert(src, config)
}

fn convert(src: &str) -> String {
    convert_with(src, &Config::default())
        .unwrap_or_else(|e| panic!("{} failed: {}", src, e))
        .src
}

#[test]
fn test_short_var_decl_is_hoisted() {
    let expected = "package lgo_exec

func lgo_init() {
\tDef_x = 1
}

var Def_x int
";
    assert_eq!(convert("x := 1"), expected);
}

#[test]
fn test_var_decl_keeps_declared_type() {
    let src = convert("var s, t string = \"a\", \"b\"\nvar n float64");
    assert!(src.contains("Def_s, Def_t = \"a\", \"b\""), "{}", src);
    assert!(src.contains("Def_s string"), "{}", src);
    assert!(src.contains("Def_t string"), "{}", src);
    assert!(src.contains("Def_n float64"), "{}", src);
}

#[test]
fn test_trailing_expression_is_printed() {
    let src = convert("x := 1\nx + 1");
    assert!(src.contains("import pkg0 \"lgo/core\""), "{}", src);
    assert!(src.contains("pkg0.LgoPrintln(Def_x + 1)"), "{}", src);
    assert!(!src.contains("panic"), "{}", src);
}

#[test]
fn test_trailing_call_arity() {
    // two results
    let src = convert("import \"fmt\"\nfmt.Println(\"hi\")");
    assert!(src.contains("\tfmt.Println(\"hi\")\n"), "{}", src);
    assert!(!src.contains("LgoPrintln"), "{}", src);

    // one result
    let src = convert("import \"strings\"\nstrings.ToUpper(\"hi\")");
    assert!(src.contains("pkg0.LgoPrintln(strings.ToUpper(\"hi\"))"), "{}", src);

    // none
    let src = convert("func f() {}\nf()");
    assert!(src.contains("\tDef_f()\n"), "{}", src);
    assert!(!src.contains("LgoPrintln"), "{}", src);
}

#[test]
fn test_unused_import_is_pruned() {
    let src = convert("import \"strings\"\nx := 1");
    assert!(!src.contains("strings"), "{}", src);
    assert!(!src.contains("import"), "{}", src);
}

#[test]
fn test_nothing_left_is_empty() {
    assert_eq!(convert("import \"fmt\""), "");
}

#[test]
fn test_declarations_move_out_of_init() {
    let src = convert(
        "type point struct {\n\tx, y int\n}\nfunc (p point) Sum() int {\n\treturn p.x + p.y\n}\nfunc Hello() string {\n\treturn \"hi\"\n}",
    );
    assert!(!src.contains("lgo_init"), "{}", src);
    assert!(src.contains("type Def_point struct"), "{}", src);
    assert!(src.contains("Def_x, Def_y int"), "{}", src);
    assert!(src.contains("func (p Def_point) Sum() int"), "{}", src);
    assert!(src.contains("return p.Def_x + p.Def_y"), "{}", src);
    assert!(src.contains("func Hello() string"), "{}", src);
}

#[test]
fn test_consts_stay_constant() {
    let src = convert("const limit = 10\nn := limit * 2");
    assert!(src.contains("const Def_limit = 10"), "{}", src);
    assert!(src.contains("Def_n = Def_limit * 2"), "{}", src);
    assert!(src.contains("var Def_n int"), "{}", src);
}

#[test]
fn test_goroutines_are_guarded() {
    let src = convert("func work(n int) {}\ngo work(1)");
    assert!(src.contains("ectx := pkg0.InitGoroutine()"), "{}", src);
    assert!(src.contains("defer pkg0.FinalizeGoroutine(ectx)"), "{}", src);
    assert!(src.contains("Def_work(1)"), "{}", src);
    let init = src.find("InitGoroutine").unwrap();
    let launch = src.find("go func()").unwrap();
    assert!(init < launch, "{}", src);
}

#[test]
fn test_execution_context() {
    let src = convert("c := runctx");
    assert!(src.contains("Def_c = pkg0.GetExecContext()"), "{}", src);
    assert!(src.contains("import pkg1 \"context\""), "{}", src);
    assert!(src.contains("var Def_c pkg1.Context"), "{}", src);
}

#[test]
fn test_execution_context_in_declared_function() {
    let src = convert("import \"context\"\nfunc current() context.Context {\n\treturn runctx\n}");
    assert!(src.contains("return pkg0.GetExecContext()"), "{}", src);
    assert!(!src.contains("runctx"), "{}", src);
}

#[test]
fn test_register_vars() {
    let config = Config {
        register_vars: true,
        ..Config::default()
    };
    let src = convert_with("x := 1", &config).unwrap().src;
    let register = src.find("pkg0.LgoRegisterVar(\"x\", &Def_x)").expect(&src);
    let assign = src.find("Def_x = 1").expect(&src);
    assert!(register < assign, "{}", src);
}

#[test]
fn test_auto_exit() {
    let config = Config {
        auto_exit_code: true,
        ..Config::default()
    };
    let src = convert_with("func f() {}\nfor i := 0; i < 3; i++ {\n\tf()\n}", &config)
        .unwrap()
        .src;
    let expected = "func Def_f() {\n\tpkg0.ExitIfCtxDone()\n}";
    assert!(src.contains(expected), "{}", src);
    assert!(src.contains("i++ {\n\t\tpkg0.ExitIfCtxDone()\n\t\tDef_f()"), "{}", src);
}

#[test]
fn test_doc_comments_survive() {
    let src = convert("// the answer\nx := 42");
    assert!(src.contains("\t// the answer\n\tDef_x = 42"), "{}", src);
}

#[test]
fn test_custom_prefixes() {
    let config = Config {
        def_prefix: "D0_".to_string(),
        ..Config::default()
    };
    let src = convert_with("count := 1", &config).unwrap().src;
    assert!(src.contains("var D0_count int"), "{}", src);
}

#[test]
fn test_errors() {
    let err = convert_with("x := y", &Config::default()).unwrap_err();
    assert_eq!(err.to_string(), "undefined: y");

    let err = convert_with("a := u1\nb := u2\nc := u3", &Config::default()).unwrap_err();
    assert!(err.to_string().starts_with("undefined: u1"), "{}", err);
    assert!(err.to_string().ends_with("(and 2 more errors)"), "{}", err);

    assert!(convert_with("x := (", &Config::default()).is_err());
}

#[test]
fn test_minted_alias_avoids_block_names() {
    let src = convert("pkg0 := 1\npkg0 + 1");
    assert!(src.contains("import pkg1 \"lgo/core\""), "{}", src);
    assert!(src.contains("pkg1.LgoPrintln(Def_pkg0 + 1)"), "{}", src);
}

#[test]
fn test_minted_alias_avoids_nested_locals() {
    let src = convert("f := func() {\n\tpkg0 := 1\n\t_ = pkg0\n\t_ = runctx\n}");
    assert!(src.contains("_ = pkg1.GetExecContext()"), "{}", src);
    assert!(src.contains("import pkg1 \"lgo/core\""), "{}", src);

    let src = convert("func g() {\n\tpkg0 := 1\n\t_ = pkg0\n\t_ = runctx\n}");
    assert!(src.contains("_ = pkg1.GetExecContext()"), "{}", src);
    assert!(!src.contains("runctx"), "{}", src);
}
