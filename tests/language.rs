use std::{
    cell::RefCell,
    fs,
    io::{self, Write},
    rc::Rc,
};

use ember::{
    config::Config,
    error::{Error, RuntimeError},
    interpreter::value::{core::Value, plugin::Plugin},
    run_source,
    run_with_output,
};
use pretty_assertions::assert_eq;
use walkdir::WalkDir;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn run_with(config: Config, src: &str) -> (Result<Value, Error>, String) {
    let out = SharedBuffer::default();
    let result = run_with_output(src, config, Box::new(out.clone()));
    (result, out.contents())
}

fn eval(src: &str) -> Value {
    match run_with(Config::default(), src).0 {
        Ok(value) => value,
        Err(e) => panic!("Script failed: {e}"),
    }
}

fn assert_success(src: &str, expected: &str) {
    let value = eval(src);
    assert!(!value.is_error(), "Script produced an error: {value}");
    assert_eq!(value.to_string(), expected, "for script {src:?}");
}

fn assert_failure(src: &str, message: &str) {
    assert_eq!(eval(src), Value::error(message), "for script {src:?}");
}

#[test]
fn scenario_variables() {
    assert_success("var a = 5; a = a + 1; a;", "6");
}

#[test]
fn scenario_functions() {
    assert_success("function add(a,b){return a+b;} add(5, add(5,5));", "15");
}

#[test]
fn scenario_loops() {
    assert_success("for (var i=0; i<=1; i=i+1) { i; }", "1");
    assert_success("var i=0; for(;;){ i=i+1; break; }; i;", "1");
}

#[test]
fn scenario_hash_literal_index() {
    assert_success(r#"{"one": 10-9, "two": 1+1}["two"]"#, "2");
}

#[test]
fn scenario_delete_preserves_order() {
    assert_success("var a=[0,1,2,3]; delete a[1]; a;", "[0, 2, 3]");
    assert_success("var a=[0,1,2,3]; delete a[1]; len(a);", "3");
}

#[test]
fn delete_only_from_variables() {
    assert_failure("delete [1, 2, 3][0];", "delete target must be an identifier, got [1, 2, 3]");
    assert_failure("function f() { [1, 2] } delete f()[0];",
                   "delete target must be an identifier, got f()");
    assert_failure("var x = 1; delete x[0];", "delete not supported: INTEGER");
}

#[test]
fn scenario_imports() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("two.em"), "var unused = 1;\nreturn 2;\n").unwrap();
    fs::write(dir.path().join("plain.em"), "var shared = 40;\n").unwrap();

    let config = || Config::default().with_import_root(dir.path());

    assert_eq!(run_with(config(), "import \"two.em\"").0.unwrap(), Value::Integer(2));
    assert_eq!(run_with(config(), "import \"plain.em\"").0.unwrap(), Value::Null);
    assert_eq!(run_with(config(), "import \"plain.em\"; shared + 2").0.unwrap(),
               Value::Integer(42));
}

#[test]
fn import_failures() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("self.em"), "import \"self.em\";").unwrap();
    let config = || Config::default().with_import_root(dir.path());

    assert_eq!(run_with(config(), "import \"self.em\"").0.unwrap(),
               Value::error("self.em: self.em: cyclic import"));

    let missing = run_with(config(), "import \"missing.em\"").0.unwrap();
    assert!(missing.to_string().starts_with("ERROR: missing.em: "), "{missing}");
}

#[test]
fn truthiness_law() {
    for truthy in ["0", "0.0", "\"\"", "[]", "{}", "true", "function() {}", "len"] {
        assert_success(&format!("if ({truthy}) {{ \"yes\" }} else {{ \"no\" }}"), "yes");
    }
    for falsy in ["null", "false"] {
        assert_success(&format!("if ({falsy}) {{ \"yes\" }} else {{ \"no\" }}"), "no");
    }
}

#[test]
fn numeric_coercion() {
    assert_eq!(eval("4 / 2"), Value::Integer(2));
    assert_eq!(eval("5 / 2"), Value::Float(2.5));
    assert_eq!(eval("1 + 2.0"), Value::Float(3.0));
    assert_eq!(eval("2 * 1.5"), Value::Float(3.0));
    assert_eq!(eval("2 ** 3"), Value::Integer(8));
    assert_eq!(eval("2 ** 3 ** 2"), Value::Integer(512));
    assert_failure("1 / 0", "division by zero");
    assert_failure("9223372036854775807 + 1", "integer overflow: 9223372036854775807 + 1");
    assert_failure("var m = -9223372036854775807 - 1; m / -1",
                   "integer overflow: -9223372036854775808 / -1");
    assert_failure("var m = -9223372036854775807 - 1; m % -1",
                   "integer overflow: -9223372036854775808 % -1");
    assert_eq!(eval("1 ** 9999999999"), Value::Integer(1));
}

#[test]
fn closure_capture() {
    let counter = "function counter() {
                       var n = 0;
                       function() { n = n + 1; n }
                   }
                   var c = counter();
                   c(); c();
                   c()";
    assert_success(counter, "3");

    let independent = "function counter() { var n = 0; function() { n++; n } }
                       var a = counter();
                       var b = counter();
                       a(); a();
                       b()";
    assert_success(independent, "1");
}

#[test]
fn closures_from_one_call_share_captures() {
    let src = "function pair() {
                   var n = 0;
                   var inc = function() { n += 1; n };
                   var get = function() { n };
                   [inc, get]
               }
               var p = pair();
               var inc = p[0];
               var get = p[1];
               inc(); inc();
               get()";
    assert_success(src, "2");
}

#[test]
fn array_aliasing() {
    assert_success("var a = [1, 2]; var b = a; b[0] = 9; a[0];", "9");
    assert_success("var a=[[0,1]]; var b=first(a); b[0]=b[0]+1; a[0][0];", "0");
    assert_success("var a = [[0]]; var b = last(a); b[0] = 5; a", "[[0]]");
    assert_success("var a = [0, [1]]; var r = rest(a); r[0][0] = 5; a", "[0, [1]]");
    assert_success("function set(xs) { xs[0] = 1; } var a = [0]; set(a); a", "[1]");
    assert_success("var a = [1]; a.push(2); a", "[1, 2]");
    assert_success("var a = [1]; var b = push(a, 2); [a, b]", "[[1], [1, 2]]");
}

#[test]
fn hash_behaviour() {
    assert_success(r#"var h = {"b": 1, "a": 2}; h["c"] = 3; h.keys()"#, r#"["b", "a", "c"]"#);
    assert_success("var h = {1: \"int\", 1.0: \"float\"}; len(h)", "2");
    assert_success("var h = {}; h[0.1 + 0.2] = 1; h[0.3]", "1");
    assert_failure(r#"{"a": 1}[[]]"#, "unusable as hash key: ARRAY");
}

#[test]
fn methods() {
    assert_success(r#""Ember".upper()"#, "EMBER");
    assert_success(r#""a,b,c".split(",")"#, r#"["a", "b", "c"]"#);
    assert_success("(-3).abs()", "3");
    assert_success("2.5.floor()", "2.0");
    assert_success("[1, 2, 3].join(\"-\")", "1-2-3");
    assert_failure("1.upper()", "undefined method upper for INTEGER");
}

#[test]
fn control_flow() {
    assert_success("var x = 3; x > 2 ? \"big\" : \"small\"", "big");
    assert_success("null ?: 7", "7");
    assert_success("var i = 5; i++; i--; i--; i", "4");
    assert_success("var t = 0; for (var i = 0; i < 10; i++) { if (i == 3) { break; } t += i; } t",
                   "3");
    assert_success("enum Dir { case Up: \"u\"; case Down: \"d\" } Dir::Down", "d");
}

#[test]
fn errors_stop_evaluation() {
    let (result, printed) = run_with(Config::default(), "puts(1); missing; puts(2);");
    assert_eq!(result.unwrap(), Value::error("identifier not found: missing"));
    assert_eq!(printed, "1\n");

    assert_failure("\"a\" - 1", "type mismatch: STRING - INTEGER");
    assert_failure("true + true", "unknown operator: BOOLEAN + BOOLEAN");
    assert_failure("-true", "unknown operator: -BOOLEAN");
}

#[test]
fn parse_errors_prevent_evaluation() {
    let (result, printed) = run_with(Config::default(), "puts(1); var = 2; var y 3;");
    let Err(Error::Parse(errors)) = result else {
        panic!("expected parse errors");
    };
    assert_eq!(errors.0.len(), 2);
    assert_eq!(printed, "");
}

#[test]
fn output_and_exit() {
    let (result, printed) = run_with(Config::default(), "puts(\"hello\", 1.5); exit(4);");
    assert!(matches!(result, Err(Error::Runtime(RuntimeError::Exit { code: 4 }))));
    assert_eq!(printed, "hello\n1.5\n");
}

#[test]
fn runaway_recursion_is_reported() {
    let config = Config::default().with_max_call_depth(200);
    let (result, _) = run_with(config, "function loop(n) { loop(n + 1) } loop(0)");
    assert!(matches!(result, Err(Error::Runtime(RuntimeError::StackOverflow { depth: 200 }))));
}

#[test]
fn deep_recursion_within_the_limit() {
    let src = "function sum(n) { if (n == 0) { return 0; } n + sum(n - 1) } sum(5000)";
    assert_success(src, "12502500");
}

#[test]
fn script_arguments_and_plugins() {
    fn shout(args: &[Value]) -> Value {
        match args {
            [Value::Str(s)] => Value::from(s.to_uppercase()),
            _ => Value::error("shout expects one string"),
        }
    }

    let config = Config::default().with_args(vec!["x".into()])
                                  .with_plugin(Plugin::new("text").with_function("shout", shout));
    let (result, _) = run_with(config, "var t = plugin(\"text\"); t.shout(args()[0])");
    assert_eq!(result.unwrap(), Value::from("X"));
}

#[test]
fn deeply_nested_literals() {
    let depth = 2_000;
    let src = format!("var a = {}1{}; len(a)", "[".repeat(depth), "]".repeat(depth));
    assert_success(&src, "1");

    let src = format!("{}7{}", "(".repeat(20_000), ")".repeat(20_000));
    assert_success(&src, "7");
}

#[test]
fn printing_an_array_that_contains_itself() {
    let (result, printed) = run_with(Config::default(), "var a = [0]; a[0] = a; puts(a);");
    assert_eq!(result.unwrap(), Value::Null);
    assert_eq!(printed, "[[...]]\n");
}

#[test]
fn run_source_reports_values() {
    assert_eq!(run_source("1 + 1", Config::default()).unwrap(), Value::Integer(2));
}

#[test]
fn scripts_produce_expected_output() {
    let mut count = 0;

    for entry in
        WalkDir::new("tests/scripts").into_iter()
                                     .filter_map(Result::ok)
                                     .filter(|e| e.path().extension().is_some_and(|ext| ext == "em"))
    {
        let path = entry.path();
        let source =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));
        let expected_path = path.with_extension("out");
        let expected = fs::read_to_string(&expected_path).unwrap_or_else(|e| {
                                                             panic!("Failed to read {expected_path:?}: {e}")
                                                         });

        let root = path.parent().unwrap().to_path_buf();
        let (result, printed) = run_with(Config::default().with_import_root(root), &source);
        match result {
            Ok(value) if !value.is_error() => {},
            Ok(value) => panic!("Script {path:?} failed: {value}"),
            Err(e) => panic!("Script {path:?} failed: {e}"),
        }
        assert_eq!(printed, expected, "output of {path:?}");
        count += 1;
    }

    assert!(count > 0, "No scripts found in tests/scripts");
}
