use std::fs;

use tracing::debug;

use crate::{
    ast::Expr,
    interpreter::{
        evaluator::{
            core::{EvalResult, Evaluator},
            utils::try_value,
        },
        parser::core::parse_program,
        value::core::Value,
    },
};

impl Evaluator {
    /// Evaluates `import path`.
    ///
    /// The file is resolved against the configured import root, parsed, and
    /// run in the importing scope, so its top-level bindings become visible
    /// to the importer. A file that is already being imported further up the
    /// chain is rejected.
    ///
    /// # Returns
    /// The value the file returns with a top-level `return`, otherwise
    /// `null`. Failures are error values prefixed with the file name.
    pub(crate) fn eval_import(&mut self, path: &Expr) -> EvalResult<Value> {
        let file = match try_value!(self, path) {
            Value::Str(file) => file,
            other => {
                return Ok(Value::error(format!("import path must be STRING, got {}",
                                               other.type_name())));
            },
        };
        let resolved = self.config.import_root.join(&*file);

        if self.imports.contains(&resolved) {
            return Ok(Value::error(format!("{file}: cyclic import")));
        }

        let source = match fs::read_to_string(&resolved) {
            Ok(source) => source,
            Err(e) => return Ok(Value::error(format!("{file}: {e}"))),
        };

        let (program, errors) = parse_program(&source);
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Ok(Value::error(format!("{file}: {}", messages.join("; "))));
        }

        debug!(path = %resolved.display(), "importing");
        self.imports.push(resolved);
        let result = self.eval_statements(&program.statements);
        self.imports.pop();

        Ok(match result? {
               Value::Error(message) => Value::error(format!("{file}: {message}")),
               Value::ReturnValue(value) => *value,
               _ => Value::Null,
           })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::Config;

    fn eval_in(root: &Path, source: &str) -> Value {
        let (program, errors) = parse_program(source);
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        let config = Config::default().with_import_root(root);
        let mut evaluator = Evaluator::with_output(config, Box::new(std::io::sink()));
        evaluator.eval_program(&program).unwrap()
    }

    #[test]
    fn imported_definitions_are_visible() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lib.em"), "function double(x) { x * 2 }").unwrap();

        assert_eq!(eval_in(dir.path(), "import \"lib.em\"; double(21)"), Value::Integer(42));
    }

    #[test]
    fn import_yields_the_returned_value() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("two.em"), "return 2;").unwrap();
        fs::write(dir.path().join("none.em"), "var x = 1;").unwrap();

        assert_eq!(eval_in(dir.path(), "import \"two.em\""), Value::Integer(2));
        assert_eq!(eval_in(dir.path(), "import \"none.em\""), Value::Null);
    }

    #[test]
    fn failures_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.em"), "var = 1;").unwrap();
        fs::write(dir.path().join("boom.em"), "missing").unwrap();

        let result = eval_in(dir.path(), "import \"bad.em\"").to_string();
        assert!(result.starts_with("ERROR: bad.em: "), "{result}");

        assert_eq!(eval_in(dir.path(), "import \"boom.em\""),
                   Value::error("boom.em: identifier not found: missing"));

        let result = eval_in(dir.path(), "import \"absent.em\"").to_string();
        assert!(result.starts_with("ERROR: absent.em: "), "{result}");

        assert_eq!(eval_in(dir.path(), "import 5"),
                   Value::error("import path must be STRING, got INTEGER"));
    }

    #[test]
    fn cycles_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.em"), "import \"b.em\"").unwrap();
        fs::write(dir.path().join("b.em"), "return import \"a.em\";").unwrap();

        assert_eq!(eval_in(dir.path(), "import \"a.em\""),
                   Value::error("a.em: b.em: a.em: cyclic import"));
    }
}
