#[cfg(test)]
mod resolver_tests {
    use std::collections::HashMap;

    use rox::ast::{ExprId, ExprIds, Stmt};
    use rox::error::Diagnostics;
    use rox::interpreter::Interpreter;
    use rox::parser::Parser;
    use rox::resolver::Resolver;
    use rox::scanner::Scanner;

    fn parse(source: &str) -> Vec<Stmt> {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
        let mut ids = ExprIds::new();
        let statements = Parser::new(&tokens, &mut ids).parse(&mut diagnostics);

        assert!(!diagnostics.had_error(), "{:?}", diagnostics.errors());
        statements
    }

    fn resolve(source: &str) -> (Interpreter, Vec<String>) {
        let statements = parse(source);
        let mut interpreter = Interpreter::with_output(std::io::sink());
        let mut diagnostics = Diagnostics::new();

        Resolver::new(&mut interpreter).resolve(&statements, &mut diagnostics);

        let errors = diagnostics.errors().iter().map(|e| e.to_string()).collect();
        (interpreter, errors)
    }

    fn errors(source: &str) -> Vec<String> {
        resolve(source).1
    }

    #[test]
    fn test_read_in_own_initializer() {
        assert_eq!(
            errors("{ var a = 1; { var a = a; } }"),
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_duplicate_local() {
        assert_eq!(
            errors("{ var a = 1; var a = 2; }"),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );

        // globals may be redeclared
        assert!(errors("var a = 1; var a = 2;").is_empty());
    }

    #[test]
    fn test_return_placement() {
        assert_eq!(
            errors("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
        assert_eq!(
            errors("class A { init() { return 1; } }"),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );
        assert!(errors("class A { init() { return; } }").is_empty());
        assert!(errors("fun f() { return 1; }").is_empty());
    }

    #[test]
    fn test_this_outside_class() {
        assert_eq!(
            errors("print this;"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
        assert_eq!(
            errors("fun f() { return this; }"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
    }

    #[test]
    fn test_super_misuse() {
        assert_eq!(
            errors("super.m();"),
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );
        assert_eq!(
            errors("class A { m() { super.m(); } }"),
            vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );
        assert!(errors("class A {} class B < A { m() { super.m(); } }").is_empty());
    }

    #[test]
    fn test_inherit_from_itself() {
        assert_eq!(
            errors("class A < A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_errors_are_batched() {
        assert_eq!(
            errors("return 1;\nprint this;\n{ var b = b; }"),
            vec![
                "[line 1] Error at 'return': Can't return from top-level code.",
                "[line 2] Error at 'this': Can't use 'this' outside of a class.",
                "[line 3] Error at 'b': Can't read local variable in its own initializer.",
            ]
        );
    }

    #[test]
    fn test_locals_get_distances_globals_do_not() {
        let (interpreter, errors) = resolve("var g = 1; print g;");
        assert!(errors.is_empty());
        assert!(interpreter.locals().is_empty());

        let (interpreter, _) = resolve("{ var a = 1; { print a; } }");
        let depths: Vec<usize> = interpreter.locals().values().copied().collect();
        assert_eq!(depths, vec![1]);
    }

    #[test]
    fn test_this_and_super_depths() {
        let source = "class A {} class B < A { m() { this; super.m; } }";
        let (interpreter, errors) = resolve(source);
        assert!(errors.is_empty());

        let mut depths: Vec<usize> = interpreter.locals().values().copied().collect();
        depths.sort();

        // `this` is one scope out of the body, `super` two
        assert_eq!(depths, vec![1, 2]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let source = "fun f() { var a = 10; fun g() { fun h() { return a; } \
                      var x = h(); var a = 123; var y = h(); return x + y; } return g; }";
        let statements = parse(source);

        let mut interpreter = Interpreter::with_output(std::io::sink());
        let mut diagnostics = Diagnostics::new();

        Resolver::new(&mut interpreter).resolve(&statements, &mut diagnostics);
        let first: HashMap<ExprId, usize> = interpreter.locals().clone();

        Resolver::new(&mut interpreter).resolve(&statements, &mut diagnostics);
        let second: HashMap<ExprId, usize> = interpreter.locals().clone();

        let mut fresh = Interpreter::with_output(std::io::sink());
        Resolver::new(&mut fresh).resolve(&statements, &mut diagnostics);

        assert!(!diagnostics.had_error());
        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert_eq!(&first, fresh.locals());
    }
}
