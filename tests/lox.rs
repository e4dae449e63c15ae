mod common;

#[cfg(test)]
mod lox_tests {
    use super::common::{run, session};
    use rox::lox::{Status, EXIT_RUNTIME_ERROR, EXIT_STATIC_ERROR};
    use rox::scanner::Layout;

    #[test]
    fn test_exit_native() {
        let result = run("print 1; exit(3); print 2;");

        assert_eq!(result.status, Status::Exit(3));
        assert_eq!(result.status.exit_code(), 3);
        assert_eq!(result.output, "1\n");
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_exit_requires_number() {
        let result = run("exit(\"a\");");

        assert_eq!(result.status, Status::RuntimeError);
        assert_eq!(result.errors, vec!["Exit code must be a number.\n[line 1]"]);
    }

    #[test]
    fn test_parse_error_prevents_execution() {
        let result = run("print 1;\nprint ;");

        assert_eq!(result.status, Status::StaticError);
        assert_eq!(result.status.exit_code(), EXIT_STATIC_ERROR);
        assert_eq!(result.output, "");
        assert_eq!(
            result.errors,
            vec!["[line 2] Error at ';': Expected expression"]
        );
    }

    #[test]
    fn test_scan_error_prevents_execution() {
        let result = run("print 1; @");

        assert_eq!(result.status, Status::StaticError);
        assert_eq!(result.output, "");
        assert_eq!(result.errors, vec!["[line 1] Error: Unexpected character: @"]);
    }

    #[test]
    fn test_resolve_error_prevents_execution() {
        let result = run("print 1; return 2;");

        assert_eq!(result.status, Status::StaticError);
        assert_eq!(result.output, "");
    }

    #[test]
    fn test_runtime_error_exit_code() {
        let result = run("nil + 1;");

        assert_eq!(result.status, Status::RuntimeError);
        assert_eq!(result.status.exit_code(), EXIT_RUNTIME_ERROR);
    }

    #[test]
    fn test_repl_state_persists_between_lines() {
        let (mut lox, output) = session(Layout::Braces);

        assert_eq!(lox.run("var a = 1;"), Status::Completed("nil".to_string()));
        assert_eq!(
            lox.run("fun f() { var x = a; fun g() { return x + 1; } return g; }"),
            Status::Completed("nil".to_string())
        );
        assert_eq!(
            lox.run("{ var y = 40; print y + f()(); }"),
            Status::Completed("nil".to_string())
        );
        assert_eq!(lox.run("f()();"), Status::Completed("2".to_string()));
        assert_eq!(output.contents(), "42\n");
    }

    #[test]
    fn test_reset_clears_errors() {
        let (mut lox, _) = session(Layout::Braces);

        assert_eq!(lox.run("print ;"), Status::StaticError);
        assert!(lox.diagnostics().had_error());

        lox.reset();

        assert!(!lox.diagnostics().had_error());
        assert_eq!(lox.run("1 + 1;"), Status::Completed("2".to_string()));
    }

    #[test]
    fn test_environment_restored_after_runtime_error() {
        let (mut lox, _) = session(Layout::Braces);

        assert_eq!(lox.run("{ var inner = 1; nope; }"), Status::RuntimeError);
        lox.reset();

        assert_eq!(lox.run("var outer = 2;"), Status::Completed("nil".to_string()));
        assert_eq!(lox.run("outer;"), Status::Completed("2".to_string()));
        assert_eq!(lox.run("inner;"), Status::RuntimeError);
        assert_eq!(
            lox.diagnostics().errors()[0].to_string(),
            "Undefined variable 'inner'.\n[line 1]"
        );
    }

    #[test]
    fn test_indentation_layout_program() {
        let source = "\
fun add(a, b):
    return a + b

class Greeter:
    init(name):
        this.name = name

    greet():
        return \"hi \" + this.name

if (add(1, 2) > 5):
    print \"big\"
else:
    print \"small\"

print add(1, 2)
print Greeter(\"bob\").greet()
";

        let (mut lox, output) = session(Layout::Indentation);
        let status = lox.run(source);

        assert_eq!(
            status,
            Status::Completed("nil".to_string()),
            "{:?}",
            lox.diagnostics().errors()
        );
        assert_eq!(output.contents(), "small\n3\nhi bob\n");
    }

    #[test]
    fn test_tokenize_reports_errors_and_keeps_going() {
        let (mut lox, _) = session(Layout::Braces);
        let tokens = lox.tokenize("a $ b");

        assert_eq!(tokens.len(), 3);
        assert!(lox.diagnostics().had_error());
    }
}
