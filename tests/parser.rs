#[cfg(test)]
mod parser_tests {
    use rox::ast::{Expr, ExprIds, Stmt};
    use rox::ast_printer::AstPrinter;
    use rox::error::Diagnostics;
    use rox::parser::Parser;
    use rox::scanner::Scanner;

    fn parse(source: &str) -> (Vec<Stmt>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
        let mut ids = ExprIds::new();
        let statements = Parser::new(&tokens, &mut ids).parse(&mut diagnostics);

        (statements, diagnostics)
    }

    fn print(source: &str) -> String {
        let (statements, diagnostics) = parse(source);

        assert!(
            !diagnostics.had_error(),
            "unexpected errors: {:?}",
            diagnostics.errors()
        );

        AstPrinter::print_program(&statements)
    }

    fn error_lines(diagnostics: &Diagnostics) -> Vec<String> {
        diagnostics.errors().iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(print("1 + 2 * 3;"), "(; (+ 1 (* 2 3)))");
        assert_eq!(print("(1 + 2) * 3;"), "(; (* (group (+ 1 2)) 3))");
        assert_eq!(print("!true == -1 < 2;"), "(; (== (! true) (< (- 1) 2)))");
        assert_eq!(print("1 - 2 - 3;"), "(; (- (- 1 2) 3))");
    }

    #[test]
    fn test_logical_and_assignment() {
        assert_eq!(print("a or b and c;"), "(; (or a (and b c)))");
        assert_eq!(print("a = b = 1;"), "(; (= a (= b 1)))");
    }

    #[test]
    fn test_call_and_property_chains() {
        assert_eq!(print("a.b(1).c = 2;"), "(; (= (. (call (. a b) 1) c) 2))");
        assert_eq!(print("f()(\"x\", 2.5);"), "(; (call (call f) x 2.5))");
    }

    #[test]
    fn test_declarations() {
        assert_eq!(print("var x = 1; var y; print x;"), "(var x 1)\n(var y)\n(print x)");
        assert_eq!(
            print("fun add(a, b) { return a + b; }"),
            "(fun add (a b) (return (+ a b)))"
        );
    }

    #[test]
    fn test_control_flow() {
        assert_eq!(
            print("if (a) print 1; else { print 2; }"),
            "(if a (print 1) (block (print 2)))"
        );
        assert_eq!(print("while (x) x = nil;"), "(while x (; (= x nil)))");
    }

    #[test]
    fn test_for_desugars_to_while() {
        assert_eq!(
            print("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(block (var i 0) (while (< i 3) (block (print i) (; (= i (+ i 1))))))"
        );
        assert_eq!(print("for (;;) print 1;"), "(while true (print 1))");
    }

    #[test]
    fn test_class_with_superclass() {
        let source = "class B < A { init(x) { this.x = x; } m() { return super.m(); } }";

        assert_eq!(
            print(source),
            "(class B < A (method init (x) (; (= (. this x) x))) \
             (method m () (return (call (super m)))))"
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        let (statements, diagnostics) = parse("1 = 2;");

        assert_eq!(statements.len(), 1);
        assert_eq!(
            error_lines(&diagnostics),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn test_missing_expression_at_end() {
        let (_, diagnostics) = parse("print");

        assert_eq!(
            error_lines(&diagnostics),
            vec!["[line 1] Error at end: Expected expression"]
        );
    }

    #[test]
    fn test_synchronize_reports_every_statement() {
        let (statements, diagnostics) = parse("var = 1;\nprint 2;\nvar x 3;\nprint 4;");

        assert_eq!(AstPrinter::print_program(&statements), "(print 2)\n(print 4)");
        assert_eq!(
            error_lines(&diagnostics),
            vec![
                "[line 1] Error at '=': Expected variable name",
                "[line 3] Error at '3': Expected ';' after variable declaration",
            ]
        );
    }

    #[test]
    fn test_argument_cap_reported_once() {
        let arguments: Vec<&str> = vec!["0"; 300];
        let source = format!("f({});", arguments.join(", "));

        let (statements, diagnostics) = parse(&source);

        assert_eq!(statements.len(), 1);
        assert_eq!(diagnostics.errors().len(), 1);
        assert_eq!(
            diagnostics.errors()[0].message(),
            "Can't have more than 255 arguments."
        );
    }

    #[test]
    fn test_parameter_cap_reported_once() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));

        let (_, diagnostics) = parse(&source);

        assert_eq!(diagnostics.errors().len(), 1);
        assert_eq!(
            diagnostics.errors()[0].message(),
            "Can't have more than 255 parameters."
        );
    }

    #[test]
    fn test_expression_ids_are_unique() {
        let (statements, _) = parse("a; a;");

        let ids: Vec<_> = statements
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Expression(Expr::Variable { id, .. }) => Some(*id),
                _ => None,
            })
            .collect();

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }
}
