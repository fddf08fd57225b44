#[cfg(test)]
mod resolver_tests {
    use rox::error::{LoxError, ResolveErrorKind};
    use rox::resolver::*;
    use rox::{parse, scan, Interpreter};

    fn resolve_source(source: &str) -> Vec<LoxError> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty(), "scan errors: {:?}", errors);

        let (statements, errors) = parse(&tokens);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);

        let mut interpreter = Interpreter::new();
        resolve(&statements, &mut interpreter)
    }

    fn resolve_kinds(source: &str) -> Vec<ResolveErrorKind> {
        resolve_source(source)
            .iter()
            .map(|e| match e {
                LoxError::Resolve { kind, .. } => kind.clone(),
                other => panic!("expected a resolve error, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_clean_program_has_no_errors() {
        let source = r#"
            var a = 1;
            var a = 2;
            fun outer() {
                var x = a;
                { var y = x; }
                fun inner() { return x; }
                return inner;
            }
            class A { init() { return; } m() { return this; } }
            class B < A { m() { return super.m(); } }
        "#;

        assert!(resolve_kinds(source).is_empty());
    }

    #[test]
    fn test_globals_may_reference_themselves() {
        assert!(resolve_kinds("var a = a;").is_empty());
        assert!(resolve_kinds("var a = 1; var a = 2;").is_empty());
    }

    #[test]
    fn test_read_in_own_initializer() {
        let errors = resolve_source("{\n  var a = a;\n}");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 2] Error at 'a': Can't read local variable in its own initializer."
        );
    }

    #[test]
    fn test_already_declared_in_scope() {
        assert_eq!(
            resolve_kinds("{ var a = 1; var a = 2; }"),
            vec![ResolveErrorKind::AlreadyDeclared]
        );
        assert_eq!(
            resolve_kinds("fun f(a, a) {}"),
            vec![ResolveErrorKind::AlreadyDeclared]
        );
        assert!(resolve_kinds("{ var a = 1; { var a = 2; } }").is_empty());
    }

    #[test]
    fn test_return_rules() {
        assert_eq!(
            resolve_kinds("return 1;"),
            vec![ResolveErrorKind::ReturnOutsideFunction]
        );
        assert_eq!(
            resolve_kinds("class A { init() { return 1; } }"),
            vec![ResolveErrorKind::ReturnValueFromInitializer]
        );
        assert!(resolve_kinds("class A { init() { return; } }").is_empty());
        assert!(resolve_kinds("fun f() { return 1; }").is_empty());
    }

    #[test]
    fn test_this_outside_class() {
        assert_eq!(
            resolve_kinds("print this;"),
            vec![ResolveErrorKind::ThisOutsideClass]
        );
        assert_eq!(
            resolve_kinds("fun f() { return this; }"),
            vec![ResolveErrorKind::ThisOutsideClass]
        );
    }

    #[test]
    fn test_super_misuse() {
        assert_eq!(
            resolve_kinds("super.m();"),
            vec![ResolveErrorKind::SuperOutsideClass]
        );
        assert_eq!(
            resolve_kinds("class A { m() { super.m(); } }"),
            vec![ResolveErrorKind::SuperWithoutSuperclass]
        );
    }

    #[test]
    fn test_inherit_from_self() {
        let errors = resolve_source("class A < A {}");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error at 'A': A class can't inherit from itself."
        );
    }

    #[test]
    fn test_all_errors_collected_in_one_pass() {
        assert_eq!(
            resolve_kinds("return 1;\nprint this;\n{ var b = b; }"),
            vec![
                ResolveErrorKind::ReturnOutsideFunction,
                ResolveErrorKind::ThisOutsideClass,
                ResolveErrorKind::ReadInOwnInitializer,
            ]
        );
    }
}
