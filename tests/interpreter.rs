#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rox::error::{LoxError, RuntimeErrorKind};
    use rox::{run, Interpreter};

    /// An interpreter whose `print` output is captured in memory.
    struct Session {
        out: Rc<RefCell<Vec<u8>>>,
        interpreter: Interpreter,
    }

    impl Session {
        fn new() -> Self {
            let out = Rc::new(RefCell::new(Vec::<u8>::new()));
            let interpreter = Interpreter::with_output(out.clone());

            Session { out, interpreter }
        }

        fn run(&mut self, source: &str) -> Result<(), Vec<LoxError>> {
            run(source, &mut self.interpreter)
        }

        /// Everything printed so far, emptying the buffer.
        fn take_output(&mut self) -> String {
            let bytes = std::mem::take(&mut *self.out.borrow_mut());
            String::from_utf8(bytes).unwrap()
        }
    }

    fn output_of(source: &str) -> String {
        let mut session = Session::new();
        if let Err(errors) = session.run(source) {
            panic!("unexpected errors: {:?}", errors);
        }
        session.take_output()
    }

    fn runtime_error_of(source: &str) -> (RuntimeErrorKind, usize) {
        let mut session = Session::new();
        let mut errors = match session.run(source) {
            Ok(()) => panic!("expected a runtime error for {:?}", source),
            Err(errors) => errors,
        };

        assert_eq!(errors.len(), 1);
        match errors.remove(0) {
            LoxError::Runtime { kind, line } => (kind, line),
            other => panic!("expected a runtime error, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic_and_number_printing() {
        assert_eq!(
            output_of("print 1 + 2 * 3; print 2.5; print 1 / 3; print -(4 - 6); print 1 / 0;"),
            "7\n2.5\n0.3333333333333333\n2\ninf\n"
        );
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(output_of("print \"a\" + \"b\";"), "ab\n");

        let (kind, line) = runtime_error_of("\n\"a\" + 1;");
        assert_eq!(kind, RuntimeErrorKind::OperandsMustBeNumbersOrStrings);
        assert_eq!(line, 2);
    }

    #[test]
    fn test_truthiness_and_logic() {
        assert_eq!(
            output_of("print !0; print !\"\"; print !nil; print nil or \"x\"; print false and boom();"),
            "false\nfalse\ntrue\nx\nfalse\n"
        );
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            output_of(
                "print nil == nil; print nil == false; print 1 == 1; print \"a\" == \"a\"; \
                 print 1 == \"1\"; print clock == clock; print 1 != 2;"
            ),
            "true\nfalse\ntrue\ntrue\nfalse\ntrue\ntrue\n"
        );
    }

    #[test]
    fn test_operand_type_errors() {
        assert_eq!(
            runtime_error_of("print -\"a\";").0,
            RuntimeErrorKind::OperandMustBeNumber
        );
        assert_eq!(
            runtime_error_of("print 1 < \"2\";").0,
            RuntimeErrorKind::OperandsMustBeNumbers
        );
    }

    #[test]
    fn test_block_scope_shadowing() {
        assert_eq!(
            output_of("var a = 1; { var a = 2; print a; } print a;"),
            "2\n1\n"
        );
    }

    #[test]
    fn test_closure_binds_at_definition() {
        let source = r#"
            var a = "global";
            {
                fun showA() { print a; }
                showA();
                var a = "block";
                showA();
            }
        "#;

        assert_eq!(output_of(source), "global\nglobal\n");
    }

    #[test]
    fn test_closure_counters_are_independent() {
        let source = r#"
            fun makeCounter() {
                var i = 0;
                fun count() {
                    i = i + 1;
                    return i;
                }
                return count;
            }

            var a = makeCounter();
            var b = makeCounter();
            print a();
            print a();
            print b();
        "#;

        assert_eq!(output_of(source), "1\n2\n1\n");
    }

    #[test]
    fn test_control_flow() {
        let source = r#"
            for (var i = 0; i < 3; i = i + 1) print i;

            var n = 0;
            while (n < 2) n = n + 1;
            if (n == 2) print "two"; else print "other";

            fun firstOver(limit) {
                var i = 0;
                while (true) {
                    if (i * i > limit) return i;
                    i = i + 1;
                }
            }
            print firstOver(10);
        "#;

        assert_eq!(output_of(source), "0\n1\n2\ntwo\n4\n");
    }

    #[test]
    fn test_recursion_and_forward_references() {
        let source = r#"
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(15);

            fun first() { return second(); }
            fun second() { return "second"; }
            print first();

            fun nothing() {}
            print nothing();
        "#;

        assert_eq!(output_of(source), "610\nsecond\nnil\n");
    }

    #[test]
    fn test_value_display() {
        let source = r#"
            fun f() {}
            class A { m() {} }
            print clock;
            print f;
            print A;
            print A();
            print A().m;
        "#;

        assert_eq!(output_of(source), "<native fn>\n<fn f>\nA\nA instance\n<fn m>\n");
    }

    #[test]
    fn test_clock() {
        assert_eq!(output_of("print clock() > 0;"), "true\n");
    }

    #[test]
    fn test_arity_is_checked_at_call_site() {
        let (kind, line) = runtime_error_of("fun f(a, b) {}\nf(1);");
        assert_eq!(kind, RuntimeErrorKind::Arity { expected: 2, got: 1 });
        assert_eq!(line, 2);

        let (kind, _) = runtime_error_of("fun f(a, b) {}\nf(1, 2, 3);");
        assert_eq!(kind, RuntimeErrorKind::Arity { expected: 2, got: 3 });

        let (kind, _) = runtime_error_of("clock(1);");
        assert_eq!(kind, RuntimeErrorKind::Arity { expected: 0, got: 1 });
    }

    #[test]
    fn test_runtime_error_message() {
        let mut session = Session::new();
        let errors = session.run("print 1;\nprint nope;\nprint 2;").unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Undefined variable 'nope'.\n[line 2]");
        // Execution stops at the failing statement.
        assert_eq!(session.take_output(), "1\n");
    }

    #[test]
    fn test_not_callable() {
        assert_eq!(runtime_error_of("\"a\"();").0, RuntimeErrorKind::NotCallable);
    }

    #[test]
    fn test_classes_fields_and_methods() {
        let source = r#"
            class Box {
                init(v) { this.v = v; }
                get() { return this.v; }
            }

            var b = Box(1);
            var g = b.get;
            b.v = 2;
            print g();

            b.get = "field";
            print b.get;
        "#;

        assert_eq!(output_of(source), "2\nfield\n");
    }

    #[test]
    fn test_initializer_returns_instance() {
        let source = r#"
            class P {
                init(x) {
                    this.x = x;
                    if (x > 5) return;
                    this.small = true;
                }
            }

            var p = P(3);
            print p.x;
            print p.init(9) == p;
            print p.x;
        "#;

        assert_eq!(output_of(source), "3\ntrue\n9\n");
    }

    #[test]
    fn test_class_arity_follows_init() {
        let (kind, _) = runtime_error_of("class P { init(a) {} } P();");
        assert_eq!(kind, RuntimeErrorKind::Arity { expected: 1, got: 0 });

        let (kind, _) = runtime_error_of("class Q {} Q(1);");
        assert_eq!(kind, RuntimeErrorKind::Arity { expected: 0, got: 1 });
    }

    #[test]
    fn test_super_dispatch_keeps_receiver() {
        let source = r#"
            class A {
                describe() { return "A " + this.name; }
                say() { print "A"; }
            }

            class B < A {
                init() { this.name = "b"; }
                describe() { return "B/" + super.describe(); }
                test() { super.say(); }
                say() { print "B"; }
            }

            class C < B {}

            print B().describe();
            C().test();
        "#;

        assert_eq!(output_of(source), "B/A b\nA\n");
    }

    #[test]
    fn test_inherited_methods_and_init() {
        let source = r#"
            class Base { init(n) { this.n = n; } twice() { return this.n * 2; } }
            class Derived < Base {}
            print Derived(21).twice();
        "#;

        assert_eq!(output_of(source), "42\n");
    }

    #[test]
    fn test_property_errors() {
        assert_eq!(
            runtime_error_of("class A {} A().x;").0,
            RuntimeErrorKind::UndefinedProperty("x".into())
        );
        assert_eq!(
            runtime_error_of("1.x;").0,
            RuntimeErrorKind::OnlyInstancesHaveProperties
        );
        assert_eq!(
            runtime_error_of("var n = 1; n.x = 2;").0,
            RuntimeErrorKind::OnlyInstancesHaveFields
        );
        assert_eq!(
            runtime_error_of("class A {} class B < A { m() { return super.nope(); } } B().m();").0,
            RuntimeErrorKind::UndefinedProperty("nope".into())
        );
    }

    #[test]
    fn test_superclass_must_be_class() {
        assert_eq!(
            runtime_error_of("var A = 1;\nclass B < A {}").0,
            RuntimeErrorKind::SuperclassMustBeClass
        );
    }

    #[test]
    fn test_static_errors_prevent_execution() {
        let mut session = Session::new();
        let errors = session.run("print 1;\n{ var a = a; }").unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_static());
        assert_eq!(session.take_output(), "");
    }

    #[test]
    fn test_globals_survive_failed_runs() {
        let mut session = Session::new();

        session
            .run("var a = 1; fun f() { return a; }")
            .unwrap();

        // Fails inside a block and inside a call.
        assert!(session.run("{ var a = \"shadow\"; print -nil; }").is_err());
        assert!(session.run("fun g() { print -nil; } g();").is_err());

        // Defined at top level even though the last failure happened in
        // nested scopes.
        session.run("var b = 2;").unwrap();
        session.run("fun h() { return b; } print f(); print a; print h();").unwrap();

        assert_eq!(session.take_output(), "1\n1\n2\n");
    }

    #[test]
    fn test_closures_survive_across_runs() {
        let mut session = Session::new();

        session
            .run("fun make() { var n = 0; fun inc() { n = n + 1; return n; } return inc; }")
            .unwrap();
        session.run("var c = make();").unwrap();
        session.run("c();").unwrap();
        session.run("print c();").unwrap();

        assert_eq!(session.take_output(), "2\n");
    }

    #[test]
    fn test_class_redeclaration_with_bad_superclass_keeps_old_class() {
        let mut session = Session::new();

        session.run("class A { m() { return 1; } }").unwrap();

        let errors = session.run("class A < Missing {}").unwrap_err();
        assert_eq!(errors[0].to_string(), "Undefined variable 'Missing'.\n[line 1]");

        let errors = session.run("var NotClass = 1;\nclass A < NotClass {}").unwrap_err();
        assert_eq!(errors[0].to_string(), "Superclass must be a class.\n[line 2]");

        session.run("print A; print A().m();").unwrap();
        assert_eq!(session.take_output(), "A\n1\n");
    }

    #[test]
    fn test_deep_recursion_does_not_overflow() {
        let source = r#"
            fun down(n) {
                if (n > 0) return down(n - 1);
                return n;
            }
            print down(10000);

            fun sum(n) {
                if (n == 0) return 0;
                return n + sum(n - 1);
            }
            print sum(10000);
        "#;

        assert_eq!(output_of(source), "0\n50005000\n");
    }

    #[test]
    fn test_deeply_nested_source() {
        let depth = 2000;
        let source = format!("print {}1{};", "(".repeat(depth), ")".repeat(depth));

        assert_eq!(output_of(&source), "1\n");

        let source = format!("{}print 2;{}", "{".repeat(depth), "}".repeat(depth));
        assert_eq!(output_of(&source), "2\n");
    }
}
