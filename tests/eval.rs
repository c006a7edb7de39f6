use calc::{
    fmt,
    rt::{Error, Evaluator, RuntimeError},
    syntax::ParseError,
};

fn eval(source: &str) -> f64 {
    Evaluator::new().evaluate(source).unwrap()
}

#[test]
fn exponentiation_associativity() {
    assert_eq!(eval("2^3^2"), 512.0);
    assert_eq!(eval("(2^3)^2"), 64.0);
}

#[test]
fn multi_base_literals() {
    assert_eq!(eval("10b"), 2.0);
    assert_eq!(eval("101b"), 5.0);
    assert_eq!(eval("0xFF"), 255.0);
}

#[test]
fn variables_persist_within_one_evaluator() {
    let mut evaluator = Evaluator::new();
    evaluator.evaluate("x = 5").unwrap();
    assert_eq!(evaluator.evaluate("x + 3").unwrap(), 8.0);

    assert!(matches!(
        evaluator.evaluate("y"),
        Err(Error::Runtime(RuntimeError::UndefinedVariable("y")))
    ));
}

#[test]
fn trigonometric_functions() {
    assert_eq!(eval("sin(0)"), 0.0);
    assert_eq!(eval("cos(0)"), 1.0);

    assert!(matches!(
        Evaluator::new().evaluate("tan(0)"),
        Err(Error::Runtime(RuntimeError::UnknownFunction("tan")))
    ));
}

#[test]
fn malformed_expressions() {
    assert!(matches!(
        Evaluator::new().evaluate("(1 + 2"),
        Err(Error::Parse(ParseError::UnmatchedParens(_)))
    ));
    assert!(matches!(
        Evaluator::new().evaluate(""),
        Err(Error::Parse(ParseError::UnexpectedEnd))
    ));
}

#[test]
fn unary_sign_chains() {
    assert_eq!(eval("--5"), 5.0);
    assert_eq!(eval("-+-5"), 5.0);
}

#[test]
fn evaluator_instances_are_isolated() {
    let mut first = Evaluator::new();
    let mut second = Evaluator::new();

    first.evaluate("a = 1").unwrap();
    second.evaluate("b = 2").unwrap();

    assert!(first.evaluate("b").is_err());
    assert!(second.evaluate("a").is_err());
}

#[test]
fn integral_decimal_literals_round_trip_through_the_formatter() {
    for source in ["0", "7", "42", "1000"] {
        let value = eval(source);
        assert_eq!(
            fmt::format_result(source, value),
            format!("{source} = {source}")
        );
    }
}

#[test]
fn evaluation_results_are_deterministic() {
    let mut evaluator = Evaluator::new();
    let first = evaluator.evaluate("sin(1) * cos(2) / 3 ^ 0.5").unwrap();
    let second = evaluator.evaluate("sin(1) * cos(2) / 3 ^ 0.5").unwrap();
    assert_eq!(first, second);
}
