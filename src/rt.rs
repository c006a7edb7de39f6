use fnv::FnvHashMap;

use crate::{
    lex::{LexError, Lexer},
    syntax::{BinaryOp, Expr, ParseError, Parser, UnaryOp},
    CalcNumber,
};

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError<'src> {
    #[error("Undefined variable: \"{0}\".")]
    UndefinedVariable(&'src str),

    #[error("Unknown function: \"{0}\".")]
    UnknownFunction(&'src str),
}

/// Any failure the evaluation of a single expression can produce.
/// The first error of any stage aborts the whole evaluation; callers attach
/// the source text and move on to the next expression.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error<'src> {
    #[error("{0}")]
    Lex(LexError<'src>),

    #[error("{0}")]
    Parse(ParseError<'src>),

    #[error("{0}")]
    Runtime(RuntimeError<'src>),
}

// `#[from]` can't be derived here because the source errors borrow the
// expression text, which `std::error::Error::source` forbids
impl<'src> From<LexError<'src>> for Error<'src> {
    fn from(error: LexError<'src>) -> Self {
        Error::Lex(error)
    }
}

impl<'src> From<ParseError<'src>> for Error<'src> {
    fn from(error: ParseError<'src>) -> Self {
        Error::Parse(error)
    }
}

impl<'src> From<RuntimeError<'src>> for Error<'src> {
    fn from(error: RuntimeError<'src>) -> Self {
        Error::Runtime(error)
    }
}

type Evaluation<'src> = Result<CalcNumber, RuntimeError<'src>>;

/// Our tree-walk evaluator.
///
/// Owns the variable environment: the mapping from identifier to the value
/// last assigned to it. A fresh instance starts with an empty environment and
/// instances never share state, so creating a new one is the only reset
/// mechanism.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    variables: FnvHashMap<String, CalcNumber>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates one expression string against this evaluator's environment:
    /// lexes, parses and walks the tree, returning the numeric result.
    ///
    /// Assignments mutate the environment and side effects that completed
    /// before a later error are not rolled back.
    pub fn evaluate<'src>(&mut self, source: &'src str) -> Result<CalcNumber, Error<'src>> {
        let tokens = Lexer::new(source).lex()?;
        let expr = Parser::new(&tokens).parse()?;
        Ok(self.evaluate_expression(&expr)?)
    }

    /// Walks an already-parsed expression. Useful when the same tree is
    /// re-evaluated repeatedly against a changing environment.
    pub fn evaluate_expression<'src>(&mut self, expr: &Expr<'src>) -> Evaluation<'src> {
        match expr {
            Expr::Literal(num) => Ok(*num),
            Expr::Variable { identifier } => self.evaluate_variable(identifier),
            Expr::Grouping { expr } => self.evaluate_expression(expr),
            Expr::Assignment { identifier, expr } => self.evaluate_assignment(identifier, expr),
            Expr::Binary { left, op, right } => self.evaluate_binary(left, *op, right),
            Expr::Unary { op, expr } => self.evaluate_unary(*op, expr),
            Expr::FunctionCall {
                identifier,
                argument,
            } => self.evaluate_function_call(identifier, argument),
        }
    }

    fn evaluate_variable<'src>(&mut self, identifier: &'src str) -> Evaluation<'src> {
        self.variables
            .get(identifier)
            .copied()
            .ok_or(RuntimeError::UndefinedVariable(identifier))
    }

    fn evaluate_assignment<'src>(
        &mut self,
        identifier: &'src str,
        expr: &Expr<'src>,
    ) -> Evaluation<'src> {
        let value = self.evaluate_expression(expr)?;
        // Reassignment overwrites silently
        self.variables.insert(identifier.to_owned(), value);
        Ok(value)
    }

    fn evaluate_binary<'src>(
        &mut self,
        left: &Expr<'src>,
        op: BinaryOp,
        right: &Expr<'src>,
    ) -> Evaluation<'src> {
        let left = self.evaluate_expression(left)?;
        let right = self.evaluate_expression(right)?;

        // Division (and remainder) by zero follow IEEE-754 semantics and
        // yield an infinity or NaN rather than an error
        Ok(match op {
            BinaryOp::Add => left + right,
            BinaryOp::Sub => left - right,
            BinaryOp::Mul => left * right,
            BinaryOp::Div => left / right,
            BinaryOp::Rem => left % right,
            BinaryOp::Pow => left.powf(right),
        })
    }

    fn evaluate_unary<'src>(&mut self, op: UnaryOp, expr: &Expr<'src>) -> Evaluation<'src> {
        let value = self.evaluate_expression(expr)?;
        Ok(match op {
            UnaryOp::Plus => value,
            UnaryOp::Minus => -value,
        })
    }

    fn evaluate_function_call<'src>(
        &mut self,
        identifier: &'src str,
        argument: &Expr<'src>,
    ) -> Evaluation<'src> {
        let argument = self.evaluate_expression(argument)?;
        match identifier {
            "sin" => Ok(argument.sin()),
            "cos" => Ok(argument.cos()),
            _ => Err(RuntimeError::UnknownFunction(identifier)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str) -> CalcNumber {
        Evaluator::new().evaluate(source).unwrap()
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3"), 7.0);
        assert_eq!(eval("(1 + 2) * 3"), 9.0);
        assert_eq!(eval("10 - 4 / 2"), 8.0);
        assert_eq!(eval("7 % 4"), 3.0);
    }

    #[test]
    fn power_associativity() {
        assert_eq!(eval("2^3^2"), 512.0);
        assert_eq!(eval("(2^3)^2"), 64.0);
    }

    #[test]
    fn unary_chaining() {
        assert_eq!(eval("--5"), 5.0);
        assert_eq!(eval("-+-5"), 5.0);
        assert_eq!(eval("+5"), 5.0);
    }

    #[test]
    fn mixed_base_literals() {
        assert_eq!(eval("0xFF"), 255.0);
        assert_eq!(eval("10b"), 2.0);
        assert_eq!(eval("101b + 0x1"), 6.0);
    }

    #[test]
    fn assignment_persists_in_the_environment() {
        let mut evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate("x = 5").unwrap(), 5.0);
        assert_eq!(evaluator.evaluate("x + 3").unwrap(), 8.0);

        // Reassignment overwrites
        assert_eq!(evaluator.evaluate("x = 1").unwrap(), 1.0);
        assert_eq!(evaluator.evaluate("x").unwrap(), 1.0);
    }

    #[test]
    fn undefined_variable_fails() {
        let mut evaluator = Evaluator::new();
        assert!(matches!(
            evaluator.evaluate("y + 1"),
            Err(Error::Runtime(RuntimeError::UndefinedVariable("y")))
        ));
    }

    #[test]
    fn evaluators_are_isolated() {
        let mut first = Evaluator::new();
        let mut second = Evaluator::new();

        first.evaluate("shared = 1").unwrap();
        assert!(second.evaluate("shared").is_err());
    }

    #[test]
    fn trigonometric_functions() {
        assert_eq!(eval("sin(0)"), 0.0);
        assert_eq!(eval("cos(0)"), 1.0);
    }

    #[test]
    fn unknown_function_fails() {
        let mut evaluator = Evaluator::new();
        assert!(matches!(
            evaluator.evaluate("tan(0)"),
            Err(Error::Runtime(RuntimeError::UnknownFunction("tan")))
        ));
    }

    #[test]
    fn errors_from_every_stage_convert_and_keep_their_messages() {
        let mut evaluator = Evaluator::new();

        assert!(matches!(evaluator.evaluate("0x"), Err(Error::Lex(_))));
        assert_eq!(
            evaluator.evaluate("0x").unwrap_err().to_string(),
            "Invalid numeric literal \"0x\"."
        );

        assert!(matches!(evaluator.evaluate("(1"), Err(Error::Parse(_))));
        assert_eq!(
            evaluator.evaluate("nope").unwrap_err().to_string(),
            "Undefined variable: \"nope\"."
        );
    }

    #[test]
    fn division_by_zero_follows_float_semantics() {
        assert_eq!(eval("1 / 0"), f64::INFINITY);
        assert!(eval("0 / 0").is_nan());
    }

    #[test]
    fn failed_statements_leave_earlier_state_intact() {
        let mut evaluator = Evaluator::new();
        // A failing right-hand side never stores the target variable
        assert!(evaluator.evaluate("a = 1 + nope").is_err());
        assert!(evaluator.evaluate("a").is_err());

        // Errors in later statements don't roll back earlier assignments
        evaluator.evaluate("b = 2").unwrap();
        assert!(evaluator.evaluate("c = b + nope").is_err());
        assert_eq!(evaluator.evaluate("b").unwrap(), 2.0);
    }
}
