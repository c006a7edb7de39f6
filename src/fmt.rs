use crate::CalcNumber;

/// How close a result has to be to its truncation to count as an integer for
/// display purposes.
const INTEGER_EPSILON: CalcNumber = 1e-9;

/// Formats an evaluated result as `<expression> = <value>`.
///
/// The value renders as an integer when the source text contains no decimal
/// point and the result is within [`INTEGER_EPSILON`] of its truncation,
/// otherwise fixed at 2 decimal places.
pub fn format_result(expression: &str, result: CalcNumber) -> String {
    let truncated = result.trunc();

    if !has_decimal_point(expression) && (result - truncated).abs() < INTEGER_EPSILON {
        format!("{} = {}", expression, truncated as i64)
    } else {
        format!("{} = {:.2}", expression, result)
    }
}

/// Whether the original source text contains a decimal point.
pub fn has_decimal_point(expression: &str) -> bool {
    expression.contains('.')
}

/// A coarse, purely textual classification of an expression, used to group
/// batch output. Checked in declaration order: the first matching category
/// wins.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Category {
    Advanced,
    Variables,
    HexBinary,
    BasicCalc,
}

impl Category {
    pub fn classify(expression: &str) -> Self {
        // Power, parentheses and function names mark advanced expressions
        if expression.contains('(')
            || expression.contains('^')
            || expression.contains("sin")
            || expression.contains("cos")
        {
            return Category::Advanced;
        }

        // Assignments, or a leading letter combined with an operator
        let starts_with_letter = expression
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());
        if expression.contains('=')
            || (starts_with_letter && expression.contains(['+', '-', '*', '/', '%']))
        {
            return Category::Variables;
        }

        if expression.contains("0x") {
            return Category::HexBinary;
        }

        if expression.contains('b') && expression.contains(['0', '1']) {
            return Category::HexBinary;
        }

        Category::BasicCalc
    }

    /// The banner printed above this category's block in batch output.
    pub fn banner(&self) -> &'static str {
        match self {
            Category::BasicCalc => "=== BASIC CALCULATIONS ===",
            Category::HexBinary => "=== HEX & BINARY ===",
            Category::Variables => "=== VARIABLES ===",
            Category::Advanced => "=== ADVANCED (POWER & FUNCTIONS) ===",
        }
    }
}
