use std::fmt::Write;

use crate::{
    fmt::{self, Category},
    rt::Evaluator,
};

/// Formatted per-expression outputs, bucketed by [`Category`].
#[derive(Debug, Clone, Default)]
pub struct CategoryResults {
    pub basic_calc: Vec<String>,
    pub hex_binary: Vec<String>,
    pub variables: Vec<String>,
    pub advanced: Vec<String>,
}

impl CategoryResults {
    fn bucket(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::BasicCalc => &mut self.basic_calc,
            Category::HexBinary => &mut self.hex_binary,
            Category::Variables => &mut self.variables,
            Category::Advanced => &mut self.advanced,
        }
    }

    /// Renders the grouped report. Empty categories are skipped entirely.
    pub fn render(&self) -> String {
        let sections = [
            (Category::BasicCalc, &self.basic_calc),
            (Category::HexBinary, &self.hex_binary),
            (Category::Variables, &self.variables),
            (Category::Advanced, &self.advanced),
        ];

        let mut output = String::new();
        for (category, lines) in sections {
            if lines.is_empty() {
                continue;
            }

            writeln!(output, "{}", category.banner()).unwrap();
            for line in lines {
                writeln!(output, "{}", line).unwrap();
            }
            writeln!(output).unwrap();
        }

        output
    }
}

/// Evaluates every non-empty line of `source` against the shared evaluator,
/// formatting successes and failures alike and bucketing them by category.
/// A failing expression never prevents evaluation of subsequent lines.
pub fn process_source(source: &str, evaluator: &mut Evaluator) -> CategoryResults {
    let mut results = CategoryResults::default();

    for expression in source.lines() {
        let expression = expression.trim();
        if expression.is_empty() {
            continue;
        }

        let output = match evaluator.evaluate(expression) {
            Ok(value) => fmt::format_result(expression, value),
            Err(error) => format!("{} => Error: {}", expression, error),
        };

        results.bucket(Category::classify(expression)).push(output);
    }

    results
}
