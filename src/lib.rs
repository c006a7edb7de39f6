pub mod fmt;
pub mod lex;
pub mod report;
pub mod rt;
pub mod session;
pub mod syntax;

/// The representation used by all calculator numbers and their arithmetic operations.
pub type CalcNumber = f64;
