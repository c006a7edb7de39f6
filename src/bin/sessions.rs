use calc::*;
use std::{env, fs};

fn main() {
    // Skip the program name
    let file_name = env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("sessions.txt"));

    let source = fs::read_to_string(&file_name).expect("Failed to read sessions file");

    println!("Analyzing sessions from: {file_name}");
    println!();

    println!("expression := number | \"(\" expression \")\" | expression operator expression | function \"(\" expression \")\"");
    println!("operator := \"+\" | \"-\" | \"*\" | \"/\" | \"^\"");
    println!("function := \"sin\" | \"cos\"");
    println!();

    let sessions = session::parse_sessions(&source);
    print!("{}", session::summary(&sessions));

    let reports: Vec<_> = sessions.iter().map(session::evaluate_session).collect();

    for report in &reports {
        println!("{}", report.block);
    }

    let correct = reports.iter().filter(|report| report.ok).count();
    println!("=== SESSION EVALUATION ===");
    println!("Sessions correct: {} / {}", correct, reports.len());
    println!();

    for report in &reports {
        println!("{}", report.report);
    }
}
