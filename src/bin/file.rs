use calc::*;
use std::{env, fs};

fn main() {
    // Skip the program name
    let mut args = env::args().skip(1);
    match args.next() {
        Some(input_file) => {
            let source = fs::read_to_string(&input_file).expect("Failed to read input file");
            let output_file = args.next().unwrap_or_else(|| String::from("output.txt"));

            println!("Reading from: {input_file}");

            let expression_count = source.lines().filter(|l| !l.trim().is_empty()).count();
            println!("Found {expression_count} expressions");

            // The whole batch shares one environment
            let mut evaluator = rt::Evaluator::new();
            let results = report::process_source(&source, &mut evaluator);

            fs::write(&output_file, results.render()).expect("Failed to write output file");
            println!("Results written to: {output_file}");
        }
        None => {
            println!("Usage: file <input> [output]");
        }
    }
}
