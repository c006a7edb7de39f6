use calc::*;

fn main() -> Result<(), rustyline::error::ReadlineError> {
    let mut rl = rustyline::DefaultEditor::new()?;

    // One environment for the whole interactive session
    let mut evaluator = rt::Evaluator::new();

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match evaluator.evaluate(line) {
                    Ok(value) => println!("{}", fmt::format_result(line, value)),
                    Err(error) => eprintln!("{error}"),
                }
            }
            Err(error) => {
                println!("Bye! ({error})");
                break;
            }
        }
    }

    Ok(())
}
