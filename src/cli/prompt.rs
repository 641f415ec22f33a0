//! Interactive stdin prompts.
//!
//! Pure resolution code never calls into here; only the wrappers that sit
//! between resolution and the user do, and only when flags or manifests
//! left a question open.

use std::io::{self, Write};

/// Ask for a required, non-empty line of input
pub fn input(message: &str) -> io::Result<String> {
    loop {
        print!("{}: ", message);
        io::stdout().flush()?;

        let line = read_line()?;
        let answer = line.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
    }
}

/// Ask for input, falling back to a default shown in brackets
pub fn input_with_default(message: &str, default: &str) -> io::Result<String> {
    print!("{} [{}]: ", message, default);
    io::stdout().flush()?;

    let line = read_line()?;
    let answer = line.trim();
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer.to_string())
    }
}

/// Ask the user to pick one of `options` by number, returning its index
pub fn select(message: &str, options: &[&str]) -> io::Result<usize> {
    println!("{}", message);
    for (i, option) in options.iter().enumerate() {
        println!("  {}) {}", i + 1, option);
    }

    loop {
        print!("Select [1-{}]: ", options.len());
        io::stdout().flush()?;

        let line = read_line()?;
        if let Ok(choice) = line.trim().parse::<usize>()
            && (1..=options.len()).contains(&choice)
        {
            return Ok(choice - 1);
        }
        println!("Enter a number between 1 and {}", options.len());
    }
}

/// Ask a yes/no question, defaulting to no
pub fn confirm(message: &str) -> io::Result<bool> {
    print!("{} [y/N]: ", message);
    io::stdout().flush()?;

    let line = read_line()?;
    let response = line.trim().to_lowercase();
    Ok(matches!(response.as_str(), "y" | "yes"))
}

fn read_line() -> io::Result<String> {
    let mut line = String::new();
    let bytes = io::stdin().read_line(&mut line)?;
    if bytes == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stdin closed while waiting for input",
        ));
    }
    Ok(line)
}
