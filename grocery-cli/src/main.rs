//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = grocery_cli::run() {
        eprintln!("grocery: {err}");
        std::process::exit(1);
    }
}
