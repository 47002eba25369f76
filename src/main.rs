//! rtcheck CLI binary
//!
//! All logic is in the library; main.rs only invokes cli::run().

fn main() {
    // cli::run() handles ALL output including errors
    if let Err(code) = rtcheck::cli::run() {
        std::process::exit(code.as_i32());
    }
}
