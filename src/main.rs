use lantern_lang::runner::{run_file, run_prompt};
use std::env;

pub fn main() -> anyhow::Result<()> {
    simple_logger::init_with_level(log::Level::Warn).ok();

    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => run_prompt(),
        2 => run_file(&args[1])?,
        _ => {
            eprintln!("Usage: lantern [script]");
            std::process::exit(64);
        }
    }
    Ok(())
}
