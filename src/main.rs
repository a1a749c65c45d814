use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    timmgpt::cli::main()
}
