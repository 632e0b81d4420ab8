use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    ragline::cli::main()
}
