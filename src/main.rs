use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    lumiera::cli::main()
}
