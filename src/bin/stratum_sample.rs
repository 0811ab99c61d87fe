use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    stratum::example_apps::run_sample_demo(std::env::args().skip(1))
}
