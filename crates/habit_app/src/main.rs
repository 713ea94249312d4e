use clap::Parser;
use habit_app::app::{run, AppConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let config = AppConfig::parse();
    match run(&config) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("Failed to build habit report: {err:#}");
            std::process::exit(1);
        }
    }
}
