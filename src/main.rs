mod catalog;
mod categorize;
mod cli;
mod comment;
mod config;
mod locate;
mod location;
mod sync;
mod tagdb;
mod tags;
mod xmlstore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    cli::main()
}
