mod config;
mod media;
mod mpris;
mod player;
mod playlist;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
