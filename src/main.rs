mod app;
mod bridge;
mod config;
mod engine;
mod library;
mod permission;
mod poller;
mod runtime;
mod transport;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
