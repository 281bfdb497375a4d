mod app;
mod cli;
mod constants;
mod domain;
mod error;
mod grid;
mod layout;
mod page;
mod scroll_spy;
mod settings;
mod storage;
mod table;

fn main() {
    cli::run_cli();
}
