use colored::Colorize;
use constitution_deployer::core::output::{self, BoxStyle};

fn main() {
    if let Err(e) = constitution_deployer::run() {
        output::render_box("DEPLOYMENT FAILED", "", BoxStyle::Error);
        eprintln!("{} {}", "error:".bright_red().bold(), e);
        std::process::exit(1);
    }
}
