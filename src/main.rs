use clap::Parser;
use console::style;
use log::error;
use video_frame_extract::cli::{self, Cli};
use video_frame_extract::component::frame_extractor::EXIT_PRECONDITION;
use video_frame_extract::init;
use video_frame_extract::signal::setup_shutdown_signal;

fn main() {
    let args = Cli::parse();
    init::init(args.verbose);

    let shutdown_signal = match setup_shutdown_signal() {
        Ok(signal) => signal,
        Err(e) => {
            error!("{e:#}");
            eprintln!("{} {e:#}", style("錯誤:").red().bold());
            std::process::exit(EXIT_PRECONDITION);
        }
    };

    std::process::exit(cli::execute(&args, &shutdown_signal));
}
