use bingdaily::config::ERROR_LOG_FILE_NAME;
use bingdaily::report::write_error_log;
use bingdaily::{BingError, Client, Downloader, Settings};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "bingdaily", about = "Download the Bing daily image.")]
struct Cli {
    /// The directory to save downloaded images to.
    #[arg(short = 's', long = "savedir", value_name = "DIR")]
    save_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            // Without an executable path the log goes to the working directory.
            let _ = write_error_log(Path::new(ERROR_LOG_FILE_NAME), &err);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = write_error_log(&settings.error_log_path, &err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, settings: &Settings) -> Result<(), BingError> {
    let client = Client::new()?
        .with_base_url(settings.base_url.as_str())
        .with_market(settings.market.as_str());
    Downloader::new(client, &settings.cache_path)
        .run(&cli.save_dir)
        .await?;
    Ok(())
}
