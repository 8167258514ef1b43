use clap::Parser;
use sentinel_incidents::{cli::{run, App}, config::Config, errors::AppError, logging::Logging};
use tokio;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    Logging::try_init()?;

    let app = App::parse();
    let config = Config::from_env()?;

    let output = run(app, config).await?;
    println!("{}", output);

    Ok(())
}
