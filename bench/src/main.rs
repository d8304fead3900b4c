use std::time::Duration;

use bench::{Bench, Cli, Command, init_logging, scenario};
use clap::Parser;
use tracing::info;
use tts::{Vendor, VendorConfig};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging();

    let bench = Bench::new(cli.run, VendorConfig::from_env());
    match cli.command {
        Command::Streaming { vendors, text } => {
            let vendors: Vec<Vendor> = vendors.into_iter().map(Vendor::from).collect();
            bench.streaming(&vendors, &text).await?;
        }
        Command::InputStreaming {
            vendors,
            source,
            token_delay_ms,
        } => {
            let vendors: Vec<Vendor> = vendors.into_iter().map(Vendor::from).collect();
            bench
                .input_streaming(&vendors, source, Duration::from_millis(token_delay_ms))
                .await?;
        }
        Command::Gpt { prompt, complete: true } => {
            let text = llm::complete_from_env(&prompt).await?;
            info!("GPT response: {text}");
        }
        Command::Gpt { prompt, complete: false } => {
            let client = llm::client_from_env();
            let text = scenario::gpt(&client, &llm::model_from_env(), &prompt).await?;
            info!("GPT response: {text}");
        }
    }
    Ok(())
}
