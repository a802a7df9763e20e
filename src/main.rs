use anyhow::Result;
use mrt_assistant::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
