#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pilot_cli::cli::app::run().await
}
