#[tokio::main]
async fn main() -> anyhow::Result<()> {
    casefile::app::run().await
}
