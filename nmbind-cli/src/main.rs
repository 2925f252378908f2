use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    nmbind_cli::run(nmbind_cli::Args::parse()).await
}
