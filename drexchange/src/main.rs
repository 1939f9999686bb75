use clap::Parser as _;
use drexchange::BaseArgs;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

pub fn main() -> anyhow::Result<()> {
    // Library crates report through `tracing`; stdout may carry the report
    // itself, so events go to stderr.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    BaseArgs::parse().evaluate()
}
