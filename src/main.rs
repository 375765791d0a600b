use clap::Parser;

use crate::opts::{Opts, Subcommand};
use crate::prelude::*;

mod backoff;
mod channel;
mod logging;
mod models;
mod opts;
mod prelude;
mod reducer;
mod store;

#[tokio::main]
async fn main() -> Result {
    let opts = Opts::parse();
    let _sentry_guard = logging::init(opts.sentry_dsn.clone(), opts.traces_sample_rate)?;
    match opts.subcommand {
        Subcommand::Reduce(opts) => reducer::run(opts).await,
    }
}
