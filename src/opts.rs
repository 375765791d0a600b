//! CLI options.

use clap::{Args, Parser};

use crate::prelude::*;

#[derive(Parser)]
#[command(version, about)]
pub struct Opts {
    /// Sentry DSN
    #[arg(short, long, env = "AVG_REDUCER_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,

    /// Performance tracing sample rate
    #[arg(long, env = "AVG_REDUCER_TRACES_SAMPLE_RATE", default_value = "0.0")]
    pub traces_sample_rate: f32,

    #[command(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(clap::Subcommand)]
pub enum Subcommand {
    Reduce(ReduceOpts),
}

/// Runs the average reducer
#[derive(Args)]
pub struct ReduceOpts {
    #[command(flatten)]
    pub connections: ConnectionOpts,

    /// Inbound probe stream
    #[arg(long, default_value = "avgConsumer-in-0")]
    pub inbound_stream: String,

    /// Outbound average stream
    #[arg(long, default_value = "avgProducer-out-0")]
    pub outbound_stream: String,

    /// Consumer group of the inbound stream
    #[arg(long, default_value = "avg-reducer")]
    pub group: String,

    /// Consumer name within the group
    #[arg(long, env = "AVG_REDUCER_CONSUMER", default_value = "avg-reducer-0")]
    pub consumer: String,

    /// Blocking-read timeout on the inbound stream
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub poll_timeout: StdDuration,
}

#[derive(Args)]
pub struct ConnectionOpts {
    /// Redis URI
    #[arg(
        short,
        long,
        env = "AVG_REDUCER_REDIS_URI",
        default_value = "redis://127.0.0.1/0"
    )]
    pub redis_uri: String,
}
