//! Echo host - replays payloads through a registered echo actor
//!
//! Usage:
//!   echo-host 010203 6363
//!   echo-host --process echo --sender 7 --msg-type 3 010203
//!   echo-host --config config/host.toml --handler 0 6363

use anyhow::{Context, Result};
use clap::Parser;
use config_crate::{Config, Environment, File};
use external_actors::{ActorRegistry, EchoActor, HostConfig, LocalHost, RegistrationKey};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const ECHO_HANDLER_ID: u32 = 0;
const ECHO_PROCESS_NAME: &str = "echo";

#[derive(Parser, Debug)]
#[command(name = "echo-host")]
#[command(about = "Drive the echo actor through its lifecycle")]
#[command(version)]
struct Args {
    /// Path to host configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Spawn the handler registered under this type id
    #[arg(long, conflicts_with = "process")]
    handler: Option<u32>,

    /// Spawn the process registered under this name
    #[arg(long)]
    process: Option<String>,

    /// Sender id attached to every message
    #[arg(long, default_value_t = 7, allow_hyphen_values = true)]
    sender: i32,

    /// Type tag attached to every message
    #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
    msg_type: i32,

    /// Hex-encoded payloads, delivered in order ("6363" requests release)
    payloads: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = load_config(args.config.as_deref())?;
    info!(
        max_instances = config.max_instances,
        max_payload_len = config.max_payload_len,
        "Loaded host configuration"
    );

    let payloads = args
        .payloads
        .iter()
        .map(|p| hex::decode(p).with_context(|| format!("Invalid hex payload '{}'", p)))
        .collect::<Result<Vec<_>>>()?;

    let mut registry = ActorRegistry::new();
    registry.register_handler(ECHO_HANDLER_ID, EchoActor::factory(config.reply_flags()))?;
    registry.register_process(ECHO_PROCESS_NAME, EchoActor::factory(config.reply_flags()))?;

    let key = match (&args.process, args.handler) {
        (Some(name), _) => RegistrationKey::process(name.clone()),
        (None, Some(type_id)) => RegistrationKey::Handler(type_id),
        (None, None) => RegistrationKey::Handler(ECHO_HANDLER_ID),
    };

    let host = LocalHost::new(Arc::new(registry), config)?;
    let ctx = host
        .spawn(key.clone())
        .with_context(|| format!("Failed to spawn {}", key))?;
    info!(key = %key, context_id = %ctx, "Actor spawned");

    for (index, payload) in payloads.into_iter().enumerate() {
        if host.state(ctx).is_none() {
            warn!(remaining = args.payloads.len() - index, "Actor released, skipping remaining payloads");
            break;
        }

        host.deliver(ctx, args.sender, args.msg_type, payload)
            .with_context(|| format!("Delivery of payload {} failed", index))?;

        for reply in host.drain_outbox() {
            println!(
                "reply to={} type={} payload={}",
                reply.recipient,
                reply.msg_type,
                hex::encode(&reply.payload)
            );
        }

        for released in host.process_release_requests() {
            info!(context_id = %released, "Actor requested release and was released");
        }
    }

    host.shutdown();
    let stats = host.stats();
    info!(
        messages = stats.messages_delivered,
        replies = stats.replies_queued,
        send_failures = stats.send_failures,
        released = stats.instances_released,
        "Echo host finished"
    );

    Ok(())
}

fn init_logging(level: &str) {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the optional file, then EXTERNAL_ACTORS_* variables
fn load_config(path: Option<&Path>) -> Result<HostConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        info!("Loading host config: {:?}", path);
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(Environment::with_prefix("EXTERNAL_ACTORS").try_parsing(true));

    let config: HostConfig = builder
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;
    config.validate()?;
    Ok(config)
}
