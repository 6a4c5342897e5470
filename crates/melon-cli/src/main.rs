//! `melon` command line
//!
//! Front end over the dispatch codec, the image resolver and the
//! notification composer (posting to an in-memory platform).

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use melon_dispatch::{AutomationRegistry, DeliveryMode, DispatchPayload, DispatchRequest, Transit};
use melon_image::{DirAssetLoader, Image, ImageCache, ImageResolver, ResourceDescriptor};
use melon_notify::{InMemoryPlatform, MelonConfig, NotificationComposer, NotificationPlatform};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("melon")
        .version(melon_notify::VERSION)
        .about("Melon notification composer and procedure dispatch")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("encode")
                .about("Encode a dispatch request as a transit payload")
                .arg(Arg::new("screen").long("screen").required(true).help("Target screen id"))
                .arg(Arg::new("procedure").long("procedure").required(true).help("Procedure name"))
                .arg(
                    Arg::new("args")
                        .long("args")
                        .default_value("[]")
                        .help("Arguments as a JSON array"),
                )
                .arg(
                    Arg::new("background")
                        .long("background")
                        .action(ArgAction::SetTrue)
                        .help("Deliver through the automation bridge"),
                )
                .arg(
                    Arg::new("native")
                        .long("native")
                        .action(ArgAction::SetTrue)
                        .help("Carry arguments as a native list instead of JSON text"),
                ),
        )
        .subcommand(
            Command::new("decode")
                .about("Decode a transit payload")
                .arg(Arg::new("payload").required(true).help("Payload JSON")),
        )
        .subcommand(
            Command::new("post")
                .about("Compose and post a notification")
                .arg(Arg::new("title").long("title").required(true))
                .arg(Arg::new("text").long("text").required(true))
                .arg(Arg::new("icon").long("icon").default_value(":alert").help("Small icon descriptor"))
                .arg(Arg::new("large-icon").long("large-icon").help("Large icon descriptor"))
                .arg(Arg::new("channel").long("channel").help("Channel id"))
                .arg(
                    Arg::new("id")
                        .long("id")
                        .default_value("0")
                        .value_parser(value_parser!(i32))
                        .help("Notification id; 0 generates one"),
                )
                .arg(
                    Arg::new("asset-root")
                        .long("asset-root")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory holding named assets"),
                ),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve an image descriptor")
                .arg(Arg::new("descriptor").required(true))
                .arg(
                    Arg::new("asset-root")
                        .long("asset-root")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory holding named assets"),
                )
                .arg(
                    Arg::new("no-cache")
                        .long("no-cache")
                        .action(ArgAction::SetTrue)
                        .help("Bypass the image cache"),
                ),
        )
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a String> {
    args.get_one::<String>(name)
        .with_context(|| format!("missing --{name}"))
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<MelonConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => Ok(MelonConfig::load(path)?),
        None => Ok(MelonConfig::default()),
    }
}

fn describe(image: &Image) -> Value {
    match image {
        Image::Icon(icon) => json!({ "icon": icon.name, "resource": icon.resource }),
        Image::Bitmap(bitmap) => json!({ "width": bitmap.width(), "height": bitmap.height() }),
    }
}

fn encode(args: &ArgMatches) -> anyhow::Result<()> {
    let arguments: Value = serde_json::from_str(required(args, "args")?).context("--args is not JSON")?;
    let Value::Array(arguments) = arguments else {
        bail!("--args must be a JSON array");
    };
    let mode = if args.get_flag("background") {
        DeliveryMode::Background
    } else {
        DeliveryMode::Foreground
    };
    let transit = if args.get_flag("native") {
        Transit::Native
    } else {
        Transit::Json
    };
    let request = DispatchRequest::new(required(args, "screen")?.as_str(), required(args, "procedure")?.as_str())
        .with_arguments(arguments)
        .with_mode(mode);
    println!("{}", DispatchPayload::encode(&request, transit)?.to_json()?);
    Ok(())
}

fn decode(args: &ArgMatches) -> anyhow::Result<()> {
    let request = DispatchPayload::from_json(required(args, "payload")?)?.decode()?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

async fn post(mut config: MelonConfig, args: &ArgMatches) -> anyhow::Result<()> {
    if let Some(root) = args.get_one::<PathBuf>("asset-root") {
        config = config.with_asset_root(root);
    }
    let platform = Arc::new(InMemoryPlatform::new());
    let mut composer = NotificationComposer::from_config(config, &AutomationRegistry::new(), platform.clone());

    if let Some(channel) = args.get_one::<String>("channel") {
        composer.set_channel(channel)?;
    }
    composer
        .set_base(
            required(args, "title")?,
            required(args, "text")?,
            &ResourceDescriptor::parse(required(args, "icon")?),
        )
        .await?;
    if let Some(large) = args.get_one::<String>("large-icon") {
        composer.set_large_icon(&ResourceDescriptor::parse(large))?;
    }

    let requested = args.get_one::<i32>("id").copied().unwrap_or(0);
    let id = composer.post(requested).await?;
    let posted = platform
        .active_notifications()
        .into_iter()
        .find(|p| p.id == id)
        .context("posted notification not found")?;
    let n = &posted.notification;
    let summary = json!({
        "id": id,
        "channel": n.channel_id,
        "title": n.title,
        "text": n.text,
        "small_icon": describe(&n.small_icon),
        "large_icon": n.large_icon.as_ref().map(describe),
        "post_time": posted.post_time.to_rfc3339(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn resolve(config: MelonConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let root = args
        .get_one::<PathBuf>("asset-root")
        .cloned()
        .or(config.asset_root)
        .unwrap_or_else(|| PathBuf::from("."));
    let cache = ImageCache::new(config.cache_capacity);
    cache.set_enabled(config.caching_enabled && !args.get_flag("no-cache"));
    let resolver = ImageResolver::new(cache, Arc::new(DirAssetLoader::new(root)));

    let descriptor = ResourceDescriptor::parse(required(args, "descriptor")?);
    let image = resolver
        .resolve("descriptor", &descriptor, false)?
        .await?
        .context("descriptor resolved to no image")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "descriptor": descriptor.to_string(), "image": describe(&image) }))?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let matches = cli().get_matches();
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("encode", args)) => encode(args),
        Some(("decode", args)) => decode(args),
        Some(("post", args)) => post(config, args).await,
        Some(("resolve", args)) => resolve(config, args).await,
        Some((other, _)) => bail!("unknown command '{other}'"),
        None => bail!("no command given"),
    }
}
