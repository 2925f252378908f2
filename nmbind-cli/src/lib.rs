pub mod demo;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use nmbind::core::coerce::coerce;
use nmbind::{AnyDevice, ClientConfig, NetworkManager, Render};

#[derive(Parser, Debug)]
#[command(name = "nmbind")]
#[command(version, about = "Browse the NetworkManager object graph")]
pub struct Args {
    /// Bus name of the NetworkManager service.
    #[arg(long, default_value = nmbind::types::constants::service::NAME)]
    service: String,

    /// Root object path; events are filtered to this namespace.
    #[arg(long, default_value = nmbind::types::constants::service::ROOT_PATH)]
    root_path: String,

    /// Events buffered by `watch` before new ones are dropped.
    #[arg(long, default_value_t = nmbind::types::constants::defaults::EVENT_QUEUE_CAPACITY)]
    event_capacity: usize,

    /// Use a built-in in-memory network instead of the system bus.
    #[arg(long)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the overall networking state.
    State,
    /// List devices with their type and state.
    Devices,
    /// Print the whole rendered graph as JSON.
    Dump,
    /// List saved connection profiles.
    Connections,
    /// Print one profile's settings (without secrets) as JSON.
    Settings {
        /// Object path of the profile.
        path: String,
    },
    /// Trigger a Wi-Fi scan and list visible access points.
    Scan,
    /// Print events until interrupted.
    Watch,
}

pub async fn run(args: Args) -> Result<()> {
    let config = ClientConfig::new()
        .with_service(args.service.clone())
        .with_root_path(args.root_path.clone())
        .with_event_capacity(args.event_capacity);

    let nm = if args.demo {
        debug!("Using in-memory demo network");
        NetworkManager::with_transport(Arc::new(demo::network()), config)?
    } else {
        NetworkManager::with_config(config)
            .await
            .context("failed to connect to the system bus")?
    };

    match args.command {
        Command::State => println!("{}", nm.state().await?),
        Command::Devices => print_devices(&nm).await?,
        Command::Dump => {
            let rendered = nm.render().await.context("failed to read object graph")?;
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
        Command::Connections => print_connections(&nm).await?,
        Command::Settings { path } => {
            let conn = nm.connection(&path)?;
            let rendered = conn
                .render()
                .await
                .with_context(|| format!("failed to read settings of {path}"))?;
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
        Command::Scan => scan(&nm).await?,
        Command::Watch => watch(&nm).await?,
    }

    Ok(())
}

async fn print_devices(nm: &NetworkManager) -> Result<()> {
    for device in nm.devices().await? {
        let base = device.as_ref();
        println!(
            "{:<12} {:<10} {:<14} {}",
            base.interface().await?,
            base.device_type().await?.to_string(),
            base.state().await?.to_string(),
            device.path()
        );
    }
    Ok(())
}

async fn print_connections(nm: &NetworkManager) -> Result<()> {
    for conn in nm.settings().list_connections().await? {
        let settings = conn.settings().await?;
        let id = match settings.get("connection").and_then(|g| g.get("id")) {
            Some(raw) => coerce::<String>("connection.id", raw)?,
            None => String::from("<unnamed>"),
        };
        println!("{id:<24} {}", conn.path());
    }
    Ok(())
}

async fn scan(nm: &NetworkManager) -> Result<()> {
    for device in nm.devices().await? {
        let AnyDevice::Wireless(wifi) = &device else {
            continue;
        };
        let iface = device.as_ref().interface().await?;
        wifi.request_scan()
            .await
            .with_context(|| format!("scan request on {iface} was rejected"))?;

        println!("{iface}:");
        for ap in wifi.access_points().await? {
            println!(
                "  {:<32} {:>3}%  {} MHz",
                ap.ssid_string().await?,
                ap.strength().await?,
                ap.frequency().await?
            );
        }
    }
    Ok(())
}

async fn watch(nm: &NetworkManager) -> Result<()> {
    let events = nm.subscribe().await.context("failed to subscribe")?;
    eprintln!("Watching for events, Ctrl-C to stop");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => println!(
                    "{} {}.{} {:?}",
                    event.path, event.interface, event.member, event.args
                ),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    nm.unsubscribe().await;
    if events.dropped() > 0 {
        eprintln!("{} events were dropped", events.dropped());
    }
    Ok(())
}
