//! CLI application for driving Govee devices the way the bridge does.
//!
//! Run with: cargo run --example govee_cli -- --help

use clap::{Parser, Subcommand};
use std::net::Ipv4Addr;
use std::time::Duration;
use strum::IntoEnumIterator;

use hue_govee_bridge::{
    Brightness, Color, Config, Coords, DEFAULT_MULTICAST_IP, DeviceCommander, GamutType,
    GoveeClient, Kelvin, kelvin_to_rgb, resolve_gamut, xy_to_rgb,
};

#[derive(Parser)]
#[command(name = "govee-cli")]
#[command(about = "Control Govee devices over the LAN API", long_about = None)]
struct Cli {
    /// IP address of the device (not required for discover and check-config)
    #[arg(short, long, global = true)]
    ip: Option<Ipv4Addr>,

    /// Device id the commands are addressed to
    #[arg(short, long, global = true, default_value = "cli-device")]
    device: String,

    /// Multicast group used for discovery
    #[arg(long, global = true, default_value_t = DEFAULT_MULTICAST_IP)]
    multicast: Ipv4Addr,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the network for Govee devices
    Discover {
        /// Scan window in seconds (default: 5)
        #[arg(short, long, default_value = "5")]
        timeout: u64,
    },

    /// Turn the device on
    On,

    /// Turn the device off
    Off,

    /// Set RGB color (0-255 for each component)
    Color {
        red: u8,
        green: u8,
        blue: u8,
    },

    /// Set brightness (0-100)
    Brightness {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },

    /// Show a Hue xy color, corrected into a gamut
    Xy {
        x: f64,
        y: f64,
        /// Brightness percentage
        #[arg(short, long, default_value = "100")]
        brightness: f64,
        /// Gamut type of the source light
        #[arg(short, long, default_value = "C")]
        gamut: GamutType,
    },

    /// Show a Hue color temperature given in mired
    Mirek {
        mirek: u16,
        /// Brightness percentage
        #[arg(short, long, default_value = "100")]
        brightness: f64,
    },

    /// List the built-in gamuts
    Gamuts,

    /// Load and validate a bridge configuration file
    CheckConfig { path: String },
}

async fn show(client: &GoveeClient, device: &str, color: Color) {
    println!("Sending RGB{:?} to {}...", color.channels(), device);
    match client.set_color(device, &color).await {
        Ok(_) => println!("Color sent"),
        Err(e) => eprintln!("Error: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = GoveeClient::new(cli.multicast);

    match cli.command {
        Commands::Discover { timeout } => {
            println!("Scanning for Govee devices ({} seconds)...", timeout);
            match client.discover(Duration::from_secs(timeout)).await {
                Ok(devices) if devices.is_empty() => println!("No devices found."),
                Ok(devices) => {
                    println!("Found {} device(s):", devices.len());
                    for device in devices {
                        println!(
                            "  - {} at {} ({})",
                            device.device_id,
                            device.ip,
                            device.sku.as_deref().unwrap_or("unknown model")
                        );
                    }
                }
                Err(e) => eprintln!("Error during discovery: {}", e),
            }
        }

        Commands::Gamuts => {
            for gamut_type in GamutType::iter() {
                match gamut_type.gamut() {
                    Some(g) => println!(
                        "  {}: red {:?}, green {:?}, blue {:?}",
                        gamut_type, g.red, g.green, g.blue
                    ),
                    None => println!("  {}: falls back to the default gamut", gamut_type),
                }
            }
        }

        Commands::CheckConfig { path } => {
            let config = Config::load(&path)?;
            println!("Configuration {} is valid:", path);
            println!("  bridge: {}", config.hue_bridge_id);
            if let Some(address) = &config.hue_bridge_address {
                println!("  bridge address: {}", address);
            }
            println!("  log level: {}", config.log_level());
            println!("  poll interval: {:?}", config.poll_interval);
            for sync in &config.synchronizations {
                println!(
                    "  light {} (room {}) -> device {}{}",
                    sync.hue_light_id,
                    sync.hue_room_id,
                    sync.govee_device_id,
                    sync.fixed_brightness
                        .map(|b| format!(" at {}%", b))
                        .unwrap_or_default()
                );
            }
        }

        command => {
            // Everything else talks to one device
            let ip = cli.ip.ok_or("IP address is required for this command. Use --ip <IP>")?;
            let device = cli.device.as_str();
            client.register(device, ip);

            match command {
                Commands::Discover { .. } | Commands::Gamuts | Commands::CheckConfig { .. } => {
                    unreachable!()
                }

                Commands::On => {
                    println!("Turning {} ON...", ip);
                    match client.turn_on(device).await {
                        Ok(_) => println!("Device turned ON"),
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }

                Commands::Off => {
                    println!("Turning {} OFF...", ip);
                    match client.turn_off(device).await {
                        Ok(_) => println!("Device turned OFF"),
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }

                Commands::Color { red, green, blue } => {
                    show(&client, device, Color::rgb(red, green, blue)).await;
                }

                Commands::Brightness { level } => {
                    let Some(brightness) = Brightness::create(level) else {
                        eprintln!("Invalid brightness value. Must be between 0 and 100.");
                        return Ok(());
                    };
                    println!("Setting brightness to {}% at {}...", level, ip);
                    match client.set_brightness(device, &brightness).await {
                        Ok(_) => println!("Brightness set successfully"),
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }

                Commands::Xy {
                    x,
                    y,
                    brightness,
                    gamut,
                } => {
                    let gamut = resolve_gamut(None, Some(gamut));
                    match xy_to_rgb(Coords::new(x, y), brightness, &gamut) {
                        Some(color) => show(&client, device, color).await,
                        None => eprintln!("({}, {}) has no RGB equivalent", x, y),
                    }
                }

                Commands::Mirek { mirek, brightness } => match Kelvin::from_mirek(mirek) {
                    Some(kelvin) => {
                        println!("{} mired is {}K", mirek, kelvin.kelvin());
                        show(&client, device, kelvin_to_rgb(kelvin, brightness)).await;
                    }
                    None => eprintln!("A mired value of 0 has no temperature"),
                },
            }
        }
    }

    Ok(())
}
