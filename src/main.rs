// eeprom-util: inspect and update board configuration EEPROMs over i2c

use clap::{ArgAction, Args, Parser, Subcommand};
use eeprom_util::commands::{self, OutputFormat};
use eeprom_util::eeprom::{open_eeprom, AccessMode, DeviceConfig, MAX_I2C_ADDR};
use eeprom_util::field::parser::parse_integer;
use eeprom_util::input::{self, parse_byte_change, parse_byte_range, parse_field_change};
use eeprom_util::layout::LayoutVersion;
use std::io::{self, IsTerminal, Read};
use std::process::ExitCode;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Parse an i2c address given in C notation (0x50, 080 or 80)
fn parse_address(s: &str) -> Result<u16, String> {
    match parse_integer(s) {
        Some(addr) if (0..=MAX_I2C_ADDR as i64).contains(&addr) => Ok(addr as u16),
        Some(_) => Err(format!("address out of range (max {:#04x})", MAX_I2C_ADDR)),
        None => Err(format!("invalid address: {}", s)),
    }
}

#[derive(Parser)]
#[command(name = "eeprom-util")]
#[command(version, about = "Read and update board configuration EEPROMs", long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// EEPROM access method: auto, driver or i2c
    #[arg(long, global = true, default_value_t = AccessMode::Auto)]
    mode: AccessMode,

    #[command(subcommand)]
    command: Commands,
}

/// Device selection shared by every command that touches an EEPROM
#[derive(Args, Debug, Clone)]
struct Target {
    /// Layout version: auto, legacy, 1-4 (optionally v1-v4) or raw
    #[arg(short, long, default_value_t = LayoutVersion::AutoDetect)]
    layout: LayoutVersion,

    /// i2c bus number
    bus: u8,

    /// Device address, e.g. 0x50
    #[arg(value_parser = parse_address)]
    addr: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// List devices responding on one bus, or on all buses
    List {
        /// i2c bus number
        bus: Option<u8>,
    },

    /// Print the EEPROM contents
    Read {
        #[command(flatten)]
        target: Target,

        /// Output format: text or json
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Change fields or bytes
    #[command(subcommand)]
    Write(WriteCommands),

    /// Clear the whole EEPROM, or selected fields or byte ranges
    Clear {
        /// Treat the items as byte offsets or ranges instead of field names
        #[arg(long)]
        bytes: bool,

        #[command(flatten)]
        target: Target,

        /// Field names, or OFFSET[-OFFSET] with --bytes
        items: Vec<String>,
    },
}

#[derive(Subcommand)]
enum WriteCommands {
    /// Set fields by name; changes are read from stdin when none are given
    Fields {
        #[command(flatten)]
        target: Target,

        /// KEY=VALUE; an empty value clears the field
        changes: Vec<String>,
    },

    /// Set byte ranges; changes are read from stdin when none are given
    Bytes {
        #[command(flatten)]
        target: Target,

        /// OFFSET[-OFFSET],VALUE
        changes: Vec<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();
}

/// Changes given inline, or one per line on stdin when piped in
fn collect_changes(inline: Vec<String>) -> anyhow::Result<Vec<String>> {
    if !inline.is_empty() || io::stdin().is_terminal() {
        return Ok(inline);
    }

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| anyhow::anyhow!("Failed to read changes from stdin: {}", e))?;
    Ok(input::split_lines(&text))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DeviceConfig::default().with_mode(cli.mode);

    let output = match cli.command {
        Commands::List { bus } => commands::run_list(&config, bus)?,

        Commands::Read { target, format } => {
            let mut device = open_eeprom(&config, target.bus, target.addr)?;
            commands::run_read(device.as_mut(), target.layout, format)?
        }

        Commands::Write(WriteCommands::Fields { target, changes }) => {
            let tokens = collect_changes(changes)?;
            let changes = input::parse_all(&tokens, parse_field_change)?;
            if changes.is_empty() {
                anyhow::bail!("No field changes given");
            }

            let mut device = open_eeprom(&config, target.bus, target.addr)?;
            commands::run_write_fields(device.as_mut(), target.layout, &changes)?
        }

        Commands::Write(WriteCommands::Bytes { target, changes }) => {
            let tokens = collect_changes(changes)?;
            let changes = input::parse_all(&tokens, parse_byte_change)?;
            if changes.is_empty() {
                anyhow::bail!("No byte changes given");
            }

            let mut device = open_eeprom(&config, target.bus, target.addr)?;
            commands::run_write_bytes(device.as_mut(), target.layout, &changes)?
        }

        Commands::Clear {
            bytes,
            target,
            items,
        } => {
            let mut device = open_eeprom(&config, target.bus, target.addr)?;
            if items.is_empty() {
                commands::run_clear_all(device.as_mut(), target.layout)?
            } else if bytes {
                let ranges = input::parse_all(&items, parse_byte_range)?;
                commands::run_clear_bytes(device.as_mut(), target.layout, &ranges)?
            } else {
                commands::run_clear_fields(device.as_mut(), target.layout, &items)?
            }
        }
    };

    print!("{}", output);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
