// Command implementations shared by the CLI: read, write, clear and list

use crate::eeprom::{list_buses, scan_bus, DeviceConfig, EepromDevice, EepromError, ProbeResult};
use crate::field::CLEARED_BYTE;
use crate::input::InputError;
use crate::layout::{
    BatchError, ByteChange, ByteRange, FieldChange, FieldReport, Layout, LayoutError,
    LayoutVersion,
};
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Eeprom(#[from] EepromError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("{} ({})", .0.error, .0)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown output format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// How a decoded layout is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned name/value lines
    #[default]
    Text,
    /// JSON document with one entry per field
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(CommandError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(Serialize)]
struct LayoutDocument {
    layout: LayoutVersion,
    fields: Vec<FieldReport>,
}

/// Read the whole device and decode it
pub fn read_layout(device: &mut dyn EepromDevice, version: LayoutVersion) -> Result<Layout> {
    let data = device.read_all()?;
    Ok(Layout::new(&data, version)?)
}

/// Render a layout in the requested format
pub fn render(layout: &Layout, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(layout.render()),
        OutputFormat::Json => {
            let doc = LayoutDocument {
                layout: layout.version(),
                fields: layout.report(),
            };
            let mut text = serde_json::to_string_pretty(&doc)?;
            text.push('\n');
            Ok(text)
        }
    }
}

pub fn run_read(
    device: &mut dyn EepromDevice,
    version: LayoutVersion,
    format: OutputFormat,
) -> Result<String> {
    let layout = read_layout(device, version)?;
    render(&layout, format)
}

/// Smallest range of offsets where @old and @new differ
fn changed_span(old: &[u8], new: &[u8]) -> Option<Range<usize>> {
    let differs = |i: &usize| old[*i] != new[*i];
    let len = old.len().min(new.len());
    let first = (0..len).find(differs)?;
    let last = (0..len).rev().find(differs)?;
    Some(first..last + 1)
}

/// Decode the device, run @change on the layout and store whatever changed
///
/// Bytes modified before a failing entry are written back too, so the device
/// matches what the engine reports.
fn modify<F>(device: &mut dyn EepromDevice, version: LayoutVersion, change: F) -> Result<String>
where
    F: FnOnce(&mut Layout) -> std::result::Result<usize, BatchError>,
{
    let before = device.read_all()?;
    let mut layout = Layout::new(&before, version)?;
    let result = change(&mut layout);

    match changed_span(&before, layout.data()) {
        Some(span) => {
            tracing::debug!("Writing back bytes {:#04x}..{:#04x}", span.start, span.end);
            device.write(span.start, &layout.data()[span])?;
        }
        None => tracing::debug!("No bytes changed, nothing to write"),
    }

    let count = result?;
    tracing::info!("Applied {} change(s)", count);
    Ok(layout.render())
}

pub fn run_write_fields(
    device: &mut dyn EepromDevice,
    version: LayoutVersion,
    changes: &[FieldChange],
) -> Result<String> {
    modify(device, version, |layout| layout.update_fields(changes))
}

pub fn run_write_bytes(
    device: &mut dyn EepromDevice,
    version: LayoutVersion,
    changes: &[ByteChange],
) -> Result<String> {
    modify(device, version, |layout| layout.update_bytes(changes))
}

pub fn run_clear_fields<S: AsRef<str>>(
    device: &mut dyn EepromDevice,
    version: LayoutVersion,
    names: &[S],
) -> Result<String> {
    modify(device, version, |layout| layout.clear_fields(names))
}

pub fn run_clear_bytes(
    device: &mut dyn EepromDevice,
    version: LayoutVersion,
    ranges: &[ByteRange],
) -> Result<String> {
    modify(device, version, |layout| layout.clear_bytes(ranges))
}

/// Erase the whole device to 0xff
pub fn run_clear_all(device: &mut dyn EepromDevice, version: LayoutVersion) -> Result<String> {
    modify(device, version, |layout| {
        let last = layout.len() as i64 - 1;
        layout.clear_bytes(&[ByteRange::new(0, last)])
    })?;

    // The record is blank now; show it the way a fresh read would
    let erased = vec![CLEARED_BYTE; device.size()];
    Ok(Layout::new(&erased, version)?.render())
}

fn format_scan(bus: u8, found: &[(u16, ProbeResult)]) -> String {
    if found.is_empty() {
        return format!("i2c-{}: no devices\n", bus);
    }

    let addrs: Vec<String> = found
        .iter()
        .map(|(addr, result)| match result {
            ProbeResult::Busy => format!("{:#04x} (busy)", addr),
            _ => format!("{:#04x}", addr),
        })
        .collect();
    format!("i2c-{}: {}\n", bus, addrs.join(" "))
}

/// List responding addresses on one bus, or on every i2c-dev bus
pub fn run_list(config: &DeviceConfig, bus: Option<u8>) -> Result<String> {
    let buses = match bus {
        Some(bus) => vec![bus],
        None => list_buses(config)?,
    };

    let mut out = String::new();
    for bus in buses {
        match scan_bus(config, bus) {
            Ok(found) => out.push_str(&format_scan(bus, &found)),
            Err(e) => {
                tracing::warn!("Skipping i2c-{}: {}", bus, e);
                out.push_str(&format!("i2c-{}: {}\n", bus, e));
            }
        }
    }

    Ok(out)
}
