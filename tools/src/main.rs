use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codec::{CodecLimits, Network};
use glob::Pattern;
use schema::Side;
use tracing_subscriber::EnvFilter;
use wirepack_tools::{
    channel_layouts, decode_packet_json, format_decode_pretty, format_inspect_report,
    format_layouts, inspect_packet, Manifest,
};

#[derive(Parser)]
#[command(
    name = "wirepack-tools",
    version,
    about = "wirepack inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print each channel's packet layouts.
    Layout {
        /// Schema manifest JSON.
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Print each channel's registry fingerprint.
    Fingerprint {
        /// Schema manifest JSON.
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Decode a captured frame into structured JSON.
    Decode {
        /// Path to the packet bytes.
        packet_file: PathBuf,
        /// Schema manifest JSON.
        #[arg(long)]
        manifest: PathBuf,
        /// Channel to decode against; optional with a single channel.
        #[arg(long)]
        channel: Option<String>,
        /// Side the frame was received on.
        #[arg(long, value_enum)]
        side: SideArg,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Summarise one frame or a directory of frames.
    Inspect {
        /// Path to the packet bytes or a directory.
        packet_path: PathBuf,
        /// Schema manifest JSON.
        #[arg(long)]
        manifest: PathBuf,
        /// Channel to decode against; optional with a single channel.
        #[arg(long)]
        channel: Option<String>,
        /// Side the frames were received on.
        #[arg(long, value_enum)]
        side: SideArg,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected packets.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected packets (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SideArg {
    Client,
    Server,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Client => Self::Client,
            SideArg::Server => Self::Server,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Layout { manifest } => {
            let network = load_network(&manifest)?;
            print!("{}", format_layouts(&channel_layouts(&network)?));
        }
        Command::Fingerprint { manifest } => {
            let network = load_network(&manifest)?;
            for channel in channel_layouts(&network)? {
                println!("{} 0x{:016x}", channel.name, channel.fingerprint);
            }
        }
        Command::Decode {
            packet_file,
            manifest,
            channel,
            side,
            format,
        } => {
            let bytes = fs::read(&packet_file)
                .with_context(|| format!("read packet {}", packet_file.display()))?;
            let network = load_network(&manifest)?;
            let output = decode_packet_json(&bytes, &network, channel.as_deref(), side.into())?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_decode_pretty(&output));
                }
            }
        }
        Command::Inspect {
            packet_path,
            manifest,
            channel,
            side,
            glob,
            sort,
            limit,
        } => {
            let network = load_network(&manifest)?;
            if packet_path.is_dir() {
                let entries = collect_packet_entries(&packet_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = fs::read(&entry.path)
                        .with_context(|| format!("read packet {}", entry.path.display()))?;
                    let report = inspect_packet(&bytes, &network, channel.as_deref(), side.into())?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    print!("{}", format_inspect_report(&report));
                }
            } else {
                let bytes = fs::read(&packet_path)
                    .with_context(|| format!("read packet {}", packet_path.display()))?;
                let report = inspect_packet(&bytes, &network, channel.as_deref(), side.into())?;
                print!("{}", format_inspect_report(&report));
            }
        }
    }
    Ok(())
}

fn load_network(path: &Path) -> Result<Network> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read manifest {}", path.display()))?;
    Manifest::from_json(&contents)?
        .to_network(CodecLimits::default())
        .context("build channels from manifest")
}

struct PacketEntry {
    path: PathBuf,
    size: u64,
}

fn collect_packet_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<PacketEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(PacketEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<PacketEntry>,
    sort: Option<InspectSort>,
) -> Vec<PacketEntry> {
    if let Some(InspectSort::Size) = sort {
        entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    }
    entries
}
