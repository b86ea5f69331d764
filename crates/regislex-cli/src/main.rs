use std::time::Duration;

use clap::{Parser, Subcommand};
use regislex_core::schema::DIR_LISTING_V1;
use regislex_core::{get_platform, PalError};
use regislex_fs::{DirEntry, DirIter};
use regislex_net::{AddressFamily, NetContext, Socket, SocketType};
use regislex_time::TimeZone;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Diagnostics for the RegisLex platform abstraction layer.
#[derive(Parser, Debug)]
#[command(name = "regislex-pal", version, about, long_about = None)]
struct Cli {
    /// The format for log output.
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "REGISLEX_LOG_FORMAT"
    )]
    log_format: LogFormat,

    /// The minimum log level to display.
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "REGISLEX_LOG_LEVEL"
    )]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show host information (platform, CPUs, memory, host name).
    Info(InfoArgs),

    /// List a directory.
    Ls(LsArgs),

    /// Create a directory.
    Mkdir(MkdirArgs),

    /// Remove a file or directory.
    Rm(RmArgs),

    /// Copy a file.
    Cp(CopyArgs),

    /// Rename or move a file or directory.
    Mv(CopyArgs),

    /// Print the current time, or convert an ISO 8601 timestamp.
    Now(NowArgs),

    /// Print random bytes from the OS CSPRNG as hex.
    Random(RandomArgs),

    /// Check whether a TCP port accepts connections.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Output JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct LsArgs {
    /// Directory to list (default: current directory).
    #[arg(value_name = "DIR", default_value = ".")]
    dir: String,

    /// Output JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct MkdirArgs {
    #[arg(value_name = "DIR")]
    dir: String,

    /// Create missing parent directories; succeed if it already exists.
    #[arg(short = 'p', long)]
    parents: bool,
}

#[derive(Parser, Debug)]
struct RmArgs {
    #[arg(value_name = "PATH")]
    path: String,

    /// Remove a directory and everything beneath it.
    #[arg(short = 'r', long)]
    recursive: bool,
}

#[derive(Parser, Debug)]
struct CopyArgs {
    #[arg(value_name = "FROM")]
    from: String,

    #[arg(value_name = "TO")]
    to: String,
}

#[derive(Parser, Debug)]
struct NowArgs {
    /// Render in the local time zone instead of UTC.
    #[arg(long)]
    local: bool,

    /// Parse this ISO 8601 text and print Unix seconds instead.
    #[arg(long, value_name = "TEXT")]
    parse: Option<String>,
}

#[derive(Parser, Debug)]
struct RandomArgs {
    /// Number of bytes to draw.
    #[arg(long, value_name = "N", default_value_t = 16)]
    bytes: usize,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    #[arg(value_name = "HOST")]
    host: String,

    #[arg(value_name = "PORT")]
    port: u16,

    /// Give up after this many milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    timeout_ms: u64,

    /// Use IPv6.
    #[arg(short = '6', long)]
    ipv6: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable text format.
    Text,
    /// Machine-readable JSON format.
    Json,
}

fn main() {
    let cli = Cli::parse();

    // Initialize the tracing subscriber
    let filter = EnvFilter::from_default_env().add_directive(cli.log_level.into());

    match cli.log_format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "regislex-pal starting");
    if let Some(command) = cli.command {
        match run_command(command) {
            Ok(exit_code) => {
                info!("regislex-pal finished");
                std::process::exit(exit_code);
            }
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        }
    } else {
        println!("Platform: {}", get_platform());
    }
    info!("regislex-pal finished");
}

fn run_command(command: Command) -> Result<i32, PalError> {
    match command {
        Command::Info(args) => run_info(args),
        Command::Ls(args) => run_ls(args),
        Command::Mkdir(args) => {
            regislex_fs::mkdir(&args.dir, args.parents)?;
            Ok(0)
        }
        Command::Rm(args) => run_rm(args),
        Command::Cp(args) => {
            let copied = regislex_fs::copy_file(&args.from, &args.to)?;
            debug!(bytes = copied, "copy complete");
            Ok(0)
        }
        Command::Mv(args) => {
            regislex_fs::rename(&args.from, &args.to)?;
            Ok(0)
        }
        Command::Now(args) => run_now(args),
        Command::Random(args) => run_random(args),
        Command::Probe(args) => run_probe(args),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, PalError> {
    serde_json::to_string_pretty(value).map_err(|e| PalError::failed("serialize_json", e.to_string()))
}

fn format_bytes(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) => format!("{:.1} MiB", b as f64 / (1024.0 * 1024.0)),
        None => "unknown".to_string(),
    }
}

fn run_info(args: InfoArgs) -> Result<i32, PalError> {
    let info = regislex_sys::system_info();
    if args.json {
        println!("{}", to_json(&info)?);
        return Ok(0);
    }

    println!("Platform:         {}", info.platform);
    println!("PID:              {}", info.pid);
    println!(
        "Hostname:         {}",
        info.hostname.as_deref().unwrap_or("unknown")
    );
    println!("CPUs:             {}", info.cpu_count);
    println!("Total memory:     {}", format_bytes(info.total_memory));
    println!("Available memory: {}", format_bytes(info.available_memory));
    println!("Timestamp:        {}", info.timestamp);
    for warning in &info.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(0)
}

#[derive(Serialize)]
struct DirListing {
    schema_id: &'static str,
    path: String,
    entries: Vec<DirEntry>,
}

fn run_ls(args: LsArgs) -> Result<i32, PalError> {
    let iter = DirIter::open(&args.dir)?;
    let mut entries = iter.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    if args.json {
        let listing = DirListing {
            schema_id: DIR_LISTING_V1,
            path: args.dir,
            entries,
        };
        println!("{}", to_json(&listing)?);
        return Ok(0);
    }

    for entry in &entries {
        let kind = if entry.is_directory { 'd' } else { '-' };
        let modified = regislex_time::format_iso8601(entry.modified_time, TimeZone::Utc)
            .unwrap_or_else(|_| "-".to_string());
        println!("{kind} {:>12} {modified} {}", entry.size, entry.name);
    }
    Ok(0)
}

fn run_rm(args: RmArgs) -> Result<i32, PalError> {
    // A link is removed itself, whatever it points at
    if regislex_fs::is_symlink(&args.path) {
        regislex_fs::remove_file(&args.path)?;
    } else if regislex_fs::is_directory(&args.path) {
        regislex_fs::rmdir(&args.path, args.recursive)?;
    } else if regislex_fs::exists(&args.path) {
        regislex_fs::remove_file(&args.path)?;
    } else {
        return Err(PalError::not_found("rm"));
    }
    Ok(0)
}

fn run_now(args: NowArgs) -> Result<i32, PalError> {
    let zone = if args.local {
        TimeZone::Local
    } else {
        TimeZone::Utc
    };

    match args.parse {
        Some(text) => println!("{}", regislex_time::parse_iso8601(&text, zone)?),
        None => println!(
            "{}",
            regislex_time::format_iso8601(regislex_time::now_secs(), zone)?
        ),
    }
    Ok(0)
}

fn run_random(args: RandomArgs) -> Result<i32, PalError> {
    if args.bytes == 0 || args.bytes > 1024 * 1024 {
        return Err(PalError::invalid_argument("--bytes must be between 1 and 1048576"));
    }
    let mut buf = vec![0u8; args.bytes];
    regislex_sys::random_bytes(&mut buf)?;
    let hex: String = buf.iter().map(|b| format!("{b:02x}")).collect();
    println!("{hex}");
    Ok(0)
}

fn run_probe(args: ProbeArgs) -> Result<i32, PalError> {
    if args.timeout_ms == 0 {
        return Err(PalError::invalid_argument("--timeout-ms must be > 0"));
    }
    let family = if args.ipv6 {
        AddressFamily::Ipv6
    } else {
        AddressFamily::Ipv4
    };

    let ctx = NetContext::init()?;
    let mut socket = Socket::create_with_family(&ctx, SocketType::Tcp, family)?;
    socket.connect_timeout(
        &args.host,
        args.port,
        Duration::from_millis(args.timeout_ms),
    )?;
    let peer = socket.peer_addr()?;
    println!("open {}:{} ({peer})", args.host, args.port);

    socket.close();
    ctx.cleanup();
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn format_bytes_renders_mib() {
        assert_eq!(format_bytes(Some(3 * 1024 * 1024)), "3.0 MiB");
        assert_eq!(format_bytes(None), "unknown");
    }
}
