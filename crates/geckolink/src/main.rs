use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use geckolink_core::{ConnectionConfig, GeckoError, RpcOpcodeSelection, Session};
use geckolink_utils::{info, init_logging, LogFormat, LogLevel, LoggingConfig};

mod format;

use format::{hex_dump, parse_hex_bytes, parse_u32, parse_value, ValueType};

/// Command-line client for the Gecko remote-debugging protocol on the Wii U.
#[derive(Parser, Debug)]
#[command(name = "geckolink")]
#[command(version)]
#[command(about = "Read, write and call into a Wii U running the TCP Gecko handler", long_about = None)]
struct Cli
{
    /// Console address (overrides GECKOLINK_HOST)
    #[arg(long, global = true)]
    host: Option<String>,
    /// Handler port (overrides GECKOLINK_PORT)
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Connect and I/O timeout in milliseconds, 0 disables (overrides GECKOLINK_TIMEOUT_MS)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// Cache resolved symbols for the session
    #[arg(long, global = true)]
    symbol_cache: bool,
    /// RPC opcode rule: split or legacy-big (overrides GECKOLINK_RPC_OPCODES)
    #[arg(long, global = true)]
    rpc_opcodes: Option<RpcOpcodeSelection>,
    /// Log level: error, warn, info, debug or trace (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    /// Log format: pretty or json (overrides GECKOLINK_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Show the handler's status
    Status,
    /// Show which console the handler runs on
    Version,
    /// Show the console's OS version
    OsVersion,
    /// Read a single value
    Peek
    {
        /// Address (hex format: 0x10000000 or decimal)
        #[arg(value_parser = parse_u32)]
        address: u32,
        /// Value type
        #[arg(short = 't', long = "type", value_enum, default_value_t = ValueType::U32)]
        ty: ValueType,
    },
    /// Write a single value
    Poke
    {
        /// Address (hex format: 0x10000000 or decimal)
        #[arg(value_parser = parse_u32)]
        address: u32,
        /// Value to write, parsed according to --type
        value: String,
        /// Value type
        #[arg(short = 't', long = "type", value_enum, default_value_t = ValueType::U32)]
        ty: ValueType,
    },
    /// Dump a block of memory
    Read
    {
        /// Address (hex format: 0x10000000 or decimal)
        #[arg(value_parser = parse_u32)]
        address: u32,
        /// Number of bytes to read (default: 256)
        #[arg(short, long, value_parser = parse_u32, default_value = "256")]
        length: u32,
    },
    /// Write bytes given as hex
    Write
    {
        /// Address (hex format: 0x10000000 or decimal)
        #[arg(value_parser = parse_u32)]
        address: u32,
        /// Bytes as hex, e.g. deadbeef
        data: String,
    },
    /// Dump kernel memory, one word at a time
    KernelRead
    {
        /// Address (hex format: 0x10000000 or decimal)
        #[arg(value_parser = parse_u32)]
        address: u32,
        /// Number of bytes to read, a multiple of 4 (default: 16)
        #[arg(short, long, value_parser = parse_u32, default_value = "16")]
        length: u32,
    },
    /// Resolve an exported symbol
    Symbol
    {
        /// Module name, e.g. coreinit.rpl
        module: String,
        /// Export name
        name: String,
        /// The export is a pointer to the real address
        #[arg(long)]
        pointer: bool,
        /// Resolve as a data export
        #[arg(long)]
        data: bool,
    },
    /// Call an exported function
    Call
    {
        /// Module name, e.g. coreinit.rpl
        module: String,
        /// Export name
        name: String,
        /// Up to 16 integer arguments (hex or decimal)
        #[arg(value_parser = parse_u32)]
        args: Vec<u32>,
    },
    /// Search memory for a 32-bit value
    Search
    {
        /// Start address (hex format: 0x10000000 or decimal)
        #[arg(value_parser = parse_u32)]
        address: u32,
        /// Value to look for
        #[arg(value_parser = parse_u32)]
        value: u32,
        /// Number of bytes to search
        #[arg(value_parser = parse_u32)]
        length: u32,
    },
}

fn main()
{
    let cli = Cli::parse();

    // Flags take precedence over RUST_LOG and GECKOLINK_LOG_FORMAT.
    let _guard = match LoggingConfig::from_env().and_then(|config| {
        let config = config.with_level(cli.log_level);
        let config = match cli.log_format {
            Some(format) => config.with_format(format),
            None => config,
        };
        init_logging(&config)
    }) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn connection_config(cli: &Cli) -> Result<ConnectionConfig, Box<dyn std::error::Error>>
{
    let mut config = ConnectionConfig::from_env()?;
    if let Some(host) = &cli.host {
        config = config.with_host(host.clone());
    }
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    if let Some(millis) = cli.timeout_ms {
        config = config.with_timeout((millis > 0).then(|| Duration::from_millis(millis)));
    }
    if cli.symbol_cache {
        config.session.symbol_cache = true;
    }
    if let Some(selection) = cli.rpc_opcodes {
        config.session.rpc_opcodes = selection;
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>>
{
    let config = connection_config(&cli)?;
    let mut session = Session::connect_with(&config)?;

    let outcome = run_command(&mut session, cli.command);
    // Report the command's error first; a failed close only matters on success.
    let closed = session.close();
    outcome?;
    closed?;
    Ok(())
}

fn run_command(session: &mut Session, command: Commands) -> Result<(), Box<dyn std::error::Error>>
{
    match command {
        Commands::Status => {
            println!("{}", session.gecko_status()?);
        }
        Commands::Version => {
            println!("{}", session.version()?);
        }
        Commands::OsVersion => {
            println!("{}", session.os_version()?);
        }
        Commands::Peek { address, ty } => {
            info!("Peeking {:?} at 0x{:08x}", ty, address);
            match ty {
                ValueType::U8 => println!("0x{:02x}", session.peek_u8(address)?),
                ValueType::U16 => println!("0x{:04x}", session.peek_u16(address)?),
                ValueType::U32 => println!("0x{:08x}", session.peek_u32(address)?),
                ValueType::U64 => println!("0x{:016x}", session.peek_u64(address)?),
                ValueType::F32 => println!("{}", session.peek_f32(address)?),
                ValueType::F64 => println!("{}", session.peek_f64(address)?),
            }
        }
        Commands::Poke { address, value, ty } => {
            let value = parse_value(&value, ty).map_err(GeckoError::InvalidArgument)?;
            info!("Poking {:?} at 0x{:08x}", value, address);
            session.poke(address, value)?;
        }
        Commands::Read { address, length } => {
            let data = session.read_memory(address, length as usize)?;
            print!("{}", hex_dump(address, &data));
        }
        Commands::Write { address, data } => {
            let data = parse_hex_bytes(&data).map_err(GeckoError::InvalidArgument)?;
            info!("Writing {} bytes at 0x{:08x}", data.len(), address);
            session.write_memory(address, &data)?;
            println!("Wrote {} bytes", data.len());
        }
        Commands::KernelRead { address, length } => {
            let data = session.read_kernel_memory(address, length as usize)?;
            print!("{}", hex_dump(address, &data));
        }
        Commands::Symbol {
            module,
            name,
            pointer,
            data,
        } => {
            let symbol = session.get_symbol(&module, &name, pointer, data)?;
            println!("{symbol}");
        }
        Commands::Call { module, name, args } => {
            info!("Calling {}!{} with {:?}", module, name, args);
            let value = session.get_and_call_symbol(&module, &name, &args)?;
            println!("0x{value:016x}");
        }
        Commands::Search { address, value, length } => {
            match session.memory_search(address, value, length)? {
                0 => println!("Not found"),
                found => println!("0x{found:08x}"),
            }
        }
    }
    Ok(())
}
