//! String Buffer Example
//!
//! Allocates a string on the console, reads it back and frees it again.
//!
//! ## What this example does:
//!
//! 1. Connects to the TCP Gecko handler
//! 2. Prints the console type and OS version
//! 3. Creates a NUL-terminated string through `OSAllocFromSystem` + `memset`
//! 4. Reads the string back through the chunked read path
//! 5. Frees the allocation
//!
//! ## Usage:
//!
//! ```bash
//! cargo run --example string_buffer <console-ip> [text]
//! ```

use std::process;

use geckolink_core::{RemoteBuffer, Session, DEFAULT_PORT};
use geckolink_utils::{init_logging, LoggingConfig};

fn main()
{
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <console-ip> [text]", args[0]);
        eprintln!("Example: {} 192.168.1.20 \"Hello from geckolink\"", args[0]);
        process::exit(1);
    }
    let host = &args[1];
    let text = args.get(2).map_or("Hello from geckolink", String::as_str);

    let _guard = match LoggingConfig::from_env().and_then(|config| init_logging(&config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(host, text) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(host: &str, text: &str) -> geckolink_core::Result<()>
{
    let mut session = Session::connect(host, DEFAULT_PORT)?;
    println!("Console: {}", session.version()?);
    println!("OS version: {}", session.os_version()?);

    let Some(buffer) = session.core_init().create_string(text, true)? else {
        println!("The system allocator is out of memory");
        return session.close();
    };
    println!("Allocated {} bytes at {}", buffer.size(), buffer.address());

    let mut check = RemoteBuffer::new(buffer.address(), buffer.size());
    check.update(&mut session)?;
    let end = check.as_bytes().iter().position(|b| *b == 0).unwrap_or(check.size());
    println!("Read back: {:?}", String::from_utf8_lossy(&check.as_bytes()[..end]));

    buffer.free(&mut session)?;
    session.close()
}
