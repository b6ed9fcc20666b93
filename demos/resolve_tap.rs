//! Resolve addresses over a TAP device
//!
//! This demo creates a TAP interface, gives the kernel side 10.0.0.254/24 and
//! runs the resolver as 10.0.0.1. It resolves the kernel's address plus any
//! addresses given on the command line, then prints the cache.
//!
//! To run this demo:
//!
//! ```sh
//! RUST_LOG=debug cargo run --example resolve_tap -- 10.0.0.7
//! ```
//!
//! Note: Root/sudo privileges are required to create and configure the TAP device.
//! While it runs, `arping -I tap0 10.0.0.1` from the host gets answered.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use toy_arp::{Arp, ArpConfig, MacAddr, TapLink};
use tracing_subscriber::EnvFilter;

mod utils;
use utils::network::configure_interface;

const LOCAL_ADDR: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const LOCAL_MAC: MacAddr = MacAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
const HOST_ADDR: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 254);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut targets = vec![HOST_ADDR];
    for arg in std::env::args().skip(1) {
        targets.push(arg.parse()?);
    }

    let link = TapLink::open("tap0", LOCAL_ADDR, LOCAL_MAC)?;
    configure_interface(link.name(), "10.0.0.254/24")?;

    let arp = Arp::init(Arc::new(link), ArpConfig::default())?;
    println!("Resolver up as {} ({})", arp.local_address(), arp.local_link());

    for target in targets {
        match arp.resolve(target) {
            Some(mac) => println!("{} is at {}", target, mac),
            None => println!("{} did not answer", target),
        }
    }

    println!("\n{}", arp.cache_table());

    // Keep answering requests from the host for a while
    thread::sleep(Duration::from_secs(30));
    Ok(())
}
