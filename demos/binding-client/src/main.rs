use floe_gather::{discover_host_candidates, discover_server_candidates, GatherConfig};
use floe_protocol::RandomSource;

/// Runs both discovery passes and prints every candidate found. Set
/// `RUST_LOG=info` to watch the per-attribute dispatch.
fn main() {
    env_logger::init();

    println!("## Host candidates ##");
    for candidate in discover_host_candidates() {
        println!("* {candidate}");
    }

    println!();
    println!("## Server-reflexive candidates ##");
    let mut rng = RandomSource::from_entropy();
    for candidate in discover_server_candidates(&GatherConfig::default(), &mut rng) {
        println!("* {candidate}");
    }
}
