//! ICE-style candidate gathering over non-blocking UDPv4.
//!
//! This crate is the I/O half of the pair: it drives DNS resolution,
//! socket creation, a fan-out of STUN Binding requests, and a
//! readiness-multiplexed response harvest on top of the
//! [`floe_protocol`] codec. The core is single-threaded and synchronous;
//! the readiness wait in [`socket::ReadySet`] is the only place execution
//! can suspend.
//!
//! ```no_run
//! use floe_gather::{discover_host_candidates, discover_server_candidates, GatherConfig};
//! use floe_protocol::RandomSource;
//!
//! let hosts = discover_host_candidates();
//!
//! let mut rng = RandomSource::from_entropy();
//! let reflexive = discover_server_candidates(&GatherConfig::default(), &mut rng);
//! for candidate in hosts.iter().chain(&reflexive) {
//!     println!("{candidate}");
//! }
//! ```

pub mod dns;
pub mod ice;
pub mod socket;

pub use ice::{
    discover_host_candidates, discover_server_candidates, GatherConfig, DEFAULT_STUN_SERVERS,
    STUN_PORT,
};
pub use socket::{ReadySet, UdpChannel};
