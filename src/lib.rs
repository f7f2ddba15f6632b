//! mcload: a multi-session, rate-paced multicast load generator.
//!
//! A single periodic timer tick drives several independently-rated packet
//! streams. Each session carries its own rational packets-per-tick rate,
//! payload size and TTL; a wall-clock-aligned chop cycle can silence all
//! sessions in synchronized 5-second windows; per-second statistics are
//! reported as the run progresses.

pub mod config;
pub mod dispatch;
pub mod logging;
pub mod output;
pub mod rate;
pub mod session;
pub mod stats;
pub mod transport;
pub mod window;
pub mod wire;
