//! # Wavefleet Client
//!
//! An async Rust client library for the Sofar Wavefleet API, which serves
//! telemetry from Spotter ocean buoys.
//!
//! ## Features
//!
//! - Token lookup from an explicit value, `WF_API_TOKEN` or `~/sofar_api.env`
//! - Typed records for waves, wind, track, spectra and sensor data
//! - Transparent paging of long historical queries
//! - Concurrent refresh of every Spotter visible to a token
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wavefleet_api_client::rest::WavefleetRestClient;
//! use wavefleet_api_client::types::DateRange;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WavefleetRestClient::new()?;
//!     let range = DateRange::new("2023-05-02", "2023-05-10")?;
//!     let data = client.get_wave_data(&range, Some("SPOT-30344R")).await?;
//!     println!("{} wave records", data.waves.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod rest;
pub mod spotter;
pub mod types;

// Re-export commonly used types at crate root
pub use error::WavefleetError;
pub use rest::{WavefleetClient, WavefleetRestClient};
pub use spotter::{Spotter, get_and_update_spotters};
pub use types::DateRange;

/// Result type alias using WavefleetError
pub type Result<T> = std::result::Result<T, WavefleetError>;
