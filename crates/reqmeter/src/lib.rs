//! Top-level facade crate for reqmeter.
//!
//! Re-exports the metrics core and the HTTP layer so users can depend on a single crate.

pub mod core {
    pub use reqmeter_core::*;
}

pub mod http {
    pub use reqmeter_http::*;
}
