//! # dekdek
//!
//! The binary is intentionally thin: the command line lives in `src/cli/`, the HTTP
//! layer in `src/http/` (exposed through the `dekdek` library target so tests can
//! mount the router), and all content logic in the `dekdekapp` crate.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/cli/)                                       │
//! │  - clap parsing, config loading, logging, tokio runtime     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  HTTP Layer (src/http/)                                     │
//! │  - axum router, envelopes, admin sessions                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  dekdekapp (crates/dekdekapp)                               │
//! │  - API facade, commands, record store, SQLite               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
