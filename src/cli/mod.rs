//! # Command-Line Interface
//!
//! Thin host around the evaluation engine for inspecting analyses and
//! running evaluations over a snapshot file.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `analyses` | List registered analysis identifiers |
//! | `steps <id>` | Show the ordered step list for an analysis |
//! | `evaluate <id>` | Evaluate a landmark snapshot against an analysis |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Snapshot Files
//!
//! `evaluate` reads manual placements from a JSON file mapping symbols to
//! points, lines or scalars:
//!
//! ```json
//! {
//!   "N": {"x": 400.0, "y": 150.0},
//!   "S": {"x": 250.0, "y": 160.0}
//! }
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
