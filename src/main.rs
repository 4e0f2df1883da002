//! # excel-hash CLI
//!
//! Command-line interface for the Excel hash mapper.
//!
//! ## Usage
//! ```bash
//! excel-hash run data.xlsx --sheet Sheet1 --columns Name,Email --algorithm sha256
//! excel-hash sheets data.xlsx
//! ```

mod cli;

use excel_hash_mapper::Result;

fn main() -> Result<()> {
    cli::run()
}
