//! # img-scrub CLI
//!
//! Command-line interface for the image sanitizer.
//!
//! ## Usage
//! ```bash
//! img-scrub sanitize ~/Photos --dest ~/Sanitized
//! img-scrub report ~/Photos --output json
//! ```

mod cli;

use image_sanitizer::Result;

fn main() -> Result<()> {
    cli::run()
}
