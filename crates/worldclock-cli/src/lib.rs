//! worldclock-cli
//! ==============
//!
//! Command-line front end for `worldclock-core`.
//!
//! This crate primarily provides a binary (`worldclock`). The small library
//! target only exists so docs.rs renders this overview; for programmatic
//! access use [`worldclock-core`] directly.
//!
//! Quick start
//! -----------
//!
//! ```text
//! worldclock clocks
//! worldclock search berlin
//! worldclock add "new york"
//! worldclock delete "New York"
//! worldclock timezone Asia/Tokyo
//! ```
//!
//! The city search uses the GeoNames `cities15000` dump, downloaded once into
//! the user cache directory. `worldclock refresh` downloads it again.
#![cfg_attr(docsrs, feature(doc_cfg))]

// This library target intentionally exposes no API; the binary is the primary
// deliverable.
