//! # Stegapack Core API
//!
//! Hides arbitrary payloads (files or whole directories) inside carrier
//! images and recovers them bit-exactly, aimed at transports like messenger
//! document attachments. Two codecs are available:
//!
//! - **append** keeps every cover byte intact and rides the payload behind
//!   the image's own bytes
//! - **dct** modulates mid-frequency luminance DCT coefficients on an 8x8
//!   block grid and writes a fresh JPEG
//!
//! Payloads are adaptively compressed (deflate raced against a dictionary
//! coder), optionally AES-256-GCM encrypted, framed behind an ASCII marker
//! with a JSON metadata record, and verified against a SHA-256 digest of
//! the plaintext on the way out.
//!
//! # Usage Examples
//!
//! ## Hide a file inside an image
//!
//! ```no_run
//! use stegapack_core::Mode;
//!
//! stegapack_core::api::embed::prepare()
//!     .with_mode(Mode::Append)
//!     .with_cover("vacation.jpg")
//!     .with_payload("tax-returns.pdf")
//!     .with_encryption("SuperSecret42")
//!     .with_output("vacation-with-extras.jpg")
//!     .execute()
//!     .expect("Failed to hide file in image");
//! ```
//!
//! ## Recover a payload from a stego container
//!
//! ```no_run
//! stegapack_core::api::extract::prepare()
//!     .with_stego("vacation-with-extras.jpg")
//!     .with_output_dir("recovered/")
//!     .using_password("SuperSecret42")
//!     .execute()
//!     .expect("Failed to recover payload");
//! ```

pub mod api;
pub mod bench;
pub mod codec;
pub mod commands;
pub mod compress;
pub mod crypto;
pub mod error;
pub mod frame;
pub mod media;
pub mod metrics;
pub mod payload;
pub mod result;

pub use codec::dct::ChannelPreset;
pub use codec::Mode;
pub use commands::{
    embed, extract, EmbedOptions, EmbedReport, EmbedRequest, ExtractReport, ExtractRequest,
};
pub use error::{ErrorKind, StegaError};
pub use frame::{Metadata, MARKER, MARKER_TEXT};
pub use payload::SourceKind;
pub use result::Result;
