#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]

//! A crate for PNG decoding and encoding.
//!
//! Only the simplest PNG images are handled: 8 bits per sample, greyscale or
//! RGB, not interlaced. Pixels live in a [`PixelBuffer`], and there's
//! conversions between greyscale and RGB buffers.
//!
//! ```
//! # #[cfg(feature = "miniz_oxide")] {
//! use plainpng::{png::*, *};
//! let buffer = PixelBuffer::from_samples(2, 1, Channels::Rgb, vec![255, 0, 0, 0, 0, 255])?;
//! let bytes = encode_png(&buffer);
//! assert_eq!(decode_png(&bytes)?, buffer);
//! # }
//! # Ok::<(), plainpng::PngError>(())
//! ```

extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

pub mod image;
pub use image::*;

pub mod color_changes;
pub use color_changes::*;

pub mod png;
