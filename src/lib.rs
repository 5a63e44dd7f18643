//! # imgpress
//!
//! Size-constrained image compression. Give it an image, an output format,
//! a quality level, optional dimension bounds, and optionally a target file
//! size; it produces one re-encoded artifact that fits — or the closest the
//! format can get within its retry budget.
//!
//! # Architecture: One Pipeline, Swappable Codecs
//!
//! A compression request flows through a fixed sequence:
//!
//! ```text
//! 1. Probe     identify source dimensions
//! 2. Plan      fit-inside dimension math (pure, never upscales)
//! 3. Profile   (format, quality) → codec parameters
//! 4. Encode    resize + encode → one artifact, measured in bytes
//! 5. Search    repeat 3-4 at decreasing quality until the artifact fits
//!              the target size or the attempt budget runs out
//! ```
//!
//! Steps 1 and 4 go through the [`imaging::ImageBackend`] trait, so the
//! solver logic is exercised in tests with a recording mock instead of real
//! codecs, and the dimension/profile/search logic stays pure.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Backend trait, fit-inside planner, encode profiles, pure-Rust backend |
//! | [`solver`] | Request validation and the iterative quality search |
//! | [`lifecycle`] | Workspace directories, unique artifact paths, guaranteed cleanup |
//! | [`config`] | `imgpress.toml` loading, validation, thread-count resolution |
//! | [`output`] | CLI report formatting — pure format functions + print wrappers |
//!
//! # Design Decisions
//!
//! ## Best Effort Is a Result, Not an Error
//!
//! A target size that cannot be reached even at the quality floor still
//! yields a usable artifact. By default the last attempt is delivered with
//! `target_met = false` so callers can decide what to do; setting
//! `solver.deliver_oversized = false` turns exhaustion into a hard error
//! instead. Either way the outcome is surfaced, never silently swallowed.
//!
//! ## Quality Search Stops at the Floor
//!
//! Stepping quality below the floor would re-encode an identical artifact,
//! so the search terminates as soon as the next step would repeat the
//! current quality — the remaining attempt budget is not burned on
//! byte-identical retries.
//!
//! ## Pure-Rust Decode, Mixed Encode
//!
//! Decoding and JPEG/PNG encoding use the `image` crate. Lossy WebP is the
//! one place a quality knob requires libwebp (the pure-Rust WebP encoder is
//! lossless-only), pulled in through the `webp` crate.

pub mod config;
pub mod imaging;
pub mod lifecycle;
pub mod output;
pub mod solver;
