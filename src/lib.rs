//! # stemserve
//!
//! Thin web front end and CLI glue around external audio source-separation
//! tools. An uploaded track goes in, isolated stems (vocals, drums, bass,
//! other) come back; the separation itself is delegated to Demucs or Spleeter
//! run as a blocking subprocess.

pub mod cleanup;
pub mod error;
pub mod paths;
pub mod separator;
pub mod types;
pub mod web;

pub use crate::{
    error::{Result, StemError},
    separator::{collect_stems, Backend, DemucsSeparator, Separator, SpleeterSeparator},
    types::{StemSet, Token, STEM_NAMES},
};
