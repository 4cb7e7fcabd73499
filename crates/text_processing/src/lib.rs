//! Text processing for the voice coach bridge
//!
//! Turns a single user utterance into a structured workout record:
//! - **Activity**: ordered keyword table, first hit wins
//! - **Duration**: first integer followed by a minute unit
//! - **Intensity**: easy / medium / hard keyword sets, medium when absent
//!
//! # Example
//!
//! ```
//! use voice_coach_text_processing::Extractor;
//!
//! let record = Extractor::new().extract("I ran for 30 minutes").unwrap();
//! assert_eq!(record.activity.as_str(), "running");
//! assert_eq!(record.duration, 30);
//! ```

pub mod extraction;

pub use extraction::{extract, Extractor};
