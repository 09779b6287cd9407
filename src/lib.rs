//! Map MIDI-style note numbers to pitch ratios and frequencies using [Scala](http://www.huygens-fokker.org/scala/) tuning files.
//!
//! # Examples
//!
//! ```
//! # use assert_approx_eq::assert_approx_eq;
//! use scala_notemap::note_map::{MapperConfig, NoteMap};
//! use scala_notemap::scala::ScaleDegrees;
//!
//! let degrees: ScaleDegrees = "Harmonics 8-12\n4\n9/8\n5/4\n11/8\n3/2\n".parse().unwrap();
//! let note_map = NoteMap::build(&degrees, MapperConfig::default());
//!
//! assert_approx_eq!(note_map.ratio_of(60), 1.0);
//! assert_approx_eq!(note_map.ratio_of(62), 5.0 / 4.0);
//! assert_approx_eq!(note_map.ratio_of(64), 3.0 / 2.0);
//! assert_approx_eq!(note_map.ratio_of(65), 3.0 / 2.0 * 9.0 / 8.0);
//! ```

pub mod math;
pub mod midi;
pub mod note_map;
pub mod scala;
