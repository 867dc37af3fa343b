//! Static lookup tables shared by both translation directions.
//!
//! - `duration` - note values ⇄ notation duration tokens ⇄ stream duration codes
//! - `pitch` - letter + accidental ⇄ pitch words, octave numbers ⇄ mark strings
//!
//! Both tables are immutable data; lookups never allocate shared state.

pub mod duration;
pub mod pitch;
