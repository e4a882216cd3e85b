//! Snake_case wire shapes and codecs for the evaluation backend.
//!
//! The backend speaks a flat snake_case dialect that differs structurally
//! from the domain model (context as a name→value map, a single
//! `response`/`responses` key selected by evaluation type, recursive
//! positional-bias nesting). Conversions here are explicit and total:
//! well-typed input never fails to decode, absent optional fields become
//! defaults.

pub mod criteria;
pub mod evaluate;
pub mod instance;
pub mod result;
pub mod test_case;

pub use criteria::*;
pub use evaluate::*;
pub use instance::*;
pub use result::*;
pub use test_case::*;
