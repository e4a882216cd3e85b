pub mod criteria;
pub mod evaluator;
pub mod ids;
pub mod instance;
pub mod result;
pub mod test_case;

pub use criteria::*;
pub use evaluator::*;
pub use ids::*;
pub use instance::*;
pub use result::*;
pub use test_case::*;
