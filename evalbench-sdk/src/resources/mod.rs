//! Resource clients for the backend's endpoints.

pub mod evaluate;
pub mod test_cases;

pub use evaluate::EvaluationClient;
pub use test_cases::TestCaseClient;
