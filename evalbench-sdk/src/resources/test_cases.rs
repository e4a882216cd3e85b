//! The `test_case/` persistence endpoints.

use crate::client::HttpClient;
use crate::error::SdkResult;
use evalbench_core::wire::TestCaseRecord;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Serialize)]
struct SaveTestCaseBody<'a> {
    test_case: &'a TestCaseRecord,
    user: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteTestCaseBody {
    test_case_id: i64,
}

/// Client for saving and deleting persisted test cases.
#[derive(Debug, Clone)]
pub struct TestCaseClient {
    http: Arc<HttpClient>,
}

impl TestCaseClient {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// `PUT test_case/` — upsert a test case row and return the saved row,
    /// with `id` and `user_id` assigned by the backend.
    #[instrument(skip_all, fields(name = %record.name))]
    pub async fn save(&self, record: &TestCaseRecord, user: &str) -> SdkResult<TestCaseRecord> {
        let body = SaveTestCaseBody {
            test_case: record,
            user,
        };
        self.http.put("test_case/", &body).await
    }

    /// `DELETE test_case/` — delete a saved test case by id.
    #[instrument(skip(self))]
    pub async fn delete(&self, test_case_id: i64) -> SdkResult<()> {
        self.http
            .delete_with_body("test_case/", &DeleteTestCaseBody { test_case_id })
            .await
    }
}
