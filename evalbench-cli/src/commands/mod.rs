//! Command implementations.

pub mod import;
pub mod run;
pub mod show;
pub mod test_cases;

use anyhow::{Context as _, Result};
use evalbench_core::domain::TestCase;
use evalbench_core::wire::{encode_content, parse_content};
use std::path::Path;

/// Load a test case from a persisted-content JSON file. Older format
/// versions are migrated forward on load; the file stem becomes the test
/// case's name.
pub fn load_test_case(path: &Path) -> Result<TestCase> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let test_case = parse_content(None, name, &content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    test_case.validate()?;
    Ok(test_case)
}

/// Write a test case back to disk at the current format version.
pub fn save_test_case(path: &Path, test_case: &TestCase) -> Result<()> {
    let content = encode_content(test_case)?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalbench_core::domain::{EvaluationType, Responses};

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groundedness.json");

        let mut test_case = TestCase::empty(EvaluationType::Direct);
        test_case.name = "groundedness".to_string();
        test_case.instances[0].responses = Responses::Direct {
            response: "an answer".to_string(),
        };
        save_test_case(&path, &test_case).unwrap();

        // The file stem becomes the name on load.
        let loaded = load_test_case(&path).unwrap();
        assert_eq!(loaded, test_case);
    }

    #[test]
    fn test_load_rejects_malformed_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_test_case(&path).is_err());
    }

    #[test]
    fn test_load_missing_file_names_the_path() {
        let error = load_test_case(Path::new("/nonexistent/case.json")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/case.json"));
    }
}
