//! Local JSON artifact of the rendered task-definition document.
//!
//! The positional front-end persists the document it is about to
//! submit, so the exact registered revision can be inspected or
//! re-submitted by hand. The file is written in the wire shape.

use std::io;
use std::path::{Path, PathBuf};

use ecsrun_core::taskdef::TaskDefinitionRequest;

/// Default artifact path for a task, relative to the working directory.
pub fn document_path(task_name: &str) -> PathBuf {
    PathBuf::from(format!("{task_name}-task-definition.json"))
}

/// Write the document as pretty-printed JSON.
pub fn write_document(request: &TaskDefinitionRequest, path: &Path) -> io::Result<()> {
    let rendered = serde_json::to_vec_pretty(request)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, rendered)
}

#[cfg(test)]
mod tests {
    use ecsrun_core::taskdef::{build_definition, split_tokens, TaskOverrides};

    use super::*;

    #[test]
    fn document_path_is_named_after_the_task() {
        assert_eq!(
            document_path("db-migrations"),
            PathBuf::from("db-migrations-task-definition.json")
        );
    }

    #[test]
    fn written_document_is_wire_shaped_json() {
        let overrides = TaskOverrides {
            task_name: "db-migrations".to_string(),
            image: "myapp:latest".to_string(),
            entry_point: split_tokens("sh -c"),
            command: split_tokens("bundle exec rake db:migrate"),
            execution_role_arn: Some("arn:aws:iam::123:role/ecsTaskExecutionRole".to_string()),
            environment_files: Vec::new(),
            launch: Default::default(),
            region: "us-east-1".to_string(),
        };
        let request = build_definition(&overrides, None).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(document_path("db-migrations"));
        write_document(&request, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["family"], "db-migrations");
        assert_eq!(value["containerDefinitions"][0]["image"], "myapp:latest");
    }
}
