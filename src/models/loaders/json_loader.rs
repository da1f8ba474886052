use std::path::Path;

use serde_json::Value as JsonValue;
use tokio::fs;
use tracing::info;

use crate::error::LoadError;
use crate::models::AnswerDataset;

/// 解析题库文档 `{ "answers": [ ... ] }`
pub fn parse_answers_document(document: &JsonValue) -> Result<AnswerDataset, LoadError> {
    let answers = document
        .get("answers")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| LoadError::InvalidFormat("缺少 answers 数组".to_string()))?;

    Ok(AnswerDataset::from_answers(answers))
}

/// 从本地 JSON 文件加载题库
pub async fn load_answers_file(path: &Path) -> Result<AnswerDataset, LoadError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::File {
            path: path.display().to_string(),
            source,
        })?;

    let document: JsonValue = serde_json::from_str(&content)?;
    let dataset = parse_answers_document(&document)?;

    info!(
        "成功从 {} 加载 {} 个题目",
        path.file_name().unwrap_or_default().to_string_lossy(),
        dataset.len()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_answers_document() {
        let doc = json!({
            "answers": [
                {"question": "What is 2+2?", "options": [{"text": "3"}, {"text": "4"}], "answer": [1]}
            ]
        });
        let dataset = parse_answers_document(&doc).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].correct_option_texts(), Some(vec!["4"]));
    }

    #[test]
    fn test_parse_answers_document_invalid() {
        assert!(matches!(
            parse_answers_document(&json!({"data": []})),
            Err(LoadError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_answers_document(&json!({"answers": "nope"})),
            Err(LoadError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_load_answers_file() {
        let path = std::env::temp_dir().join(format!("quiz_answers_{}.json", std::process::id()));
        tokio::fs::write(
            &path,
            r#"{"answers": [{"question": "Q", "options": [{"text": "a"}], "answer": [0]}]}"#,
        )
        .await
        .unwrap();

        let dataset = load_answers_file(&path).await.unwrap();
        assert_eq!(dataset.len(), 1);
        tokio::fs::remove_file(&path).await.unwrap();

        assert!(matches!(
            load_answers_file(&path).await,
            Err(LoadError::File { .. })
        ));
    }
}
