/// 题库 API 客户端
///
/// 负责按答题码拉取答案数据，失败时按类别返回 [`LoadError`]，不做重试
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::LoadError;
use crate::models::{parse_answers_document, AccessCode, AnswerDataset};

/// 题库 API 客户端
#[derive(Debug, Clone)]
pub struct AnswerClient {
    client: Client,
    base_url: String,
}

impl AnswerClient {
    /// 按配置创建客户端
    pub fn new(config: &Config) -> Result<Self, LoadError> {
        Self::with_base_url(&config.answers_api_base_url, config.request_timeout())
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn answers_url(&self, code: &AccessCode) -> String {
        format!("{}/quizizz/{}/answers", self.base_url, code)
    }

    /// 拉取题库
    ///
    /// # 返回
    /// - 200 且包含 `answers` 数组：题库
    /// - 其他状态码：`Server`
    /// - 超时：`Timeout`
    /// - 连接失败等：`Network`
    /// - 返回内容不是预期格式：`InvalidFormat`
    pub async fn fetch(&self, code: &AccessCode) -> Result<AnswerDataset, LoadError> {
        let url = self.answers_url(code);
        info!("📥 正在加载答题码 {} 的答案...", code);
        debug!("请求 {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(LoadError::Server(status.as_u16()));
        }

        let body: JsonValue = response.json().await?;
        let dataset = parse_answers_document(&body)?;
        info!("✓ 加载了 {} 道题目", dataset.len());
        Ok(dataset)
    }
}
