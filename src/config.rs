use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::orchestrator::DEFAULT_DEBOUNCE;
use crate::services::DEFAULT_SIMILARITY_THRESHOLD;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 没有已打开的答题页面时导航到此 URL
    pub target_url: String,
    /// 答题码（6 位以上数字）
    pub quiz_code: Option<String>,
    /// 本地题库 JSON 文件，设置后不走网络
    pub answers_file: Option<String>,
    /// 离线模式：对保存下来的页面跑一次标记
    pub page_snapshot: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 题库 API 配置 ---
    pub answers_api_base_url: String,
    pub request_timeout_secs: u64,
    // --- 匹配配置 ---
    /// 模糊匹配阈值
    pub similarity_threshold: f64,
    /// 页面变化后的防抖延迟（毫秒）
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_url: "https://quizizz.com/join".to_string(),
            quiz_code: None,
            answers_file: None,
            page_snapshot: None,
            verbose_logging: false,
            answers_api_base_url: "https://api.cheatnetwork.eu".to_string(),
            request_timeout_secs: 15,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            browser_debug_port: parse_var("BROWSER_DEBUG_PORT", default.browser_debug_port)?,
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            quiz_code: non_empty_var("QUIZ_CODE"),
            answers_file: non_empty_var("ANSWERS_FILE"),
            page_snapshot: non_empty_var("PAGE_SNAPSHOT"),
            verbose_logging: parse_var("VERBOSE_LOGGING", default.verbose_logging)?,
            answers_api_base_url: std::env::var("ANSWERS_API_BASE_URL")
                .unwrap_or(default.answers_api_base_url),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", default.request_timeout_secs)?,
            similarity_threshold: parse_var("SIMILARITY_THRESHOLD", default.similarity_threshold)?,
            debounce_ms: parse_var("DEBOUNCE_MS", default.debounce_ms)?,
        })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => parse_value(name, &value),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: name.to_string(),
            value: value.to_string(),
            expected_type: std::any::type_name::<T>().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.similarity_threshold, 0.6);
        assert_eq!(config.debounce(), Duration::from_millis(200));
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_defaults_follow_service_constants() {
        let config = Config::default();
        assert_eq!(config.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(config.debounce(), DEFAULT_DEBOUNCE);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u64>("DEBOUNCE_MS", " 350 ").unwrap(), 350);
        assert_eq!(parse_value::<f64>("SIMILARITY_THRESHOLD", "0.75").unwrap(), 0.75);
        assert!(parse_value::<bool>("VERBOSE_LOGGING", "true").unwrap());

        let err = parse_value::<u16>("BROWSER_DEBUG_PORT", "abc").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarParseFailed { ref var_name, .. } if var_name == "BROWSER_DEBUG_PORT"));
    }
}
