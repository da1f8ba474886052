use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
///
/// 只在外层（浏览器连接、题库加载、配置）出现，
/// 匹配与标记流程不会向外抛错
#[derive(Debug)]
pub enum AppError {
    /// 浏览器相关错误
    Browser(BrowserError),
    /// 题库加载错误
    Load(LoadError),
    /// 配置错误
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::Load(e) => write!(f, "题库加载错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Browser(e) => Some(e),
            AppError::Load(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

/// 浏览器相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 连接浏览器失败
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 没有可用的答题页面
    NoQuizPage,
    /// 执行脚本失败
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::ConnectionFailed { port, source } => {
                write!(f, "无法连接到浏览器 (端口: {}): {}", port, source)
            }
            BrowserError::NoQuizPage => write!(f, "没有找到 Quizizz / Wayground 页面"),
            BrowserError::ScriptExecutionFailed { source } => {
                write!(f, "执行脚本失败: {}", source)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::ConnectionFailed { source, .. }
            | BrowserError::ScriptExecutionFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            BrowserError::NoQuizPage => None,
        }
    }
}

/// 题库加载错误
///
/// 失败分类与通知内容一一对应，加载方不做重试
#[derive(Debug, Error)]
pub enum LoadError {
    /// 答题码不合法
    #[error("答题码无效，需要至少 6 位数字: {0:?}")]
    InvalidCode(String),
    /// 网络错误
    #[error("网络错误，请检查连接: {0}")]
    Network(String),
    /// 请求超时
    #[error("请求超时")]
    Timeout,
    /// 服务器返回非 200
    #[error("服务器错误: HTTP {0}")]
    Server(u16),
    /// 返回数据格式无效
    #[error("数据格式无效: {0}")]
    InvalidFormat(String),
    /// 本地题库文件读取失败
    #[error("读取题库文件失败 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LoadError::Timeout
        } else if let Some(status) = err.status() {
            LoadError::Server(status.as_u16())
        } else if err.is_decode() {
            LoadError::InvalidFormat(err.to_string())
        } else {
            LoadError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::InvalidFormat(err.to_string())
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 没有题库来源
    NoAnswerSource,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
            ConfigError::NoAnswerSource => {
                write!(f, "需要设置 QUIZ_CODE、ANSWERS_FILE 或 PAGE_SNAPSHOT 之一")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::Load(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = AppError::from(LoadError::Server(503));
        assert_eq!(err.to_string(), "题库加载错误: 服务器错误: HTTP 503");

        let err = AppError::from(ConfigError::EnvVarParseFailed {
            var_name: "DEBOUNCE_MS".to_string(),
            value: "soon".to_string(),
            expected_type: "u64".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "配置错误: 环境变量 DEBOUNCE_MS 解析失败: 值 'soon' 无法转换为 u64"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
