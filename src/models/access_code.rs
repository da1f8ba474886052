use std::fmt;

use crate::error::LoadError;

/// 最少位数
pub const MIN_CODE_DIGITS: usize = 6;

/// 答题码
///
/// 只保留数字，至少 6 位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCode(String);

impl AccessCode {
    pub fn parse(input: &str) -> Result<Self, LoadError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() >= MIN_CODE_DIGITS {
            Ok(Self(digits))
        } else {
            Err(LoadError::InvalidCode(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
