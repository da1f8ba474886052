//! 文本规范化 - 业务能力层
//!
//! 把页面文本和题库文本统一成可比较的形式，比较前两边必须走同一个函数

use unicode_normalization::UnicodeNormalization;

/// 规范化文本
///
/// 顺序：小写 → NFC → 合并空白 → 去标点（保留字母数字、下划线、空白）→ 合并空白 → NFC。
/// 去标点后两侧的字符可能重新组合（例如韩文字母），所以最后再做一次 NFC，
/// 保证 `normalize(normalize(x)) == normalize(x)`。
pub fn normalize(text: &str) -> String {
    let composed: String = text.to_lowercase().nfc().collect();
    let collapsed = collapse_whitespace(&composed);

    let stripped: String = collapsed
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();

    collapse_whitespace(&stripped).nfc().collect()
}

/// 规范化可能缺失的文本，缺失时返回空串
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
