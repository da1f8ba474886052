//! 相似度计算 - 业务能力层
//!
//! 基于编辑距离，输入应当是已经规范化的文本

/// 两个字符串之间的编辑距离（插入、删除、替换，代价均为 1）
///
/// 按 Unicode 标量值计数
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }

    dp[m][n]
}

/// 相似度，范围 [0, 1]
///
/// - 两边都为空：1
/// - 只有一边为空：0
/// - 否则 `1 - 距离 / 较长者长度`
pub fn similarity(a: &str, b: &str) -> f64 {
    let m = a.chars().count();
    let n = b.chars().count();

    if m == 0 {
        return if n == 0 { 1.0 } else { 0.0 };
    }
    if n == 0 {
        return 0.0;
    }

    let max_len = m.max(n);
    let distance = edit_distance(a, b);
    (max_len - distance) as f64 / max_len as f64
}
