use std::fmt;

use url::Url;

/// 支持的答题平台
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Quizizz,
    Wayground,
}

impl Platform {
    const ALL: [Platform; 2] = [Platform::Quizizz, Platform::Wayground];

    /// 根据页面 URL 判断平台，不支持的页面返回 None
    pub fn detect(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        Self::ALL.into_iter().find(|p| p.owns_host(host))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Quizizz => "Quizizz",
            Platform::Wayground => "Wayground",
        }
    }

    fn domain(&self) -> &'static str {
        match self {
            Platform::Quizizz => "quizizz.com",
            Platform::Wayground => "wayground.com",
        }
    }

    /// 域名本身或其子域名
    fn owns_host(&self, host: &str) -> bool {
        let domain = self.domain();
        host == domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
