use std::fmt;

/// 单个选择器模式
///
/// 只覆盖题目/选项定位用到的几种 CSS 写法，既能渲染成 CSS 交给浏览器，
/// 也能直接在内存文档上求值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// `.name`
    Class(&'static str),
    /// `[class*="part"]`
    ClassContains(&'static str),
    /// `[attr="value"]`
    AttrEquals(&'static str, &'static str),
    /// `[attr*="part"]`
    AttrContains(&'static str, &'static str),
    /// `tag`
    Tag(&'static str),
}

impl Probe {
    /// 渲染为 CSS 选择器
    pub fn css(&self) -> String {
        match self {
            Probe::Class(name) => format!(".{}", name),
            Probe::ClassContains(part) => format!("[class*=\"{}\"]", part),
            Probe::AttrEquals(attr, value) => format!("[{}=\"{}\"]", attr, value),
            Probe::AttrContains(attr, part) => format!("[{}*=\"{}\"]", attr, part),
            Probe::Tag(tag) => tag.to_string(),
        }
    }

    /// 判断元素是否匹配
    ///
    /// `attr` 按名称取属性值
    pub fn matches<'a>(&self, tag: &str, attr: impl Fn(&str) -> Option<&'a str>) -> bool {
        match self {
            Probe::Class(name) => attr("class")
                .map(|c| c.split_whitespace().any(|token| token == *name))
                .unwrap_or(false),
            Probe::ClassContains(part) => attr("class").map(|c| c.contains(*part)).unwrap_or(false),
            Probe::AttrEquals(name, value) => attr(*name).map(|v| v == *value).unwrap_or(false),
            Probe::AttrContains(name, part) => attr(*name).map(|v| v.contains(*part)).unwrap_or(false),
            Probe::Tag(t) => tag.eq_ignore_ascii_case(t),
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}
