//! 页面文档抽象
//!
//! 业务层只通过 [`QuizDom`] 访问页面：
//! - [`PageDom`](crate::infrastructure::PageDom) 操作真实浏览器页面
//! - [`MemoryDom`] 操作内存中的 HTML（离线快照、测试）
//!
//! 选择器统一用 [`Probe`] 表示，按顺序尝试，第一个有结果的生效

pub mod memory;
pub mod probe;

use anyhow::Result;
use async_trait::async_trait;

pub use memory::MemoryDom;
pub use probe::Probe;

/// 标记状态属性（对应 `dataset.quizMarked`）
pub const MARKED_ATTR: &str = "data-quiz-marked";
/// 注入的标记节点带有此属性
pub const MARKER_ATTR: &str = "data-quiz-marker";
/// 注入的标记文本
pub const MARKER_TEXT: &str = "(correct answer)";
/// 标记节点样式
pub const MARKER_STYLE: &str = "color: #00ff00; font-weight: bold; font-size: 0.9em;";
/// 正确选项容器的边框
pub const HIGHLIGHT_BORDER: &str = "2px solid #00ff00";
/// 正确选项容器的阴影
pub const HIGHLIGHT_SHADOW: &str = "0 0 10px rgba(0,255,0,0.3)";

/// 页面文档能力
///
/// 实现方不关心题目和答案，只提供查询和修改节点的能力
#[async_trait]
pub trait QuizDom: Send + Sync {
    /// 节点句柄
    type Node: Send + Sync;

    /// 按文档顺序返回所有匹配的元素
    async fn query_all(&self, probe: &Probe) -> Result<Vec<Self::Node>>;

    /// 在 `scope` 的后代中查找第一个匹配的元素（不含 scope 本身，跳过注入的标记节点）
    async fn query_within(&self, scope: &Self::Node, probe: &Probe) -> Result<Option<Self::Node>>;

    /// 节点的 textContent
    async fn text_content(&self, node: &Self::Node) -> Result<String>;

    /// 节点是否已带标记状态
    async fn is_marked(&self, node: &Self::Node) -> Result<bool>;

    /// 替换旧的标记节点，追加新的标记节点，并设置标记状态
    async fn annotate(&self, node: &Self::Node) -> Result<()>;

    /// 给选项容器加高亮
    async fn highlight(&self, node: &Self::Node) -> Result<()>;

    /// 文档中第一个匹配的元素
    async fn query_first(&self, probe: &Probe) -> Result<Option<Self::Node>> {
        Ok(self.query_all(probe).await?.into_iter().next())
    }
}

/// 按顺序尝试 probes，返回第一个有匹配的 probe 的第一个元素
pub async fn probe_first<D: QuizDom + ?Sized>(
    dom: &D,
    probes: &[Probe],
) -> Result<Option<(Probe, D::Node)>> {
    for probe in probes {
        if let Some(node) = dom.query_first(probe).await? {
            return Ok(Some((*probe, node)));
        }
    }
    Ok(None)
}

/// 按顺序尝试 probes，返回第一个有匹配的 probe 的全部元素
pub async fn probe_all<D: QuizDom + ?Sized>(
    dom: &D,
    probes: &[Probe],
) -> Result<Option<(Probe, Vec<D::Node>)>> {
    for probe in probes {
        let nodes = dom.query_all(probe).await?;
        if !nodes.is_empty() {
            return Ok(Some((*probe, nodes)));
        }
    }
    Ok(None)
}

/// 在 scope 内按顺序尝试 probes，返回第一个文本非空的元素
pub async fn probe_text_within<D: QuizDom + ?Sized>(
    dom: &D,
    scope: &D::Node,
    probes: &[Probe],
) -> Result<Option<D::Node>> {
    for probe in probes {
        if let Some(node) = dom.query_within(scope, probe).await? {
            if !dom.text_content(&node).await?.trim().is_empty() {
                return Ok(Some(node));
            }
        }
    }
    Ok(None)
}
