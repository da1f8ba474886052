//! 内存文档
//!
//! 用 scraper 解析 HTML，转成可修改的节点表。用于离线快照和测试，
//! 每次修改都会向订阅者发送一次 [`Trigger::Mutation`]

use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::{
    Probe, QuizDom, HIGHLIGHT_BORDER, HIGHLIGHT_SHADOW, MARKED_ATTR, MARKER_ATTR, MARKER_STYLE,
    MARKER_TEXT,
};
use crate::orchestrator::Trigger;

const DOCUMENT_TAG: &str = "#document";
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// 内存文档中的节点句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// 节点表，被移除的节点在下次 [`Tree::compact`] 时回收
#[derive(Debug, Default)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn push(&mut self, data: NodeData, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            data,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        id
    }

    fn element(&mut self, tag: &str, attrs: Vec<(String, String)>, parent: Option<usize>) -> usize {
        self.push(
            NodeData::Element {
                tag: tag.to_ascii_lowercase(),
                attrs,
            },
            parent,
        )
    }

    /// 把 scraper 元素的子节点复制到 parent 下
    fn import_children(&mut self, source: ElementRef<'_>, parent: usize) {
        for child in source.children() {
            if let Some(el) = ElementRef::wrap(child) {
                let attrs = el
                    .value()
                    .attrs()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                let id = self.element(el.value().name(), attrs, Some(parent));
                self.import_children(el, id);
            } else if let Some(text) = child.value().as_text() {
                let text: &str = text;
                self.push(NodeData::Text(text.to_string()), Some(parent));
            }
        }
    }

    fn tag(&self, id: usize) -> Option<&str> {
        match &self.nodes[id].data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    fn attr(&self, id: usize, name: &str) -> Option<&str> {
        match &self.nodes[id].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    fn set_attr(&mut self, id: usize, name: &str, value: String) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id].data {
            match attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
                Some((_, v)) => *v = value,
                None => attrs.push((name.to_string(), value)),
            }
        }
    }

    fn matches(&self, id: usize, probe: &Probe) -> bool {
        match self.tag(id) {
            Some(tag) if tag != DOCUMENT_TAG => probe.matches(tag, |name| self.attr(id, name)),
            _ => false,
        }
    }

    /// 只认带 `MARKER_ATTR` 的节点，与页面里的规则一致
    fn is_marker(&self, id: usize) -> bool {
        self.attr(id, MARKER_ATTR).is_some()
    }

    /// 先序遍历 id 的所有后代
    fn descendants(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next].children.iter().rev().copied());
        }
        out
    }

    fn text(&self, id: usize) -> String {
        if let NodeData::Text(t) = &self.nodes[id].data {
            return t.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| match &self.nodes[d].data {
                NodeData::Text(t) => Some(t.as_str()),
                NodeData::Element { .. } => None,
            })
            .collect()
    }

    fn detach(&mut self, id: usize) {
        if let Some(p) = self.nodes[id].parent.take() {
            self.nodes[p].children.retain(|&c| c != id);
        }
    }

    /// 只保留 root 下的节点并按先序重新编号，root 编号变为 0
    fn compact(&mut self, root: usize) {
        let order: Vec<usize> = std::iter::once(root)
            .chain(self.descendants(root))
            .collect();

        let mut remap = vec![None; self.nodes.len()];
        for (new_id, &old_id) in order.iter().enumerate() {
            remap[old_id] = Some(new_id);
        }

        self.nodes = order
            .iter()
            .map(|&old_id| {
                let node = &self.nodes[old_id];
                Node {
                    data: node.data.clone(),
                    parent: node.parent.and_then(|p| remap[p]),
                    children: node.children.iter().filter_map(|&c| remap[c]).collect(),
                }
            })
            .collect();
    }

    fn write_html(&self, id: usize, out: &mut String) {
        match &self.nodes[id].data {
            NodeData::Text(t) => out.push_str(&escape(t, false)),
            NodeData::Element { tag, attrs } => {
                if tag == DOCUMENT_TAG {
                    out.push_str("<!DOCTYPE html>");
                } else {
                    out.push('<');
                    out.push_str(tag);
                    for (k, v) in attrs {
                        out.push_str(&format!(" {}=\"{}\"", k, escape(v, true)));
                    }
                    out.push('>');
                    if VOID_TAGS.contains(&tag.as_str()) {
                        return;
                    }
                }
                for &child in &self.nodes[id].children {
                    self.write_html(child, out);
                }
                if tag != DOCUMENT_TAG {
                    out.push_str(&format!("</{}>", tag));
                }
            }
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// 往 style 属性里写入（或覆盖）若干 CSS 属性
fn merge_style(existing: Option<&str>, updates: &[(&str, &str)]) -> String {
    let mut props: Vec<(String, String)> = existing
        .unwrap_or_default()
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .filter(|(k, _)| !k.is_empty())
        .collect();

    for (key, value) in updates {
        match props.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some((_, v)) => *v = value.to_string(),
            None => props.push((key.to_string(), value.to_string())),
        }
    }

    props
        .iter()
        .map(|(k, v)| format!("{}: {};", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 可修改的内存文档
#[derive(Debug)]
pub struct MemoryDom {
    tree: Mutex<Tree>,
    root: usize,
    subscribers: Mutex<Vec<UnboundedSender<Trigger>>>,
}

impl MemoryDom {
    /// 解析完整的 HTML 文档
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut tree = Tree::default();
        let root = tree.element(DOCUMENT_TAG, Vec::new(), None);

        let html_el = parsed.root_element();
        let attrs = html_el
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let html_id = tree.element(html_el.value().name(), attrs, Some(root));
        tree.import_children(html_el, html_id);

        Self {
            tree: Mutex::new(tree),
            root,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// 订阅修改通知
    pub fn subscribe(&self) -> UnboundedReceiver<Trigger> {
        let (tx, rx) = unbounded_channel();
        lock(&self.subscribers).push(tx);
        rx
    }

    /// 用新的 HTML 片段替换 body 的内容（模拟平台切换到下一题）
    ///
    /// 替换后节点表会被整理，之前拿到的 [`NodeId`] 全部失效
    pub fn set_body(&self, html: &str) {
        let fragment = Html::parse_fragment(html);
        {
            let mut tree = lock(&self.tree);
            let body = tree
                .descendants(self.root)
                .into_iter()
                .find(|&id| tree.tag(id) == Some("body"));
            let body = match body {
                Some(id) => id,
                None => {
                    let html_id = tree.nodes[self.root].children[0];
                    tree.element("body", Vec::new(), Some(html_id))
                }
            };

            for child in tree.nodes[body].children.clone() {
                tree.detach(child);
            }
            tree.import_children(fragment.root_element(), body);
            tree.compact(self.root);
        }
        self.notify();
    }

    /// 同步版本的查询，按文档顺序
    pub fn select(&self, probe: &Probe) -> Vec<NodeId> {
        let tree = lock(&self.tree);
        tree.descendants(self.root)
            .into_iter()
            .filter(|&id| tree.matches(id, probe))
            .map(NodeId)
            .collect()
    }

    pub fn text_of(&self, node: NodeId) -> String {
        lock(&self.tree).text(node.0)
    }

    pub fn attr_of(&self, node: NodeId, name: &str) -> Option<String> {
        lock(&self.tree).attr(node.0, name).map(str::to_string)
    }

    /// node 之下注入的标记节点数量
    pub fn marker_count(&self, node: NodeId) -> usize {
        let tree = lock(&self.tree);
        tree.descendants(node.0)
            .into_iter()
            .filter(|&id| tree.attr(id, MARKER_ATTR).is_some())
            .count()
    }

    /// 序列化回 HTML
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        lock(&self.tree).write_html(self.root, &mut out);
        out
    }

    fn notify(&self) {
        lock(&self.subscribers).retain(|tx| tx.send(Trigger::Mutation).is_ok());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl QuizDom for MemoryDom {
    type Node = NodeId;

    async fn query_all(&self, probe: &Probe) -> Result<Vec<NodeId>> {
        Ok(self.select(probe))
    }

    async fn query_within(&self, scope: &NodeId, probe: &Probe) -> Result<Option<NodeId>> {
        let tree = lock(&self.tree);
        let found = tree
            .descendants(scope.0)
            .into_iter()
            .find(|&id| tree.matches(id, probe) && !tree.is_marker(id))
            .map(NodeId);
        Ok(found)
    }

    async fn text_content(&self, node: &NodeId) -> Result<String> {
        Ok(self.text_of(*node))
    }

    async fn is_marked(&self, node: &NodeId) -> Result<bool> {
        Ok(self.attr_of(*node, MARKED_ATTR).as_deref() == Some("true"))
    }

    async fn annotate(&self, node: &NodeId) -> Result<()> {
        {
            let mut tree = lock(&self.tree);
            let stale: Vec<usize> = tree.nodes[node.0]
                .children
                .iter()
                .copied()
                .filter(|&c| tree.is_marker(c))
                .collect();
            for id in stale {
                tree.detach(id);
            }

            let marker = tree.element(
                "span",
                vec![
                    ("style".to_string(), MARKER_STYLE.to_string()),
                    (MARKER_ATTR.to_string(), "true".to_string()),
                ],
                Some(node.0),
            );
            tree.push(NodeData::Text(MARKER_TEXT.to_string()), Some(marker));
            tree.set_attr(node.0, MARKED_ATTR, "true".to_string());
        }
        self.notify();
        Ok(())
    }

    async fn highlight(&self, node: &NodeId) -> Result<()> {
        {
            let mut tree = lock(&self.tree);
            let style = merge_style(
                tree.attr(node.0, "style"),
                &[("border", HIGHLIGHT_BORDER), ("box-shadow", HIGHLIGHT_SHADOW)],
            );
            tree.set_attr(node.0, "style", style);
        }
        self.notify();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="question-text-color">What is <b>2+2</b>?</div>
        <div class="option"><span class="resizeable">3</span></div>
        <div class="option" style="color: red"><span class="resizeable">4</span></div>
    </body></html>"#;

    #[test]
    fn test_parse_and_select() {
        let dom = MemoryDom::parse(PAGE);
        let question = dom.select(&Probe::Class("question-text-color"));
        assert_eq!(question.len(), 1);
        assert_eq!(dom.text_of(question[0]), "What is 2+2?");

        let options = dom.select(&Probe::Class("option"));
        assert_eq!(options.len(), 2);
        assert_eq!(dom.text_of(options[1]), "4");
        assert!(dom.select(&Probe::Class("missing")).is_empty());
    }

    #[tokio::test]
    async fn test_annotate_replaces_stale_marker() {
        let dom = MemoryDom::parse(PAGE);
        let text = dom.select(&Probe::Class("resizeable"))[1];

        dom.annotate(&text).await.unwrap();
        dom.annotate(&text).await.unwrap();

        assert_eq!(dom.marker_count(text), 1);
        assert!(dom.is_marked(&text).await.unwrap());
        assert_eq!(dom.text_of(text), "4(correct answer)");
    }

    #[tokio::test]
    async fn test_query_within_skips_marker() {
        let dom = MemoryDom::parse(r#"<html><body><div class="option">4</div></body></html>"#);
        let option = dom.select(&Probe::Class("option"))[0];
        dom.annotate(&option).await.unwrap();

        assert_eq!(dom.query_within(&option, &Probe::Tag("span")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_highlight_merges_style() {
        let dom = MemoryDom::parse(PAGE);
        let option = dom.select(&Probe::Class("option"))[1];
        dom.highlight(&option).await.unwrap();
        dom.highlight(&option).await.unwrap();

        assert_eq!(
            dom.attr_of(option, "style").unwrap(),
            "color: red; border: 2px solid #00ff00; box-shadow: 0 0 10px rgba(0,255,0,0.3);"
        );
    }

    #[tokio::test]
    async fn test_mutations_notify_subscribers() {
        let dom = MemoryDom::parse(PAGE);
        let mut rx = dom.subscribe();

        dom.set_body(r#"<div class="question-text-color">Next?</div>"#);
        assert_eq!(rx.try_recv().unwrap(), Trigger::Mutation);

        let question = dom.select(&Probe::Class("question-text-color"));
        assert_eq!(question.len(), 1);
        assert_eq!(dom.text_of(question[0]), "Next?");
        assert!(dom.select(&Probe::Class("option")).is_empty());
    }

    #[test]
    fn test_to_html_round_trip_text() {
        let dom = MemoryDom::parse(r#"<html><body><p title="a&quot;b">x &lt; y</p><br></body></html>"#);
        let html = dom.to_html();
        assert!(html.contains(r#"<p title="a&quot;b">x &lt; y</p>"#), "{}", html);
        assert!(html.contains("<br>"));
        assert!(!html.contains("</br>"));
    }

    #[test]
    fn test_set_body_reclaims_detached_nodes() {
        let dom = MemoryDom::parse(PAGE);
        let body = r#"<div class="question-text-color">Next?</div><div class="option"><span>a</span></div>"#;

        dom.set_body(body);
        let settled = lock(&dom.tree).nodes.len();
        for _ in 0..10 {
            dom.set_body(body);
        }

        assert_eq!(lock(&dom.tree).nodes.len(), settled);
        let question = dom.select(&Probe::Class("question-text-color"));
        assert_eq!(dom.text_of(question[0]), "Next?");
        assert!(dom.to_html().contains("<span>a</span>"));
    }

    #[tokio::test]
    async fn test_marker_requires_marker_attribute() {
        // 页面自带的同文字 span 不是注入的标记
        let dom = MemoryDom::parse(
            r#"<html><body><div class="option"><span>(correct answer)</span></div></body></html>"#,
        );
        let option = dom.select(&Probe::Class("option"))[0];

        let span = dom.query_within(&option, &Probe::Tag("span")).await.unwrap();
        assert!(span.is_some());
        assert_eq!(dom.marker_count(option), 0);

        dom.annotate(&option).await.unwrap();
        assert_eq!(dom.marker_count(option), 1);
        assert_eq!(dom.text_of(option), "(correct answer)(correct answer)");
        assert_eq!(dom.query_within(&option, &Probe::Tag("span")).await.unwrap(), span);
    }
}
