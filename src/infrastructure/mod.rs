//! 基础设施层
//!
//! 持有浏览器页面资源，只暴露能力，不认识题目

pub mod js_executor;
pub mod mutation_watch;
pub mod page_dom;

pub use js_executor::JsExecutor;
pub use mutation_watch::MutationWatch;
pub use page_dom::PageDom;
