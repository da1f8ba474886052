//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 决定什么时候跑处理流程，不做具体业务判断。
//!
//! ## 层次关系
//!
//! ```text
//! app (浏览器连接、题库加载、生命周期)
//!     ↓
//! scheduler (页面变化 → 防抖 → 处理)
//!     ↓
//! workflow::process_question (处理当前这一题)
//!     ↓
//! services (能力层：定位 / 匹配 / 标记 / 通知)
//!     ↓
//! dom / infrastructure (页面访问)
//! ```

pub mod scheduler;

pub use scheduler::{Scheduler, SchedulerStats, Trigger, DEFAULT_DEBOUNCE};
