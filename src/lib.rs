//! # Quiz Answer Overlay
//!
//! 在 Quizizz / Wayground 答题页面上自动标出正确选项的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `dom/` - 页面访问的统一接口 `QuizDom`，以及内存实现 `MemoryDom`
//! - `infrastructure/` - 持有浏览器页面（Page），提供 `PageDom` 和页面变化监听
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 规范化、相似度、题目匹配、题目定位、选项标记、通知
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 一次处理的完整流程（定位 → 匹配 → 标记 → 通知）
//! - `QuizSession` - 题库和匹配配置的会话状态
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/scheduler` - 页面变化驱动、带防抖的调度器
//! - `app` - 连接浏览器、加载题库、管理生命周期
//!
//! ## 模块结构

pub mod app;
pub mod browser;
pub mod clients;
pub mod config;
pub mod dom;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use browser::connect_to_quiz_page;
pub use config::Config;
pub use dom::{MemoryDom, Probe, QuizDom};
pub use error::{AppError, AppResult, LoadError};
pub use models::{AnswerDataset, AnswerRecord};
pub use orchestrator::{Scheduler, SchedulerStats, Trigger};
pub use services::MatchingService;
pub use workflow::{process_question, ProcessResult, QuizSession};
