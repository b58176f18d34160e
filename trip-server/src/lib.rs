//! Trip Server - 旅行计划后端
//!
//! # 架构概述
//!
//! 行程 (trip) 由若干天 (day) 和日程 (schedule) 组成；日程要么属于某一天，
//! 要么在行程的临时保管箱里。排序由稀疏排序键维护，全部写入集中在
//! `placement` 模块。
//!
//! # 模块结构
//!
//! ```text
//! trip-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (SQLite + 仓库)
//! ├── placement/     # 排序引擎: 插入、移动、reflow
//! └── utils/         # 错误、日志等工具
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod placement;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use placement::{Bucket, MoveOutcome, PlacementError};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
