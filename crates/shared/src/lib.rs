//! 共享库
//!
//! 两个渠道 worker 共用的基础设施：配置加载、错误类型、Kafka 分区流、
//! 分区汇聚、分发循环、关闭协调以及可观测性初始化。

pub mod config;
pub mod delivery;
pub mod dispatch;
pub mod error;
pub mod fan_in;
pub mod kafka;
pub mod observability;
pub mod pipeline;
pub mod shutdown;
pub mod worker;
