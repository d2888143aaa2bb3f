//! Cypher 查询片段
//!
//! 映射层只负责准备结构化片段（匹配节点、id 条件、排序、保存与删除语句），
//! 查询 DSL 与最终渲染通过 `StatementRenderer` 接入。保存节点与关系属性时一律使用
//! `SET n += $__properties__` 增量合并，且不写入内部 id。
//!
mod fragments;
mod generator;
mod sort;

pub use fragments::*;
pub use generator::CypherGenerator;
pub use sort::{Order, Sort, SortDirection, is_identifier, order_by_fragment};
