//! 图对象映射层基础库（ogm-mapping）
//!
//! 把 Rust 结构体映射为图节点与关系，核心是"标识"子系统：
//! - 实体元数据（`metadata`）：静态描述 + 注册期校验得到的 `PersistentEntity`
//! - 属性读写（`entity::PropertyAccess` 与 `accessor`）：按名称读写字段
//! - 内部标识（`identity`）：让没有 id 字段的实体也拥有可读写的 `id`
//! - 映射上下文（`context`）：按类型缓存元数据，创建访问器
//! - Cypher 片段（`cypher`）：匹配、排序、保存与删除语句的结构化准备
//!
//! 实体通常用 `#[node]` / `#[relationship_properties]` 宏声明：
//!
//! ```rust
//! use ogm_mapping::accessor::PropertyAccessor;
//! use ogm_mapping::context::MappingContext;
//! use ogm_mapping::node;
//! use ogm_mapping::value::Value;
//!
//! #[node(labels = ["Person"])]
//! #[derive(Debug, Default)]
//! struct Person {
//!     name: String,
//! }
//!
//! let ctx = MappingContext::default();
//! let entity = ctx.register::<Person>().unwrap();
//! let mut accessor = ctx.identity_aware_accessor(Person::default()).unwrap();
//! accessor.set_property(entity.id_property(), Value::Integer(42)).unwrap();
//! assert_eq!(accessor.get_property(entity.id_property()).unwrap(), Value::Integer(42));
//! ```
//!
pub mod accessor;
pub mod context;
pub mod cypher;
pub mod entity;
pub mod error;
pub mod identity;
pub mod metadata;
pub mod value;

#[cfg(feature = "macros")]
pub use ogm_macros::{node, relationship_properties};

// 允许在本 crate 内部通过 ::ogm_mapping 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::ogm_mapping 路径。
extern crate self as ogm_mapping;
