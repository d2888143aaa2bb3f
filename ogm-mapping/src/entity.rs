//! 实体（Entity）基础抽象
//!
//! `NodeEntity` 以编译期常量描述实体的标签与属性；`PropertyAccess` 为映射层提供按名称读写属性的
//! 统一入口（对应反射式属性访问）。二者通常由 `#[node]` / `#[relationship_properties]` 宏生成。
//!
use crate::error::MappingResult;
use crate::metadata::{EntityDescription, EntityKind, PropertyDescription};
use crate::value::Value;

/// 映射到图节点（或关系属性）的实体
pub trait NodeEntity {
    /// 类型名，用于诊断信息与默认标签
    const TYPE_NAME: &'static str;
    /// 节点标签；关系属性实体为空
    const LABELS: &'static [&'static str];
    const KIND: EntityKind;
    /// 声明的属性（按字段顺序）
    const PROPERTIES: &'static [PropertyDescription];

    fn description() -> EntityDescription {
        EntityDescription {
            type_name: Self::TYPE_NAME,
            labels: Self::LABELS,
            kind: Self::KIND,
            properties: Self::PROPERTIES,
        }
    }
}

/// 按属性名读写实体字段
///
/// 名称为 Rust 字段名（`PersistentProperty::name`），不是图中的属性名。
pub trait PropertyAccess {
    fn read_property(&self, name: &str) -> MappingResult<Value>;

    fn write_property(&mut self, name: &str, value: Value) -> MappingResult<()>;

    /// 返回写入后的新实例（不可变风格实体可覆写为重新构造）
    fn with_property(mut self, name: &str, value: Value) -> MappingResult<Self>
    where
        Self: Sized,
    {
        self.write_property(name, value)?;
        Ok(self)
    }
}
