use crate::identity::HasInternalId;
use crate::value::PropertyType;

use super::description::{IdKind, PropertyDescription, RelationshipDescription};

/// 实体的持久化属性
///
/// 声明属性来自字段；合成 id 属性用于没有 id 字段的实体。
/// 消费方按变体匹配，或使用下面统一的查询方法。
#[derive(Debug, Clone, Copy)]
pub enum PersistentProperty {
    Declared(DeclaredProperty),
    SyntheticId(&'static SyntheticIdProperty),
}

impl PersistentProperty {
    /// Rust 字段名；合成 id 为 `"id"`
    pub fn name(&self) -> &'static str {
        match self {
            PersistentProperty::Declared(p) => p.description.field_name,
            PersistentProperty::SyntheticId(_) => SyntheticIdProperty::NAME,
        }
    }

    /// 图中的属性名
    pub fn graph_name(&self) -> &'static str {
        match self {
            PersistentProperty::Declared(p) => p.description.graph_name,
            PersistentProperty::SyntheticId(_) => SyntheticIdProperty::NAME,
        }
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            PersistentProperty::Declared(p) => p.description.property_type,
            PersistentProperty::SyntheticId(_) => PropertyType::Integer,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, PersistentProperty::SyntheticId(_))
    }

    pub fn is_id_property(&self) -> bool {
        match self {
            PersistentProperty::Declared(p) => p.description.is_id(),
            PersistentProperty::SyntheticId(_) => true,
        }
    }

    /// 是否为数据库生成的内部 id（不作为节点属性存储）
    pub fn is_internal_id_property(&self) -> bool {
        match self {
            PersistentProperty::Declared(p) => {
                p.description.id == IdKind::Generated
                    && p.description.property_type == PropertyType::Integer
            }
            PersistentProperty::SyntheticId(_) => true,
        }
    }

    pub fn is_version_property(&self) -> bool {
        match self {
            PersistentProperty::Declared(p) => p.description.version,
            PersistentProperty::SyntheticId(_) => false,
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            PersistentProperty::Declared(p) => p.description.transient,
            PersistentProperty::SyntheticId(_) => false,
        }
    }

    pub fn is_writable(&self) -> bool {
        !self.is_transient()
    }

    pub fn is_relationship(&self) -> bool {
        self.relationship().is_some()
    }

    pub fn is_association(&self) -> bool {
        self.is_relationship() || self.is_target_node()
    }

    pub fn is_target_node(&self) -> bool {
        match self {
            PersistentProperty::Declared(p) => p.description.target_node.is_some(),
            PersistentProperty::SyntheticId(_) => false,
        }
    }

    /// 复合属性（多个图属性展开到一个字段）暂不支持
    pub fn is_composite(&self) -> bool {
        false
    }

    pub fn relationship(&self) -> Option<&RelationshipDescription> {
        match self {
            PersistentProperty::Declared(p) => p.description.relationship.as_ref(),
            PersistentProperty::SyntheticId(_) => None,
        }
    }

    /// 查找字段上的标注；合成属性始终没有标注
    pub fn find_annotation(&self, annotation: &str) -> Option<&'static str> {
        match self {
            PersistentProperty::Declared(p) => p
                .description
                .annotations
                .iter()
                .copied()
                .find(|a| *a == annotation),
            PersistentProperty::SyntheticId(_) => None,
        }
    }

    pub fn is_annotation_present(&self, annotation: &str) -> bool {
        self.find_annotation(annotation).is_some()
    }
}

/// 来自字段声明的属性
#[derive(Debug, Clone, Copy)]
pub struct DeclaredProperty {
    owner: &'static str,
    description: PropertyDescription,
}

impl DeclaredProperty {
    pub fn new(owner: &'static str, description: PropertyDescription) -> Self {
        Self { owner, description }
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn description(&self) -> &PropertyDescription {
        &self.description
    }
}

/// 合成的 `id` 属性
///
/// 对没有 id 字段的实体呈现一个可写、内部生成、`i64` 类型的 `id` 属性，
/// 读写经由 `HasInternalId` 能力完成。全局唯一且不可变。
pub struct SyntheticIdProperty {
    getter: fn(&dyn HasInternalId) -> Option<i64>,
    setter: fn(&mut dyn HasInternalId, Option<i64>),
}

fn read_internal_id(bean: &dyn HasInternalId) -> Option<i64> {
    bean.internal_id()
}

fn write_internal_id(bean: &mut dyn HasInternalId, id: Option<i64>) {
    match id {
        Some(id) => bean.set_internal_id(id),
        None => bean.clear_internal_id(),
    }
}

impl SyntheticIdProperty {
    pub const NAME: &'static str = "id";

    pub fn get(&self, bean: &dyn HasInternalId) -> Option<i64> {
        (self.getter)(bean)
    }

    pub fn set(&self, bean: &mut dyn HasInternalId, id: Option<i64>) {
        (self.setter)(bean, id)
    }

    pub fn property(&'static self) -> PersistentProperty {
        PersistentProperty::SyntheticId(self)
    }
}

impl std::fmt::Debug for SyntheticIdProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntheticIdProperty")
            .field("name", &Self::NAME)
            .finish()
    }
}

/// 合成 id 属性的唯一实例
pub static SYNTHETIC_ID: SyntheticIdProperty = SyntheticIdProperty {
    getter: read_internal_id,
    setter: write_internal_id,
};
