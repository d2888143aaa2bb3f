use std::fmt;

use crate::value::PropertyType;

/// 实体种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// 图节点
    Node,
    /// 承载关系属性的实体（关系本身的属性 + 目标节点）
    RelationshipProperties,
}

/// id 的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// 非 id 属性
    None,
    /// 由业务赋值（如 `String`/`Uuid`），作为普通属性存储
    Assigned,
    /// 由数据库生成的内部 id
    Generated,
}

/// 关系方向（相对于拥有该属性的实体）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// 关系描述
#[derive(Clone, Copy)]
pub struct RelationshipDescription {
    pub rel_type: &'static str,
    pub direction: Direction,
    /// 惰性解析目标实体，允许实体之间互相引用
    pub target: fn() -> EntityDescription,
}

impl RelationshipDescription {
    pub fn target_description(&self) -> EntityDescription {
        (self.target)()
    }

    /// 目标是否为关系属性实体
    pub fn has_relationship_properties(&self) -> bool {
        self.target_description().kind == EntityKind::RelationshipProperties
    }

    /// 关系另一端的节点；目标为关系属性实体时取其目标节点字段
    pub fn end_node_description(&self) -> EntityDescription {
        let target = self.target_description();
        match target.kind {
            EntityKind::Node => target,
            EntityKind::RelationshipProperties => target
                .properties
                .iter()
                .find_map(|p| p.target_node)
                .map(|end| end())
                .unwrap_or(target),
        }
    }
}

impl fmt::Debug for RelationshipDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipDescription")
            .field("rel_type", &self.rel_type)
            .field("direction", &self.direction)
            .field("target", &self.target_description().type_name)
            .finish()
    }
}

/// 单个声明属性的静态描述
#[derive(Debug, Clone, Copy)]
pub struct PropertyDescription {
    pub field_name: &'static str,
    pub graph_name: &'static str,
    pub property_type: PropertyType,
    pub id: IdKind,
    pub version: bool,
    pub transient: bool,
    /// 关系属性实体中指向目标节点的字段
    pub target_node: Option<fn() -> EntityDescription>,
    pub relationship: Option<RelationshipDescription>,
    pub annotations: &'static [&'static str],
}

impl PropertyDescription {
    /// 以字段名作为图属性名的普通属性
    pub const fn new(field_name: &'static str, property_type: PropertyType) -> Self {
        Self {
            field_name,
            graph_name: field_name,
            property_type,
            id: IdKind::None,
            version: false,
            transient: false,
            target_node: None,
            relationship: None,
            annotations: &[],
        }
    }

    pub const fn graph_name(mut self, graph_name: &'static str) -> Self {
        self.graph_name = graph_name;
        self
    }

    pub const fn id(mut self, id: IdKind) -> Self {
        self.id = id;
        self
    }

    pub const fn version(mut self) -> Self {
        self.version = true;
        self
    }

    pub const fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub const fn target_node(mut self, target: fn() -> EntityDescription) -> Self {
        self.target_node = Some(target);
        self
    }

    pub const fn relationship(mut self, relationship: RelationshipDescription) -> Self {
        self.relationship = Some(relationship);
        self
    }

    pub const fn annotations(mut self, annotations: &'static [&'static str]) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn is_id(&self) -> bool {
        self.id != IdKind::None
    }
}

/// 实体的静态描述
#[derive(Debug, Clone, Copy)]
pub struct EntityDescription {
    pub type_name: &'static str,
    pub labels: &'static [&'static str],
    pub kind: EntityKind,
    pub properties: &'static [PropertyDescription],
}

impl EntityDescription {
    pub fn id_properties(&self) -> impl Iterator<Item = &'static PropertyDescription> {
        self.properties.iter().filter(|p| p.is_id())
    }

    pub fn property(&self, field_name: &str) -> Option<&'static PropertyDescription> {
        self.properties.iter().find(|p| p.field_name == field_name)
    }

    /// 节点标签；未声明时以类型名作为唯一标签
    pub fn effective_labels(&self) -> Vec<&'static str> {
        match (self.kind, self.labels) {
            (EntityKind::Node, []) => vec![self.type_name],
            (_, labels) => labels.to_vec(),
        }
    }
}
