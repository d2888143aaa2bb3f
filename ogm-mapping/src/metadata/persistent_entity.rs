use crate::error::{MappingError, MappingResult};
use crate::value::PropertyType;

use super::description::{EntityDescription, EntityKind, IdKind};
use super::property::{DeclaredProperty, PersistentProperty, SYNTHETIC_ID};

/// 运行期的实体元数据
///
/// 由 `EntityDescription` 校验后构建；不合法的映射在这里（注册阶段）失败，
/// 而不是等到属性访问时才暴露。
#[derive(Debug, Clone)]
pub struct PersistentEntity {
    type_name: &'static str,
    labels: Vec<&'static str>,
    kind: EntityKind,
    properties: Vec<PersistentProperty>,
    id_index: usize,
}

impl PersistentEntity {
    pub fn from_description(
        description: EntityDescription,
        allow_synthetic_ids: bool,
    ) -> MappingResult<Self> {
        let type_name = description.type_name;

        let id_count = description.id_properties().count();
        if id_count > 1 {
            return Err(MappingError::unsupported(
                type_name,
                format!("declares {id_count} id properties, at most one is allowed"),
            ));
        }

        let version_count = description.properties.iter().filter(|p| p.version).count();
        if version_count > 1 {
            return Err(MappingError::unsupported(
                type_name,
                format!("declares {version_count} version properties, at most one is allowed"),
            ));
        }

        for p in description.properties {
            if p.id == IdKind::Generated && p.property_type != PropertyType::Integer {
                return Err(MappingError::unsupported(
                    type_name,
                    format!(
                        "generated id `{}` must be an integer, found {}",
                        p.field_name,
                        p.property_type.name()
                    ),
                ));
            }
            if p.version && p.property_type != PropertyType::Integer {
                return Err(MappingError::unsupported(
                    type_name,
                    format!(
                        "version property `{}` must be an integer, found {}",
                        p.field_name,
                        p.property_type.name()
                    ),
                ));
            }
            if p.is_id() && (p.transient || p.relationship.is_some()) {
                return Err(MappingError::unsupported(
                    type_name,
                    format!("id property `{}` must be a plain stored value", p.field_name),
                ));
            }
        }

        if description.kind == EntityKind::RelationshipProperties {
            let targets = description
                .properties
                .iter()
                .filter(|p| p.target_node.is_some())
                .count();
            if targets != 1 {
                return Err(MappingError::unsupported(
                    type_name,
                    format!("relationship properties need exactly one target node, found {targets}"),
                ));
            }
        }

        let mut properties: Vec<PersistentProperty> = description
            .properties
            .iter()
            .map(|p| PersistentProperty::Declared(DeclaredProperty::new(type_name, *p)))
            .collect();

        let id_index = match properties.iter().position(|p| p.is_id_property()) {
            Some(index) => index,
            None => {
                if !allow_synthetic_ids {
                    return Err(MappingError::unsupported(
                        type_name,
                        "has no id property and synthetic ids are disabled",
                    ));
                }
                if let Some(clash) = properties.iter().find(|p| {
                    p.name() == SYNTHETIC_ID_NAME || p.graph_name() == SYNTHETIC_ID_NAME
                }) {
                    return Err(MappingError::unsupported(
                        type_name,
                        format!(
                            "property `{}` collides with the synthetic `id` property",
                            clash.name()
                        ),
                    ));
                }
                properties.push(SYNTHETIC_ID.property());
                properties.len() - 1
            }
        };

        let labels = description.effective_labels();

        Ok(Self {
            type_name,
            labels,
            kind: description.kind,
            properties,
            id_index,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }

    pub fn primary_label(&self) -> Option<&'static str> {
        self.labels.first().copied()
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn is_relationship_properties(&self) -> bool {
        self.kind == EntityKind::RelationshipProperties
    }

    pub fn properties(&self) -> &[PersistentProperty] {
        &self.properties
    }

    pub fn id_property(&self) -> &PersistentProperty {
        &self.properties[self.id_index]
    }

    /// 声明的 id 属性；依赖合成 id 的实体没有
    pub fn required_id_property(&self) -> MappingResult<&PersistentProperty> {
        match self.id_property() {
            p if p.is_synthetic() => Err(MappingError::MissingIdProperty {
                type_name: self.type_name,
            }),
            p => Ok(p),
        }
    }

    pub fn version_property(&self) -> Option<&PersistentProperty> {
        self.properties.iter().find(|p| p.is_version_property())
    }

    /// 是否使用数据库内部 id（生成的 `i64` id 或合成 id）
    pub fn is_using_internal_ids(&self) -> bool {
        self.id_property().is_internal_id_property()
    }

    /// 实体是否自带 id 字段
    pub fn has_native_id(&self) -> bool {
        !self.uses_synthetic_id()
    }

    pub fn uses_synthetic_id(&self) -> bool {
        self.id_property().is_synthetic()
    }

    pub fn property(&self, name: &str) -> Option<&PersistentProperty> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn required_property(&self, name: &str) -> MappingResult<&PersistentProperty> {
        self.property(name)
            .ok_or_else(|| MappingError::UnknownProperty {
                type_name: self.type_name,
                property: name.to_string(),
            })
    }

    pub fn relationships(&self) -> impl Iterator<Item = &PersistentProperty> {
        self.properties.iter().filter(|p| p.is_relationship())
    }

    /// 保存时写入图属性的字段：排除内部 id、瞬态字段与关联
    pub fn stored_properties(&self) -> impl Iterator<Item = &PersistentProperty> {
        self.properties.iter().filter(|p| {
            !p.is_internal_id_property() && !p.is_transient() && !p.is_association()
        })
    }
}

const SYNTHETIC_ID_NAME: &str = super::property::SyntheticIdProperty::NAME;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Direction, PropertyDescription, RelationshipDescription};

    fn node(
        type_name: &'static str,
        properties: &'static [PropertyDescription],
    ) -> EntityDescription {
        EntityDescription {
            type_name,
            labels: &[],
            kind: EntityKind::Node,
            properties,
        }
    }

    static PLAIN: [PropertyDescription; 1] =
        [PropertyDescription::new("name", PropertyType::String)];

    static GENERATED: [PropertyDescription; 2] = [
        PropertyDescription::new("id", PropertyType::Integer).id(IdKind::Generated),
        PropertyDescription::new("known_property", PropertyType::String)
            .graph_name("knownProperty"),
    ];

    #[test]
    fn plain_entity_gets_synthetic_id() {
        let entity = PersistentEntity::from_description(node("Plain", &PLAIN), true).unwrap();
        assert!(entity.uses_synthetic_id());
        assert!(!entity.has_native_id());
        assert!(entity.is_using_internal_ids());
        assert_eq!(entity.id_property().name(), "id");
        assert_eq!(entity.labels(), &["Plain"]);
        assert_eq!(entity.properties().len(), 2);
        assert!(matches!(
            entity.required_id_property(),
            Err(MappingError::MissingIdProperty { type_name: "Plain" })
        ));
    }

    #[test]
    fn native_generated_id_is_used_as_is() {
        let entity =
            PersistentEntity::from_description(node("Container", &GENERATED), true).unwrap();
        assert!(entity.has_native_id());
        assert!(entity.is_using_internal_ids());
        assert_eq!(entity.required_id_property().unwrap().name(), "id");
        let stored: Vec<_> = entity.stored_properties().map(|p| p.graph_name()).collect();
        assert_eq!(stored, vec!["knownProperty"]);
    }

    #[test]
    fn synthetic_ids_can_be_disabled() {
        let err = PersistentEntity::from_description(node("Plain", &PLAIN), false).unwrap_err();
        assert!(matches!(
            err,
            MappingError::UnsupportedEntityType {
                type_name: "Plain",
                ..
            }
        ));
    }

    #[test]
    fn rejects_id_name_collision() {
        static CLASH: [PropertyDescription; 1] =
            [PropertyDescription::new("id", PropertyType::String)];
        let err = PersistentEntity::from_description(node("Clash", &CLASH), true).unwrap_err();
        assert!(err.to_string().contains("collides"));
    }

    #[test]
    fn rejects_non_integer_generated_id() {
        static BAD: [PropertyDescription; 1] =
            [PropertyDescription::new("id", PropertyType::String).id(IdKind::Generated)];
        let err = PersistentEntity::from_description(node("Bad", &BAD), true).unwrap_err();
        assert!(err.to_string().contains("must be an integer"));
    }

    #[test]
    fn rejects_two_ids() {
        static TWO: [PropertyDescription; 2] = [
            PropertyDescription::new("id", PropertyType::Integer).id(IdKind::Generated),
            PropertyDescription::new("uuid", PropertyType::String).id(IdKind::Assigned),
        ];
        assert!(PersistentEntity::from_description(node("Two", &TWO), true).is_err());
    }

    fn target() -> EntityDescription {
        node("Target", &[])
    }

    #[test]
    fn relationship_properties_need_target_node() {
        static NO_TARGET: [PropertyDescription; 1] =
            [PropertyDescription::new("since", PropertyType::Integer)];
        let description = EntityDescription {
            type_name: "Rel",
            labels: &[],
            kind: EntityKind::RelationshipProperties,
            properties: &NO_TARGET,
        };
        assert!(PersistentEntity::from_description(description, true).is_err());

        static WITH_TARGET: [PropertyDescription; 2] = [
            PropertyDescription::new("since", PropertyType::Integer),
            PropertyDescription::new("target", PropertyType::Relationship).target_node(target),
        ];
        let description = EntityDescription {
            properties: &WITH_TARGET,
            ..description
        };
        let entity = PersistentEntity::from_description(description, true).unwrap();
        assert!(entity.is_relationship_properties());
        assert!(entity.labels().is_empty());
        assert!(entity.uses_synthetic_id());
        let stored: Vec<_> = entity.stored_properties().map(|p| p.name()).collect();
        assert_eq!(stored, vec!["since"]);
    }

    #[test]
    fn relationships_are_listed() {
        static WITH_REL: [PropertyDescription; 1] = [PropertyDescription::new(
            "friends",
            PropertyType::Relationship,
        )
        .relationship(RelationshipDescription {
            rel_type: "KNOWS",
            direction: Direction::Outgoing,
            target,
        })];
        let entity = PersistentEntity::from_description(node("Person", &WITH_REL), true).unwrap();
        let rels: Vec<_> = entity.relationships().map(|p| p.name()).collect();
        assert_eq!(rels, vec!["friends"]);
        assert!(entity.stored_properties().next().is_none());
    }

    #[test]
    fn unknown_property_is_reported() {
        let entity = PersistentEntity::from_description(node("Plain", &PLAIN), true).unwrap();
        assert!(entity.required_property("name").is_ok());
        let err = entity.required_property("age").unwrap_err();
        assert_eq!(err.to_string(), "unknown property `age` on entity `Plain`");
    }
}
