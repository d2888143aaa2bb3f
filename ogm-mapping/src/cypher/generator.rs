use std::collections::BTreeMap;

use crate::accessor::PropertyAccessor;
use crate::error::{MappingError, MappingResult};
use crate::metadata::{Direction, EntityDescription, IdKind, PersistentEntity, PersistentProperty};
use crate::value::{PropertyType, Value};

use super::fragments::*;
use super::sort::{Sort, order_by_fragment};

/// 由实体元数据生成查询片段与保存/删除语句
#[derive(Debug, Default, Clone, Copy)]
pub struct CypherGenerator;

impl CypherGenerator {
    /// 实体的根节点模式 `(n:Label)`
    pub fn root_node(&self, entity: &PersistentEntity) -> NodePattern {
        NodePattern::new(NAME_OF_ROOT_NODE, entity.labels().to_vec())
    }

    /// 按 id 匹配节点的条件
    ///
    /// 使用内部 id（生成的或合成的）时比较 `id(v)`，否则比较已分配 id 的图属性。
    pub fn id_condition(&self, entity: &PersistentEntity, variable: &str, param: &str) -> Condition {
        if entity.is_using_internal_ids() {
            Condition::internal_id_equals(variable, param)
        } else {
            Condition::property_equals(variable, entity.id_property().graph_name(), param)
        }
    }

    /// 返回根节点及其内部 id
    pub fn return_items(&self) -> Vec<String> {
        vec![
            NAME_OF_ROOT_NODE.to_string(),
            format!("id({NAME_OF_ROOT_NODE}) AS {NAME_OF_INTERNAL_ID}"),
        ]
    }

    pub fn prepare_match_of(
        &self,
        entity: &PersistentEntity,
        condition: Option<Condition>,
        sort: Option<&Sort>,
    ) -> MappingResult<QueryFragments> {
        reject_relationship_properties(entity)?;
        Ok(QueryFragments::builder()
            .match_on(self.root_node(entity))
            .maybe_condition(condition)
            .return_items(self.return_items())
            .maybe_order_by(order_by_fragment(sort)?)
            .build())
    }

    pub fn prepare_find_by_id(
        &self,
        entity: &PersistentEntity,
        id: Value,
    ) -> MappingResult<QueryFragmentsAndParameters> {
        let condition = self.id_condition(entity, NAME_OF_ROOT_NODE, NAME_OF_ID_PARAM);
        let fragments = self.prepare_match_of(entity, Some(condition), None)?;
        let parameters = BTreeMap::from([(NAME_OF_ID_PARAM.to_string(), id)]);
        Ok(QueryFragmentsAndParameters::new(fragments, parameters))
    }

    /// 读取需写入图的属性值，键为图属性名
    ///
    /// 内部 id、瞬态字段与关联不在其中。
    pub fn stored_values<A>(
        &self,
        entity: &PersistentEntity,
        accessor: &A,
    ) -> MappingResult<BTreeMap<String, Value>>
    where
        A: PropertyAccessor,
    {
        entity
            .stored_properties()
            .map(|p| Ok((p.graph_name().to_string(), accessor.get_property(p)?)))
            .collect()
    }

    /// 节点保存语句
    ///
    /// 属性以 `SET n += $__properties__` 增量合并，图中存在但实体未映射的属性保持不变。
    /// 带版本属性的实体在更新时附加乐观锁条件，并写入下一个版本号。
    pub fn prepare_save_of_node<A>(
        &self,
        entity: &PersistentEntity,
        accessor: &A,
    ) -> MappingResult<Statement>
    where
        A: PropertyAccessor,
    {
        reject_relationship_properties(entity)?;

        let id = accessor.get_property(entity.id_property())?;
        let mut properties = self.stored_values(entity, accessor)?;
        let mut parameters = BTreeMap::new();

        // 乐观锁条件与当前版本号，仅在更新（MATCH/MERGE）时使用
        let version_check = match entity.version_property() {
            Some(version) => {
                let current = accessor.get_property(version)?;
                let next = match &current {
                    Value::Null => 0,
                    Value::Integer(v) => {
                        v.checked_add(1)
                            .ok_or_else(|| MappingError::VersionOverflow {
                                type_name: entity.type_name(),
                                version: *v,
                            })?
                    }
                    other => {
                        return Err(MappingError::type_mismatch(
                            version.name(),
                            PropertyType::Integer.name(),
                            other.type_name(),
                        ));
                    }
                };
                properties.insert(version.graph_name().to_string(), Value::Integer(next));
                match current {
                    Value::Integer(_) => Some((
                        Condition::property_equals(
                            NAME_OF_ROOT_NODE,
                            version.graph_name(),
                            NAME_OF_VERSION_PARAM,
                        ),
                        current,
                    )),
                    _ => None,
                }
            }
            None => None,
        };

        let set_and_return = format!(
            "SET {NAME_OF_ROOT_NODE} += ${NAME_OF_PROPERTIES_PARAM} RETURN id({NAME_OF_ROOT_NODE})"
        );

        let cypher = if entity.is_using_internal_ids() {
            match id {
                Value::Null => format!("CREATE {} {set_and_return}", self.root_node(entity)),
                Value::Integer(_) => {
                    let condition = self.id_condition(entity, NAME_OF_ROOT_NODE, NAME_OF_ID_PARAM);
                    let condition = match version_check {
                        Some((v, current)) => {
                            parameters.insert(NAME_OF_VERSION_PARAM.to_string(), current);
                            condition.and(v)
                        }
                        None => condition,
                    };
                    parameters.insert(NAME_OF_ID_PARAM.to_string(), id);
                    format!("MATCH ({NAME_OF_ROOT_NODE}) WHERE {condition} {set_and_return}")
                }
                other => {
                    return Err(MappingError::type_mismatch(
                        entity.id_property().name(),
                        PropertyType::Integer.name(),
                        other.type_name(),
                    ));
                }
            }
        } else {
            if id.is_null() {
                return Err(MappingError::MissingIdValue {
                    type_name: entity.type_name(),
                });
            }
            parameters.insert(NAME_OF_ID_PARAM.to_string(), id);
            let merge = format!(
                "MERGE ({NAME_OF_ROOT_NODE}{} {{{}: ${NAME_OF_ID_PARAM}}})",
                labels_of(entity.labels()),
                escaped(entity.id_property().graph_name()),
            );
            match version_check {
                Some((v, current)) => {
                    parameters.insert(NAME_OF_VERSION_PARAM.to_string(), current);
                    format!("{merge} WITH {NAME_OF_ROOT_NODE} WHERE {v} {set_and_return}")
                }
                None => format!("{merge} {set_and_return}"),
            }
        };

        parameters.insert(NAME_OF_PROPERTIES_PARAM.to_string(), Value::Map(properties));

        tracing::trace!(entity = entity.type_name(), %cypher, "prepared node save");
        Ok(Statement::new(cypher, parameters))
    }

    /// 把数据库返回的内部 id 写回实体
    ///
    /// 合成 id 的实体需传入识别 `"id"` 的访问器。使用已分配 id 的实体不做任何事。
    pub fn populate_id<A>(
        &self,
        entity: &PersistentEntity,
        accessor: &mut A,
        internal_id: i64,
    ) -> MappingResult<()>
    where
        A: PropertyAccessor,
    {
        if !entity.is_using_internal_ids() {
            return Ok(());
        }
        accessor.set_property(entity.id_property(), Value::Integer(internal_id))
    }

    /// 关系保存语句：按 id 匹配两端节点后 `MERGE` 关系
    ///
    /// 关系目标为关系属性实体时，其属性以增量方式写到关系上。
    pub fn prepare_save_of_relationship(
        &self,
        owner: &PersistentEntity,
        relationship: &PersistentProperty,
        from_id: Value,
        to_id: Value,
        relationship_properties: Option<BTreeMap<String, Value>>,
    ) -> MappingResult<Statement> {
        let description = relationship.relationship().ok_or_else(|| {
            MappingError::unsupported(
                owner.type_name(),
                format!("`{}` is not a relationship", relationship.name()),
            )
        })?;
        let end = description.end_node_description();

        let start_node = self.start_node(owner);
        let start_condition = self.id_condition(owner, START_NODE_NAME, FROM_ID_PARAM);
        let (end_node, end_condition) = end_node_match(&end, END_NODE_NAME, TO_ID_PARAM);

        let mut cypher = format!(
            "MATCH {start_node} WHERE {start_condition} MATCH {end_node} WHERE {end_condition} MERGE {}",
            relationship_pattern(
                START_NODE_NAME,
                RELATIONSHIP_PROPERTIES_NAME,
                description.rel_type,
                description.direction,
                &format!("({END_NODE_NAME})"),
            )
        );

        let mut parameters = BTreeMap::from([
            (FROM_ID_PARAM.to_string(), from_id),
            (TO_ID_PARAM.to_string(), to_id),
        ]);

        if let Some(properties) = relationship_properties {
            cypher.push_str(&format!(
                " SET {RELATIONSHIP_PROPERTIES_NAME} += ${NAME_OF_PROPERTIES_PARAM}"
            ));
            parameters.insert(NAME_OF_PROPERTIES_PARAM.to_string(), Value::Map(properties));
        }
        cypher.push_str(&format!(" RETURN id({RELATIONSHIP_PROPERTIES_NAME})"));

        tracing::trace!(entity = owner.type_name(), rel_type = description.rel_type, %cypher, "prepared relationship save");
        Ok(Statement::new(cypher, parameters))
    }

    /// 删除起点节点上不再存在的关系（id 不在已知集合内的关系）
    pub fn prepare_delete_of(
        &self,
        owner: &PersistentEntity,
        relationship: &PersistentProperty,
        from_id: Value,
        known_relationship_ids: Vec<i64>,
    ) -> MappingResult<Statement> {
        let description = relationship.relationship().ok_or_else(|| {
            MappingError::unsupported(
                owner.type_name(),
                format!("`{}` is not a relationship", relationship.name()),
            )
        })?;
        let end = description.end_node_description();

        let condition = self
            .id_condition(owner, START_NODE_NAME, FROM_ID_PARAM)
            .and(
                Condition::internal_id_in(RELATIONSHIP_NAME, NAME_OF_KNOWN_RELATIONSHIP_IDS_PARAM)
                    .not(),
            );

        let cypher = format!(
            "MATCH {} WHERE {condition} DELETE {RELATIONSHIP_NAME}",
            relationship_pattern(
                &self.start_node(owner).to_string(),
                RELATIONSHIP_NAME,
                description.rel_type,
                description.direction,
                &format!("({})", labels_of(&end.effective_labels())),
            )
        );

        let parameters = BTreeMap::from([
            (FROM_ID_PARAM.to_string(), from_id),
            (
                NAME_OF_KNOWN_RELATIONSHIP_IDS_PARAM.to_string(),
                Value::List(known_relationship_ids.into_iter().map(Value::Integer).collect()),
            ),
        ]);

        Ok(Statement::new(cypher, parameters))
    }

    /// 关系起点：使用内部 id 时不带标签
    fn start_node(&self, owner: &PersistentEntity) -> NodePattern {
        if owner.is_using_internal_ids() {
            NodePattern::anonymous(START_NODE_NAME)
        } else {
            NodePattern::new(START_NODE_NAME, owner.labels().to_vec())
        }
    }
}

fn reject_relationship_properties(entity: &PersistentEntity) -> MappingResult<()> {
    if entity.is_relationship_properties() {
        return Err(MappingError::unsupported(
            entity.type_name(),
            "relationship properties are stored on their relationship, not as a node",
        ));
    }
    Ok(())
}

fn labels_of(labels: &[&'static str]) -> String {
    labels.iter().map(|l| format!(":{}", escaped(l))).collect()
}

/// 关系终点的匹配；按静态描述判断是否使用内部 id
fn end_node_match(end: &EntityDescription, variable: &str, param: &str) -> (NodePattern, Condition) {
    match end.id_properties().next() {
        Some(id) if id.id == IdKind::Assigned || id.property_type != PropertyType::Integer => (
            NodePattern::new(variable, end.effective_labels()),
            Condition::property_equals(variable, id.graph_name, param),
        ),
        _ => (
            NodePattern::anonymous(variable),
            Condition::internal_id_equals(variable, param),
        ),
    }
}

fn relationship_pattern(
    start: &str,
    variable: &str,
    rel_type: &str,
    direction: Direction,
    end: &str,
) -> String {
    let start = if start.starts_with('(') {
        start.to_string()
    } else {
        format!("({start})")
    };
    let rel = format!("[{variable}:{}]", escaped(rel_type));
    match direction {
        Direction::Outgoing => format!("{start}-{rel}->{end}"),
        Direction::Incoming => format!("{start}<-{rel}-{end}"),
    }
}
