use std::collections::BTreeMap;
use std::fmt;

use bon::Builder;
use serde::Serialize;

use crate::value::Value;

pub const NAME_OF_ROOT_NODE: &str = "n";
pub const NAME_OF_INTERNAL_ID: &str = "__internalNeo4jId__";
pub const NAME_OF_ID_PARAM: &str = "__id__";
pub const NAME_OF_PROPERTIES_PARAM: &str = "__properties__";
pub const NAME_OF_VERSION_PARAM: &str = "__version__";
pub const NAME_OF_KNOWN_RELATIONSHIP_IDS_PARAM: &str = "__knownRelationShipIds__";

pub const START_NODE_NAME: &str = "startNode";
pub const END_NODE_NAME: &str = "endNode";
pub const RELATIONSHIP_NAME: &str = "rel";
pub const RELATIONSHIP_PROPERTIES_NAME: &str = "relProps";
pub const FROM_ID_PARAM: &str = "fromId";
pub const TO_ID_PARAM: &str = "toId";

/// 以反引号转义的符号名
pub(crate) fn escaped(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// 查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `id(v) = $param`
    InternalIdEquals { variable: String, param: String },
    /// `v.prop = $param`
    PropertyEquals {
        variable: String,
        property: String,
        param: String,
    },
    /// `id(v) IN $param`
    InternalIdIn { variable: String, param: String },
    And(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn internal_id_equals(variable: impl Into<String>, param: impl Into<String>) -> Self {
        Condition::InternalIdEquals {
            variable: variable.into(),
            param: param.into(),
        }
    }

    pub fn property_equals(
        variable: impl Into<String>,
        property: impl Into<String>,
        param: impl Into<String>,
    ) -> Self {
        Condition::PropertyEquals {
            variable: variable.into(),
            property: property.into(),
            param: param.into(),
        }
    }

    pub fn internal_id_in(variable: impl Into<String>, param: impl Into<String>) -> Self {
        Condition::InternalIdIn {
            variable: variable.into(),
            param: param.into(),
        }
    }

    pub fn and(self, other: Condition) -> Self {
        Condition::And(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Condition::Not(Box::new(self))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::InternalIdEquals { variable, param } => {
                write!(f, "id({variable}) = ${param}")
            }
            Condition::PropertyEquals {
                variable,
                property,
                param,
            } => write!(f, "{variable}.{} = ${param}", escaped(property)),
            Condition::InternalIdIn { variable, param } => write!(f, "id({variable}) IN ${param}"),
            Condition::And(left, right) => write!(f, "{left} AND {right}"),
            Condition::Not(inner) => match inner.as_ref() {
                Condition::And(..) => write!(f, "NOT ({inner})"),
                _ => write!(f, "NOT {inner}"),
            },
        }
    }
}

/// 节点模式 `(v:Label1:Label2)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePattern {
    pub variable: String,
    pub labels: Vec<&'static str>,
}

impl NodePattern {
    pub fn new(variable: impl Into<String>, labels: Vec<&'static str>) -> Self {
        Self {
            variable: variable.into(),
            labels,
        }
    }

    /// 不带标签的节点
    pub fn anonymous(variable: impl Into<String>) -> Self {
        Self::new(variable, Vec::new())
    }
}

impl fmt::Display for NodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.variable)?;
        for label in &self.labels {
            write!(f, ":{}", escaped(label))?;
        }
        write!(f, ")")
    }
}

/// 一条 `MATCH` 查询的结构化片段，由 `StatementRenderer` 渲染为文本
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct QueryFragments {
    match_on: NodePattern,
    condition: Option<Condition>,
    #[builder(default)]
    return_items: Vec<String>,
    order_by: Option<String>,
    skip: Option<u64>,
    limit: Option<u64>,
}

impl QueryFragments {
    pub fn match_on(&self) -> &NodePattern {
        &self.match_on
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn return_items(&self) -> &[String] {
        &self.return_items
    }

    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn skip(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }
}

/// 查询片段及其参数
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFragmentsAndParameters {
    pub fragments: QueryFragments,
    pub parameters: BTreeMap<String, Value>,
}

impl QueryFragmentsAndParameters {
    pub fn new(fragments: QueryFragments, parameters: BTreeMap<String, Value>) -> Self {
        Self {
            fragments,
            parameters,
        }
    }

    pub fn render(&self, renderer: &impl StatementRenderer) -> Statement {
        Statement::new(renderer.render(&self.fragments), self.parameters.clone())
    }
}

/// 可执行语句：Cypher 文本与参数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub cypher: String,
    pub parameters: BTreeMap<String, Value>,
}

impl Statement {
    pub fn new(cypher: impl Into<String>, parameters: BTreeMap<String, Value>) -> Self {
        Self {
            cypher: cypher.into(),
            parameters,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }
}

/// 将查询片段渲染为 Cypher 文本
pub trait StatementRenderer {
    fn render(&self, fragments: &QueryFragments) -> String;
}

/// 默认渲染：`MATCH .. WHERE .. RETURN .. ORDER BY .. SKIP .. LIMIT ..`
#[derive(Debug, Default, Clone, Copy)]
pub struct CypherRenderer;

impl StatementRenderer for CypherRenderer {
    fn render(&self, fragments: &QueryFragments) -> String {
        let mut cypher = format!("MATCH {}", fragments.match_on());
        if let Some(condition) = fragments.condition() {
            cypher.push_str(&format!(" WHERE {condition}"));
        }
        let return_items = match fragments.return_items() {
            [] => fragments.match_on().variable.clone(),
            items => items.join(", "),
        };
        cypher.push_str(&format!(" RETURN {return_items}"));
        if let Some(order_by) = fragments.order_by() {
            cypher.push(' ');
            cypher.push_str(order_by);
        }
        if let Some(skip) = fragments.skip() {
            cypher.push_str(&format!(" SKIP {skip}"));
        }
        if let Some(limit) = fragments.limit() {
            cypher.push_str(&format!(" LIMIT {limit}"));
        }
        cypher
    }
}
