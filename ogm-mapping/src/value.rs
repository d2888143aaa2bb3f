//! 属性值（Value）
//!
//! 图数据库节点/关系属性在映射层中的统一表示，以及 Rust 字段类型与其之间的转换。
//! 转换从不做隐式强制：类型不符时返回带类型信息的错误，而不是存入错误类型的值。
//!
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MappingError, MappingResult};

/// 属性值
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::DateTime(_) => "DateTime",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// 从 JSON 文本解析属性值（如驱动返回的参数或记录）
    pub fn from_json_str(json: &str) -> MappingResult<Value> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        Ok(parsed.into())
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Value::from(f),
            Value::String(s) => serde_json::Value::String(s),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// 属性在图中的存储类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    Boolean,
    Integer,
    Float,
    String,
    DateTime,
    List,
    Map,
    /// 指向其它实体的关联，不是可直接读写的值
    Relationship,
}

impl PropertyType {
    pub const fn name(&self) -> &'static str {
        match self {
            PropertyType::Boolean => "Boolean",
            PropertyType::Integer => "Integer",
            PropertyType::Float => "Float",
            PropertyType::String => "String",
            PropertyType::DateTime => "DateTime",
            PropertyType::List => "List",
            PropertyType::Map => "Map",
            PropertyType::Relationship => "Relationship",
        }
    }
}

/// Rust 字段类型 -> 图存储类型（编译期常量，供过程宏生成静态元数据）
pub trait GraphType {
    const PROPERTY_TYPE: PropertyType;
}

/// 将字段值转换为 `Value`
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// 从 `Value` 还原字段值
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueTypeError>;
}

/// 值类型不符（尚未关联到具体属性）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTypeError {
    pub expected: &'static str,
    pub found: &'static str,
}

impl ValueTypeError {
    pub fn new(expected: &'static str, value: &Value) -> Self {
        Self {
            expected,
            found: value.type_name(),
        }
    }

    /// 附加属性名，转换为统一错误
    pub fn for_property(self, property: impl Into<String>) -> MappingError {
        MappingError::type_mismatch(property, self.expected, self.found)
    }
}

macro_rules! scalar_value {
    ($ty:ty, $pt:ident, $variant:ident) => {
        impl GraphType for $ty {
            const PROPERTY_TYPE: PropertyType = PropertyType::$pt;
        }

        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, ValueTypeError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(ValueTypeError::new(PropertyType::$pt.name(), &other)),
                }
            }
        }
    };
}

scalar_value!(bool, Boolean, Boolean);
scalar_value!(i64, Integer, Integer);
scalar_value!(f64, Float, Float);
scalar_value!(String, String, String);
scalar_value!(DateTime<Utc>, DateTime, DateTime);

impl GraphType for i32 {
    const PROPERTY_TYPE: PropertyType = PropertyType::Integer;
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Integer(v) => i32::try_from(v).map_err(|_| ValueTypeError {
                expected: "Integer(i32)",
                found: "Integer(i64)",
            }),
            other => Err(ValueTypeError::new("Integer", &other)),
        }
    }
}

// UUID 以字符串形式存储
impl GraphType for Uuid {
    const PROPERTY_TYPE: PropertyType = PropertyType::String;
}

impl ToValue for Uuid {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match &value {
            Value::String(s) => Uuid::parse_str(s).map_err(|_| ValueTypeError {
                expected: "String(uuid)",
                found: "String",
            }),
            other => Err(ValueTypeError::new("String", other)),
        }
    }
}

impl<T: GraphType> GraphType for Option<T> {
    const PROPERTY_TYPE: PropertyType = T::PROPERTY_TYPE;
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T> GraphType for Vec<T> {
    const PROPERTY_TYPE: PropertyType = PropertyType::List;
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ValueTypeError::new("List", &other)),
        }
    }
}

impl<V> GraphType for BTreeMap<String, V> {
    const PROPERTY_TYPE: PropertyType = PropertyType::Map;
}

impl<V: ToValue> ToValue for BTreeMap<String, V> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<V: FromValue> FromValue for BTreeMap<String, V> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| V::from_value(v).map(|v| (k, v)))
                .collect(),
            other => Err(ValueTypeError::new("Map", &other)),
        }
    }
}

impl<V> GraphType for HashMap<String, V> {
    const PROPERTY_TYPE: PropertyType = PropertyType::Map;
}

impl<V: ToValue> ToValue for HashMap<String, V> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<V: FromValue> FromValue for HashMap<String, V> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| V::from_value(v).map(|v| (k, v)))
                .collect(),
            other => Err(ValueTypeError::new("Map", &other)),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}
