//! 映射层统一错误定义
//!
//! 覆盖实体注册（元数据校验）、属性读写（类型/名称）、排序片段与序列化等最小必要集合。
//! 被包装实体自身方法产生的错误不经过此类型，原样透传给调用方。
//!
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MappingError {
    // --- 实体注册 / 元数据 ---
    #[error("unsupported entity type `{type_name}`: {reason}")]
    UnsupportedEntityType {
        type_name: &'static str,
        reason: String,
    },
    #[error("entity `{type_name}` has no id property")]
    MissingIdProperty { type_name: &'static str },
    #[error("entity `{type_name}` must have an assigned id before it can be saved")]
    MissingIdValue { type_name: &'static str },
    #[error("version of entity `{type_name}` cannot be incremented past {version}")]
    VersionOverflow { type_name: &'static str, version: i64 },

    // --- 属性访问 ---
    #[error("type mismatch on property `{property}`: expected={expected}, found={found}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown property `{property}` on entity `{type_name}`")]
    UnknownProperty {
        type_name: &'static str,
        property: String,
    },
    #[error("property `{property}` on entity `{type_name}` is an association, not a value")]
    NotValueProperty {
        type_name: &'static str,
        property: String,
    },

    // --- Cypher 片段 ---
    #[error(
        "Cannot handle order property `{property}`, it must be a simple property or one-hop path."
    )]
    InvalidSortProperty { property: String },
    #[error("Name must be a valid identifier.")]
    InvalidIdentifier { name: String },

    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
}

/// 统一 Result 类型别名
pub type MappingResult<T> = Result<T, MappingError>;

impl MappingError {
    pub(crate) fn type_mismatch(
        property: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        MappingError::TypeMismatch {
            property: property.into(),
            expected,
            found,
        }
    }

    pub(crate) fn unsupported(type_name: &'static str, reason: impl Into<String>) -> Self {
        MappingError::UnsupportedEntityType {
            type_name,
            reason: reason.into(),
        }
    }
}
