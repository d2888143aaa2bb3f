//! 映射元数据（metadata）
//!
//! - `EntityDescription`/`PropertyDescription`：编译期常量形式的静态描述（通常由宏生成）；
//! - `PersistentProperty`：声明属性与合成 id 属性的标签联合；
//! - `PersistentEntity`：注册阶段校验后的运行期元数据。

mod description;
mod persistent_entity;
mod property;

pub use description::{
    Direction, EntityDescription, EntityKind, IdKind, PropertyDescription,
    RelationshipDescription,
};
pub use persistent_entity::PersistentEntity;
pub use property::{DeclaredProperty, PersistentProperty, SYNTHETIC_ID, SyntheticIdProperty};
