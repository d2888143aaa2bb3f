//! 标识（Identity）子系统
//!
//! 让不声明 id 字段的实体也能被映射层当作拥有 `id` 属性的实体处理：
//! - `IdHolder`：最小的可变标识单元；
//! - `HasInternalId`：内部标识能力；
//! - `WithInternalId`：组合原实体与 `IdHolder` 的包装，除标识读写外一律转发；
//! - `IdentityCapable`：显式标记一个类型如何获得内部标识能力（原生字段或包装）。
//!
//! 能力集合在编译期由 `#[node]` 宏确定，而不是在运行时做类型探测。
//!
mod id_holder;
mod with_internal_id;

pub use id_holder::{HasInternalId, IdHolder, InternalIdField};
pub use with_internal_id::WithInternalId;

/// 获得内部标识能力的方式
///
/// - 拥有 `#[id] #[generated_value]` 的 `i64` 字段的实体：`Identified = Self`，`NATIVE_ID = true`；
/// - 没有 id 字段的实体：`Identified = WithInternalId<Self>`，`NATIVE_ID = false`；
/// - `WithInternalId<T>` 本身：原样返回，保证重复包装是空操作；
/// - 使用业务分配 id（如 `String`）的实体不实现该 trait。
pub trait IdentityCapable: Sized {
    /// 是否由实体自身的字段承载 id
    const NATIVE_ID: bool;

    /// 具备 `HasInternalId` 能力的形态
    type Identified: HasInternalId;

    fn into_identified(self) -> Self::Identified;
}

impl<T> IdentityCapable for WithInternalId<T> {
    const NATIVE_ID: bool = false;
    type Identified = Self;

    fn into_identified(self) -> Self::Identified {
        self
    }
}

/// 为实体附加内部标识能力；已具备该能力时不做任何包装
pub fn with_internal_id<T: IdentityCapable>(target: T) -> T::Identified {
    target.into_identified()
}
