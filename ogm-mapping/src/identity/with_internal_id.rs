use std::any::type_name;
use std::fmt;
use std::ops::{Deref, DerefMut};

use super::{HasInternalId, IdHolder};
use crate::entity::{NodeEntity, PropertyAccess};
use crate::error::MappingResult;
use crate::metadata::{EntityKind, PropertyDescription};
use crate::value::Value;

/// 为不声明 id 字段的实体附加内部标识能力的包装
///
/// - 持有原始实体 `target` 与唯一的 `IdHolder`，二者同生命周期；
/// - 通过 `Deref`/`DerefMut` 暴露 `target` 的全部方法，调用行为与直接调用 `target` 完全一致；
/// - 仅 `HasInternalId` 的读写落在 `IdHolder` 上，其它一切（包括 `PropertyAccess`）转发给 `target`。
///
/// 包装是一个新对象：通过包装写入的 id 不会反映到被移入前的原实例上（原实例已被移动），
/// `into_inner` 取回实体时 id 随包装一起丢弃。
#[derive(Clone, Default)]
pub struct WithInternalId<T> {
    target: T,
    holder: IdHolder,
}

impl<T> WithInternalId<T> {
    pub fn new(target: T) -> Self {
        tracing::trace!(entity = type_name::<T>(), "attaching internal id holder");
        Self {
            target,
            holder: IdHolder::new(),
        }
    }

    /// 以已知 id 构造（例如从查询结果还原）
    pub fn with_id(target: T, id: i64) -> Self {
        let mut wrapped = Self::new(target);
        wrapped.holder.set(id);
        wrapped
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_inner(self) -> T {
        self.target
    }

    pub fn into_parts(self) -> (T, Option<i64>) {
        (self.target, self.holder.get())
    }
}

impl<T> HasInternalId for WithInternalId<T> {
    fn internal_id(&self) -> Option<i64> {
        self.holder.get()
    }

    fn set_internal_id(&mut self, id: i64) {
        self.holder.set(id);
    }

    fn clear_internal_id(&mut self) {
        self.holder.clear();
    }
}

impl<T> Deref for WithInternalId<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.target
    }
}

impl<T> DerefMut for WithInternalId<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.target
    }
}

impl<T> AsRef<T> for WithInternalId<T> {
    fn as_ref(&self) -> &T {
        &self.target
    }
}

impl<T> AsMut<T> for WithInternalId<T> {
    fn as_mut(&mut self) -> &mut T {
        &mut self.target
    }
}

impl<T> From<T> for WithInternalId<T> {
    fn from(target: T) -> Self {
        Self::new(target)
    }
}

impl<T: fmt::Debug> fmt::Debug for WithInternalId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithInternalId")
            .field("id", &self.holder.get())
            .field("target", &self.target)
            .finish()
    }
}

// 相等性与 target 一致，id 不参与比较
impl<T: PartialEq> PartialEq for WithInternalId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl<T: PartialEq> PartialEq<T> for WithInternalId<T> {
    fn eq(&self, other: &T) -> bool {
        &self.target == other
    }
}

impl<T: NodeEntity> NodeEntity for WithInternalId<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;
    const LABELS: &'static [&'static str] = T::LABELS;
    const KIND: EntityKind = T::KIND;
    const PROPERTIES: &'static [PropertyDescription] = T::PROPERTIES;
}

impl<T: PropertyAccess> PropertyAccess for WithInternalId<T> {
    fn read_property(&self, name: &str) -> MappingResult<Value> {
        self.target.read_property(name)
    }

    fn write_property(&mut self, name: &str, value: Value) -> MappingResult<()> {
        self.target.write_property(name, value)
    }

    fn with_property(self, name: &str, value: Value) -> MappingResult<Self> {
        let Self { target, holder } = self;
        Ok(Self {
            target: target.with_property(name, value)?,
            holder,
        })
    }
}
