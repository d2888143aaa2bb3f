//! 映射上下文（Mapping Context）
//!
//! 按实体类型缓存校验后的 `PersistentEntity`，并为实体实例提供属性访问器。
//! 不支持的实体映射在注册时即报错（错误信息包含实体类型名），
//! 之后的属性访问不会再遇到此类错误。
//!
use std::any::TypeId;
use std::sync::Arc;

use bon::Builder;
use dashmap::DashMap;

use crate::accessor::{BeanPropertyAccessor, IdentityAwarePropertyAccessor};
use crate::entity::{NodeEntity, PropertyAccess};
use crate::error::{MappingError, MappingResult};
use crate::identity::IdentityCapable;
use crate::metadata::PersistentEntity;

/// 映射上下文
///
/// ```rust
/// use ogm_mapping::context::MappingContext;
///
/// let ctx = MappingContext::builder().allow_synthetic_ids(false).build();
/// assert!(!ctx.allow_synthetic_ids());
/// assert_eq!(ctx.registered_count(), 0);
/// ```
#[derive(Builder, Debug)]
pub struct MappingContext {
    /// 是否允许没有 id 字段的实体（使用合成 id）
    #[builder(default = true)]
    allow_synthetic_ids: bool,

    #[builder(skip)]
    entities: DashMap<TypeId, Arc<PersistentEntity>>,
}

impl Default for MappingContext {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MappingContext {
    pub fn allow_synthetic_ids(&self) -> bool {
        self.allow_synthetic_ids
    }

    pub fn registered_count(&self) -> usize {
        self.entities.len()
    }

    /// 注册实体类型（幂等），返回其元数据
    pub fn register<T>(&self) -> MappingResult<Arc<PersistentEntity>>
    where
        T: NodeEntity + 'static,
    {
        let key = TypeId::of::<T>();
        if let Some(existing) = self.entities.get(&key) {
            return Ok(Arc::clone(existing.value()));
        }

        let entity = PersistentEntity::from_description(T::description(), self.allow_synthetic_ids)
            .inspect_err(|e| tracing::warn!(entity = T::TYPE_NAME, error = %e, "rejected entity"))?;

        tracing::debug!(
            entity = T::TYPE_NAME,
            labels = ?entity.labels(),
            synthetic_id = entity.uses_synthetic_id(),
            "registered entity"
        );

        let entity = self.entities.entry(key).or_insert(Arc::new(entity));
        Ok(Arc::clone(entity.value()))
    }

    pub fn persistent_entity<T>(&self) -> MappingResult<Arc<PersistentEntity>>
    where
        T: NodeEntity + 'static,
    {
        self.register::<T>()
    }

    /// 实体是否自带 id 字段；决定是否需要合成 id 路径
    pub fn has_native_id<T>(&self) -> MappingResult<bool>
    where
        T: NodeEntity + 'static,
    {
        Ok(self.register::<T>()?.has_native_id())
    }

    /// 普通属性访问器（不识别合成 id）
    pub fn property_accessor<T>(&self, bean: T) -> MappingResult<BeanPropertyAccessor<T>>
    where
        T: NodeEntity + PropertyAccess + 'static,
    {
        self.register::<T>()?;
        Ok(BeanPropertyAccessor::new(bean))
    }

    /// 识别 `"id"` 属性的访问器；实体尚无内部标识能力时先包装
    pub fn identity_aware_accessor<T>(
        &self,
        bean: T,
    ) -> MappingResult<IdentityAwarePropertyAccessor<BeanPropertyAccessor<T::Identified>>>
    where
        T: NodeEntity + IdentityCapable + 'static,
        T::Identified: PropertyAccess,
    {
        let entity = self.register::<T>()?;

        if T::NATIVE_ID != entity.has_native_id() {
            return Err(MappingError::unsupported(
                T::TYPE_NAME,
                format!(
                    "identity capability declares native id = {}, but the mapping {} an id property",
                    T::NATIVE_ID,
                    if entity.has_native_id() { "declares" } else { "lacks" }
                ),
            ));
        }
        if !entity.is_using_internal_ids() {
            return Err(MappingError::unsupported(
                T::TYPE_NAME,
                "assigned ids cannot be routed through the internal id holder",
            ));
        }

        Ok(IdentityAwarePropertyAccessor::for_bean(bean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{EntityKind, IdKind, PropertyDescription};
    use crate::value::{PropertyType, Value};

    #[derive(Debug, Default)]
    struct Plain;

    impl NodeEntity for Plain {
        const TYPE_NAME: &'static str = "Plain";
        const LABELS: &'static [&'static str] = &[];
        const KIND: EntityKind = EntityKind::Node;
        const PROPERTIES: &'static [PropertyDescription] = &[];
    }

    impl PropertyAccess for Plain {
        fn read_property(&self, name: &str) -> MappingResult<Value> {
            Err(MappingError::UnknownProperty {
                type_name: Self::TYPE_NAME,
                property: name.to_string(),
            })
        }

        fn write_property(&mut self, name: &str, _value: Value) -> MappingResult<()> {
            Err(MappingError::UnknownProperty {
                type_name: Self::TYPE_NAME,
                property: name.to_string(),
            })
        }
    }

    // 手写实现与映射描述不一致：声称自带 id，实际没有 id 字段
    impl IdentityCapable for Plain {
        const NATIVE_ID: bool = true;
        type Identified = crate::identity::WithInternalId<Self>;

        fn into_identified(self) -> Self::Identified {
            crate::identity::WithInternalId::new(self)
        }
    }

    struct Assigned;

    impl NodeEntity for Assigned {
        const TYPE_NAME: &'static str = "Assigned";
        const LABELS: &'static [&'static str] = &["Assigned"];
        const KIND: EntityKind = EntityKind::Node;
        const PROPERTIES: &'static [PropertyDescription] =
            &[PropertyDescription::new("id", PropertyType::String).id(IdKind::Assigned)];
    }

    #[test]
    fn registration_is_cached() {
        let ctx = MappingContext::default();
        let a = ctx.register::<Plain>().unwrap();
        let b = ctx.persistent_entity::<Plain>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(ctx.registered_count(), 1);
    }

    #[test]
    fn native_id_lookup() {
        let ctx = MappingContext::default();
        assert!(!ctx.has_native_id::<Plain>().unwrap());
        assert!(ctx.has_native_id::<Assigned>().unwrap());
    }

    #[test]
    fn disabled_synthetic_ids_fail_at_registration() {
        let ctx = MappingContext::builder().allow_synthetic_ids(false).build();
        let err = ctx.register::<Plain>().unwrap_err();
        assert!(err.to_string().contains("`Plain`"));
        assert_eq!(ctx.registered_count(), 0);
        assert!(ctx.has_native_id::<Assigned>().unwrap());
    }

    #[test]
    fn inconsistent_marker_is_rejected_before_wrapping() {
        let ctx = MappingContext::default();
        let err = ctx.identity_aware_accessor(Plain).unwrap_err();
        assert!(matches!(
            err,
            MappingError::UnsupportedEntityType {
                type_name: "Plain",
                ..
            }
        ));
    }
}
