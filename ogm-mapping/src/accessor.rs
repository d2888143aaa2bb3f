//! 属性访问器（Property Accessor）
//!
//! 映射层通过统一的 `PropertyAccessor` 读写实体属性，而不是直接访问字段：
//! - `BeanPropertyAccessor`：原地修改实体；
//! - `InstantiatingPropertyAccessor`：不可变风格实体，每次写入产生新实例并替换持有的实体；
//! - `IdentityAwarePropertyAccessor`：把内部 id 属性（合成 `"id"` 或数据库生成的 id 字段）的读写
//!   路由到内部标识能力，其余（包括普通的、恰好名为 `id` 的字段）原样委托。
//!
use crate::entity::PropertyAccess;
use crate::error::{MappingError, MappingResult};
use crate::identity::{HasInternalId, IdentityCapable};
use crate::metadata::{PersistentProperty, SYNTHETIC_ID};
use crate::value::Value;

/// 针对单个实体实例的属性访问
pub trait PropertyAccessor {
    type Bean;

    fn set_property(&mut self, property: &PersistentProperty, value: Value) -> MappingResult<()>;

    fn get_property(&self, property: &PersistentProperty) -> MappingResult<Value>;

    /// 当前持有的实体（写入后可能已被替换为新实例）
    fn bean(&self) -> &Self::Bean;

    fn bean_mut(&mut self) -> &mut Self::Bean;

    fn into_bean(self) -> Self::Bean
    where
        Self: Sized;
}

/// 为任意实例创建普通属性访问器
pub trait PropertyAccessorFactory<B> {
    type Accessor: PropertyAccessor<Bean = B>;

    fn accessor_for(&self, bean: B) -> Self::Accessor;
}

impl<B, A, F> PropertyAccessorFactory<B> for F
where
    F: Fn(B) -> A,
    A: PropertyAccessor<Bean = B>,
{
    type Accessor = A;

    fn accessor_for(&self, bean: B) -> Self::Accessor {
        self(bean)
    }
}

/// 原地读写实体字段的访问器
#[derive(Debug, Clone)]
pub struct BeanPropertyAccessor<B> {
    bean: B,
}

impl<B> BeanPropertyAccessor<B> {
    pub fn new(bean: B) -> Self {
        Self { bean }
    }
}

impl<B: PropertyAccess> PropertyAccessor for BeanPropertyAccessor<B> {
    type Bean = B;

    fn set_property(&mut self, property: &PersistentProperty, value: Value) -> MappingResult<()> {
        self.bean.write_property(property.name(), value)
    }

    fn get_property(&self, property: &PersistentProperty) -> MappingResult<Value> {
        self.bean.read_property(property.name())
    }

    fn bean(&self) -> &B {
        &self.bean
    }

    fn bean_mut(&mut self) -> &mut B {
        &mut self.bean
    }

    fn into_bean(self) -> B {
        self.bean
    }
}

/// 不可变风格实体的访问器：写入经由 `with_property` 产生新实例
///
/// 写入失败时保持原实例不变。
#[derive(Debug, Clone)]
pub struct InstantiatingPropertyAccessor<B> {
    bean: B,
}

impl<B> InstantiatingPropertyAccessor<B> {
    pub fn new(bean: B) -> Self {
        Self { bean }
    }
}

impl<B: PropertyAccess + Clone> PropertyAccessor for InstantiatingPropertyAccessor<B> {
    type Bean = B;

    fn set_property(&mut self, property: &PersistentProperty, value: Value) -> MappingResult<()> {
        self.bean = self.bean.clone().with_property(property.name(), value)?;
        Ok(())
    }

    fn get_property(&self, property: &PersistentProperty) -> MappingResult<Value> {
        self.bean.read_property(property.name())
    }

    fn bean(&self) -> &B {
        &self.bean
    }

    fn bean_mut(&mut self) -> &mut B {
        &mut self.bean
    }

    fn into_bean(self) -> B {
        self.bean
    }
}

/// 识别内部 id 属性的访问器
///
/// 构造时若实体尚不具备内部标识能力则先包装（见 `IdentityCapable`），再由工厂为
/// （可能已包装的）实体创建普通访问器。之后：
/// - 合成 `"id"` 或数据库生成的 id 字段的读写落在内部标识能力上，只接受 `Integer`（`Null` 表示清空）；
/// - 其它属性原样委托给普通访问器，包括其类型转换与实例替换行为。
#[derive(Debug, Clone)]
pub struct IdentityAwarePropertyAccessor<A> {
    delegate: A,
}

impl<A> IdentityAwarePropertyAccessor<A> {
    pub fn new<T, F>(factory: F, bean: T) -> Self
    where
        T: IdentityCapable,
        F: PropertyAccessorFactory<T::Identified, Accessor = A>,
    {
        let identified = bean.into_identified();
        Self {
            delegate: factory.accessor_for(identified),
        }
    }

    pub fn delegate(&self) -> &A {
        &self.delegate
    }
}

impl<I> IdentityAwarePropertyAccessor<BeanPropertyAccessor<I>> {
    pub fn for_bean<T>(bean: T) -> Self
    where
        T: IdentityCapable<Identified = I>,
        I: HasInternalId + PropertyAccess,
    {
        Self::new(BeanPropertyAccessor::<I>::new, bean)
    }
}

impl<I> IdentityAwarePropertyAccessor<InstantiatingPropertyAccessor<I>> {
    pub fn instantiating<T>(bean: T) -> Self
    where
        T: IdentityCapable<Identified = I>,
        I: HasInternalId + PropertyAccess + Clone,
    {
        Self::new(InstantiatingPropertyAccessor::<I>::new, bean)
    }
}

// 只看属性角色，不看名称
fn is_internal_id(property: &PersistentProperty) -> bool {
    property.is_internal_id_property()
}

impl<A> PropertyAccessor for IdentityAwarePropertyAccessor<A>
where
    A: PropertyAccessor,
    A::Bean: HasInternalId,
{
    type Bean = A::Bean;

    fn set_property(&mut self, property: &PersistentProperty, value: Value) -> MappingResult<()> {
        if !is_internal_id(property) {
            return self.delegate.set_property(property, value);
        }

        let id = match value {
            Value::Integer(id) => Some(id),
            Value::Null => None,
            other => {
                return Err(MappingError::type_mismatch(
                    property.name(),
                    "Integer",
                    other.type_name(),
                ));
            }
        };
        tracing::trace!(?id, "routing id write to internal id holder");
        SYNTHETIC_ID.set(self.delegate.bean_mut(), id);
        Ok(())
    }

    fn get_property(&self, property: &PersistentProperty) -> MappingResult<Value> {
        if !is_internal_id(property) {
            return self.delegate.get_property(property);
        }
        Ok(SYNTHETIC_ID
            .get(self.delegate.bean())
            .map(Value::Integer)
            .unwrap_or(Value::Null))
    }

    fn bean(&self) -> &Self::Bean {
        self.delegate.bean()
    }

    fn bean_mut(&mut self) -> &mut Self::Bean {
        self.delegate.bean_mut()
    }

    fn into_bean(self) -> Self::Bean {
        self.delegate.into_bean()
    }
}
