use crate::error::{MappingError, MappingResult};
use crate::value::Value;

/// 内部标识（数据库分配的 id）能力
///
/// 具备该能力的对象可以被映射层当作拥有 `id` 属性的实体对待。
pub trait HasInternalId {
    /// 当前内部标识；从未赋值时为 `None`
    fn internal_id(&self) -> Option<i64>;

    /// 写入内部标识，允许覆盖（保存后由服务端生成新 id 的场景）
    fn set_internal_id(&mut self, id: i64);

    /// 清空内部标识
    fn clear_internal_id(&mut self);
}

/// 最小的可变标识单元
///
/// 每个被包装的实体实例持有一个，与包装对象同生命周期，不做任何校验。
/// 非线程安全：同一实体实例的并发修改由调用方负责。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdHolder {
    id: Option<i64>,
}

impl IdHolder {
    pub const fn new() -> Self {
        Self { id: None }
    }

    pub const fn get(&self) -> Option<i64> {
        self.id
    }

    pub fn set(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub fn clear(&mut self) {
        self.id = None;
    }
}

impl HasInternalId for IdHolder {
    fn internal_id(&self) -> Option<i64> {
        self.get()
    }

    fn set_internal_id(&mut self, id: i64) {
        self.set(id);
    }

    fn clear_internal_id(&mut self) {
        self.clear();
    }
}

/// 可作为原生内部标识的字段类型
///
/// 过程宏为带 `#[id] #[generated_value]` 的字段生成 `HasInternalId` 与属性读写时都经由此 trait，
/// 因此普通访问器与识别 id 的访问器看到的是同一个值。
pub trait InternalIdField {
    fn read_id(&self) -> Option<i64>;
    fn write_id(&mut self, id: Option<i64>);

    /// 以属性值读取，未赋值为 `Null`
    fn id_value(&self) -> Value {
        self.read_id().map(Value::Integer).unwrap_or(Value::Null)
    }

    /// 以属性值写入，只接受 `Integer` 与 `Null`
    fn set_id_value(&mut self, property: &str, value: Value) -> MappingResult<()> {
        let id = match value {
            Value::Integer(id) => Some(id),
            Value::Null => None,
            other => {
                return Err(MappingError::type_mismatch(
                    property,
                    "Integer",
                    other.type_name(),
                ));
            }
        };
        self.write_id(id);
        Ok(())
    }
}

impl InternalIdField for Option<i64> {
    fn read_id(&self) -> Option<i64> {
        *self
    }

    fn write_id(&mut self, id: Option<i64>) {
        *self = id;
    }
}

// 纯 i64 字段以 0 表示“尚未保存”，清空时回到 0
impl InternalIdField for i64 {
    fn read_id(&self) -> Option<i64> {
        (*self != 0).then_some(*self)
    }

    fn write_id(&mut self, id: Option<i64>) {
        *self = id.unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_until_assigned() {
        let holder = IdHolder::new();
        assert_eq!(holder.get(), None);
    }

    #[test]
    fn last_write_wins() {
        let mut holder = IdHolder::new();
        holder.set(1);
        holder.set(4711);
        assert_eq!(holder.get(), Some(4711));

        holder.clear();
        assert_eq!(holder.internal_id(), None);
    }

    #[test]
    fn round_trips_extreme_values() {
        let mut holder = IdHolder::default();
        for v in [i64::MIN, -1, 0, 1, i64::MAX] {
            holder.set_internal_id(v);
            assert_eq!(holder.internal_id(), Some(v));
        }
    }

    #[test]
    fn plain_field_treats_zero_as_unset() {
        let mut field: i64 = 0;
        assert_eq!(field.read_id(), None);
        assert_eq!(field.id_value(), Value::Null);

        field.set_id_value("id", Value::Integer(12)).unwrap();
        assert_eq!(field, 12);
        field.set_id_value("id", Value::Null).unwrap();
        assert_eq!(field, 0);
    }

    #[test]
    fn field_rejects_non_integer_values() {
        let mut field: Option<i64> = Some(3);
        let err = field.set_id_value("id", Value::from("3")).unwrap_err();
        assert!(matches!(
            err,
            MappingError::TypeMismatch {
                expected: "Integer",
                found: "String",
                ..
            }
        ));
        assert_eq!(field, Some(3));
    }

    #[test]
    fn option_field_tracks_unset_state() {
        let mut field: Option<i64> = None;
        assert_eq!(field.read_id(), None);
        field.write_id(Some(7));
        assert_eq!(field, Some(7));
        field.write_id(None);
        assert_eq!(field, None);
    }
}
