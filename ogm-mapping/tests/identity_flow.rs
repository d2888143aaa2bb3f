use anyhow::Result as AnyResult;
use ogm_mapping::accessor::{
    BeanPropertyAccessor, IdentityAwarePropertyAccessor, PropertyAccessor,
};
use ogm_mapping::context::MappingContext;
use ogm_mapping::entity::{NodeEntity, PropertyAccess};
use ogm_mapping::error::MappingError;
use ogm_mapping::identity::{HasInternalId, IdentityCapable, WithInternalId, with_internal_id};
use ogm_mapping::metadata::{IdKind, PersistentProperty, SYNTHETIC_ID};
use ogm_mapping::value::{PropertyType, Value};
use ogm_mapping::{node, relationship_properties};

#[node]
#[derive(Debug, Clone, Default, PartialEq)]
struct Plain {
    name: String,
}

impl Plain {
    fn name(&self) -> &str {
        &self.name
    }

    fn rename(&mut self, name: &str) -> usize {
        self.name = name.to_string();
        self.name.len()
    }

    fn fail_on_empty(&self) -> Result<usize, String> {
        if self.name.is_empty() {
            Err("empty name".to_string())
        } else {
            Ok(self.name.len())
        }
    }
}

#[node(labels = ["Container"])]
#[derive(Debug, Clone, Default)]
struct Container {
    #[id]
    #[generated_value]
    id: Option<i64>,
    #[property(name = "knownProperty")]
    known_property: String,
}

#[node(labels = ["Country"])]
#[derive(Debug, Clone, Default)]
struct Country {
    #[id]
    code: String,
    name: String,
}

#[node(labels = ["City"])]
#[derive(Debug, Clone, Default)]
struct City {
    name: String,
    #[transient]
    lookups: u32,
}

#[relationship_properties]
#[derive(Debug, Clone, Default)]
struct Visit {
    year: i64,
    #[target_node]
    city: City,
}

#[node(labels = ["Traveller"])]
#[derive(Debug, Clone, Default)]
struct Traveller {
    name: String,
    #[relationship(rel_type = "VISITED", direction = outgoing)]
    visits: Vec<Visit>,
}

#[node(labels = ["Account"])]
#[derive(Debug, Clone, Default)]
struct Account {
    #[id]
    #[generated_value]
    node_id: Option<i64>,
    id: String,
}

#[node]
#[derive(Debug, Clone, Default)]
struct Clashing {
    #[property(name = "id")]
    code: String,
}

fn name_of<T: NodeEntity + 'static>(ctx: &MappingContext) -> AnyResult<PersistentProperty> {
    Ok(*ctx.register::<T>()?.required_property("name")?)
}

#[test]
fn plain_entity_gets_id_and_keeps_its_behavior() -> AnyResult<()> {
    let ctx = MappingContext::default();
    let entity = ctx.register::<Plain>()?;
    assert!(entity.uses_synthetic_id());
    let id = *entity.id_property();
    let name = name_of::<Plain>(&ctx)?;

    let mut accessor = ctx.identity_aware_accessor(Plain::default())?;
    accessor.set_property(&id, Value::Integer(7))?;
    accessor.set_property(&name, Value::from("Ann"))?;

    assert_eq!(accessor.get_property(&id)?, Value::Integer(7));
    assert_eq!(accessor.get_property(&name)?, Value::from("Ann"));
    // 包装后的实例仍可直接调用原类型的方法
    assert_eq!(accessor.bean().name(), "Ann");
    Ok(())
}

#[test]
fn wrapping_twice_shares_one_holder() {
    let once = with_internal_id(Plain::default());
    let mut twice = with_internal_id(once);
    twice.set_internal_id(5);
    assert_eq!(twice.internal_id(), Some(5));

    let mut again = twice.into_identified();
    again.set_internal_id(6);
    assert_eq!(again.internal_id(), Some(6));
    assert_eq!(again.into_parts().1, Some(6));
}

#[test]
fn synthetic_property_describes_integer_id() {
    let p = SYNTHETIC_ID.property();
    assert!(p.is_id_property());
    assert!(!p.is_version_property());
    assert!(p.is_writable());
    assert_eq!(p.property_type(), PropertyType::Integer);
    assert!(p.find_annotation("id").is_none());
}

#[test]
fn wrapped_methods_behave_like_target() {
    let mut direct = Plain::default();
    let mut wrapped = with_internal_id(Plain::default());
    wrapped.set_internal_id(1);

    assert_eq!(wrapped.fail_on_empty(), direct.fail_on_empty());
    assert_eq!(wrapped.rename("Bob"), direct.rename("Bob"));
    assert_eq!(wrapped.fail_on_empty(), direct.fail_on_empty());
    assert_eq!(wrapped.name(), direct.name());
    assert_eq!(*wrapped, direct);
    assert_eq!(
        wrapped.read_property("name").unwrap(),
        direct.read_property("name").unwrap()
    );
}

#[test]
fn id_and_other_properties_do_not_interfere() -> AnyResult<()> {
    let ctx = MappingContext::default();
    let id = *ctx.register::<Plain>()?.id_property();
    let name = name_of::<Plain>(&ctx)?;
    let mut accessor = ctx.identity_aware_accessor(Plain {
        name: "Ann".into(),
    })?;

    for v in [0, -1, i64::MAX, i64::MIN, 42] {
        accessor.set_property(&id, Value::Integer(v))?;
        assert_eq!(accessor.get_property(&id)?, Value::Integer(v));
        assert_eq!(accessor.get_property(&name)?, Value::from("Ann"));
    }

    accessor.set_property(&name, Value::from("Eve"))?;
    assert_eq!(accessor.get_property(&id)?, Value::Integer(42));
    Ok(())
}

#[test]
fn wrong_id_value_type_fails_fast() -> AnyResult<()> {
    let ctx = MappingContext::default();
    let id = *ctx.register::<Plain>()?.id_property();
    let mut accessor = ctx.identity_aware_accessor(Plain::default())?;

    let err = accessor
        .set_property(&id, Value::Float(1.5))
        .unwrap_err();
    assert!(matches!(
        err,
        MappingError::TypeMismatch {
            expected: "Integer",
            found: "Float",
            ..
        }
    ));
    assert_eq!(accessor.get_property(&id)?, Value::Null);
    Ok(())
}

#[test]
fn wrapper_does_not_leak_id_to_original() {
    let original = Plain {
        name: "Ann".into(),
    };
    let mut wrapped = with_internal_id(original.clone());
    wrapped.set_internal_id(3);
    wrapped.name = "Eve".into();

    assert_eq!(original.name, "Ann");
    let (target, id) = wrapped.into_parts();
    assert_eq!(target.name, "Eve");
    assert_eq!(id, Some(3));
}

#[test]
fn native_generated_id_is_not_wrapped() -> AnyResult<()> {
    let ctx = MappingContext::default();
    let entity = ctx.register::<Container>()?;
    assert!(entity.has_native_id());
    assert_eq!(entity.id_property().name(), "id");

    let mut accessor = ctx.identity_aware_accessor(Container::default())?;
    accessor.set_property(entity.id_property(), Value::Integer(9))?;

    let bean: Container = accessor.into_bean();
    assert_eq!(bean.id, Some(9));
    Ok(())
}

#[test]
fn ordinary_field_named_id_is_not_routed() -> AnyResult<()> {
    let ctx = MappingContext::default();
    let entity = ctx.register::<Account>()?;
    let id_field = *entity.required_property("id")?;
    assert!(!id_field.is_id_property());

    let mut accessor = ctx.identity_aware_accessor(Account::default())?;
    accessor.set_property(&id_field, Value::from("acc-1"))?;
    accessor.set_property(entity.id_property(), Value::Integer(5))?;

    assert_eq!(accessor.get_property(&id_field)?, Value::from("acc-1"));
    assert_eq!(accessor.get_property(entity.id_property())?, Value::Integer(5));

    let bean = accessor.into_bean();
    assert_eq!(bean.node_id, Some(5));
    assert_eq!(bean.id, "acc-1");
    Ok(())
}

#[test]
fn custom_factory_receives_wrapped_bean() {
    let id = SYNTHETIC_ID.property();
    let mut accessor = IdentityAwarePropertyAccessor::new(
        |bean: WithInternalId<Plain>| BeanPropertyAccessor::new(bean),
        Plain::default(),
    );
    accessor.set_property(&id, Value::Integer(12)).unwrap();
    assert_eq!(accessor.bean().internal_id(), Some(12));
}

#[test]
fn instantiating_accessor_returns_replaced_bean() -> AnyResult<()> {
    let ctx = MappingContext::default();
    let name = name_of::<Plain>(&ctx)?;
    let id = SYNTHETIC_ID.property();
    let mut accessor = IdentityAwarePropertyAccessor::instantiating(Plain::default());

    accessor.set_property(&id, Value::Integer(2))?;
    accessor.set_property(&name, Value::from("Ann"))?;

    assert_eq!(accessor.bean().name, "Ann");
    assert_eq!(accessor.bean().internal_id(), Some(2));
    Ok(())
}

#[test]
fn assigned_id_entities_keep_their_own_id() -> AnyResult<()> {
    let ctx = MappingContext::default();
    let entity = ctx.register::<Country>()?;
    assert!(entity.has_native_id());
    assert!(!entity.is_using_internal_ids());

    let id = entity.id_property();
    let PersistentProperty::Declared(declared) = id else {
        panic!("assigned id should be a declared property");
    };
    assert_eq!(declared.description().id, IdKind::Assigned);

    let mut accessor = ctx.property_accessor(Country::default())?;
    accessor.set_property(id, Value::from("DE"))?;
    assert_eq!(accessor.bean().code, "DE");
    Ok(())
}

#[test]
fn transient_fields_are_not_mapped() -> AnyResult<()> {
    let ctx = MappingContext::default();
    let entity = ctx.register::<City>()?;
    assert!(entity.property("lookups").is_none());

    let city = City {
        name: "Berlin".into(),
        lookups: 3,
    };
    let err = city.read_property("lookups").unwrap_err();
    assert!(matches!(err, MappingError::UnknownProperty { .. }));
    Ok(())
}

#[test]
fn relationship_properties_resolve_end_node() -> AnyResult<()> {
    let ctx = MappingContext::default();
    let visit = ctx.register::<Visit>()?;
    assert!(visit.is_relationship_properties());
    assert!(visit.uses_synthetic_id());
    assert!(visit.labels().is_empty());

    let traveller = ctx.register::<Traveller>()?;
    let visits = traveller.required_property("visits")?;
    let relationship = visits.relationship().expect("visits is a relationship");
    assert!(relationship.has_relationship_properties());
    assert_eq!(relationship.end_node_description().type_name, "City");

    let bean = Traveller::default();
    let err = bean.read_property("visits").unwrap_err();
    assert!(matches!(err, MappingError::NotValueProperty { .. }));
    Ok(())
}

#[test]
fn unsupported_entities_fail_at_registration() {
    let ctx = MappingContext::default();
    let err = ctx.register::<Clashing>().unwrap_err();
    assert!(err.to_string().contains("`Clashing`"));

    let strict = MappingContext::builder().allow_synthetic_ids(false).build();
    let err = strict.identity_aware_accessor(Plain::default()).unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnsupportedEntityType {
            type_name: "Plain",
            ..
        }
    ));
    assert!(strict.register::<Container>().is_ok());
}
