use ogm_macros::node;
use ogm_mapping::entity::{NodeEntity, PropertyAccess};
use ogm_mapping::identity::{HasInternalId, IdentityCapable};
use ogm_mapping::value::Value;

#[node(labels = ["Person", "Human"])]
#[derive(Debug, Default)]
struct Person {
    #[property(name = "fullName")]
    name: String,
    age: i64,
    #[transient]
    cache: Vec<u8>,
}

fn main() {
    assert_eq!(Person::TYPE_NAME, "Person");
    assert_eq!(Person::LABELS, &["Person", "Human"]);
    assert_eq!(Person::PROPERTIES.len(), 2);
    assert_eq!(Person::PROPERTIES[0].graph_name, "fullName");

    // 没有 id 字段：包装获得合成 id
    assert!(!<Person as IdentityCapable>::NATIVE_ID);
    let mut wrapped = Person::default().into_identified();
    wrapped.set_internal_id(1);
    wrapped.write_property("age", Value::Integer(30)).unwrap();
    assert_eq!(wrapped.age, 30);
    assert!(wrapped.cache.is_empty());
}
