use ogm_macros::node;
use ogm_mapping::entity::NodeEntity;
use ogm_mapping::identity::{HasInternalId, IdentityCapable};
use ogm_mapping::metadata::IdKind;

#[node]
#[derive(Debug, Default)]
struct Movie {
    #[id]
    #[generated_value]
    id: Option<i64>,
    title: String,
    #[version]
    version: i64,
}

#[node(labels = ["Studio"])]
#[derive(Debug, Default)]
struct Studio {
    #[id]
    code: String,
}

fn main() {
    assert!(Movie::LABELS.is_empty());
    assert_eq!(Movie::description().effective_labels(), vec!["Movie"]);
    assert_eq!(Movie::PROPERTIES[0].id, IdKind::Generated);
    assert!(Movie::PROPERTIES[2].version);

    // 生成的 id 由字段自身承载
    assert!(<Movie as IdentityCapable>::NATIVE_ID);
    let mut movie: Movie = Movie::default().into_identified();
    movie.set_internal_id(3);
    assert_eq!(movie.id, Some(3));
    movie.clear_internal_id();
    assert_eq!(movie.internal_id(), None);

    assert_eq!(Studio::PROPERTIES[0].id, IdKind::Assigned);
}
