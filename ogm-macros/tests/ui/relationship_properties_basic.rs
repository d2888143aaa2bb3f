use ogm_macros::{node, relationship_properties};
use ogm_mapping::entity::NodeEntity;
use ogm_mapping::metadata::{Direction, EntityKind};

#[node(labels = ["Actor"])]
#[derive(Debug, Default)]
struct Actor {
    name: String,
    #[relationship(rel_type = "ACTED_IN", direction = outgoing)]
    roles: Vec<Role>,
    #[relationship(rel_type = "FOLLOWS", direction = incoming)]
    followers: Vec<Actor>,
}

#[node(labels = ["Film"])]
#[derive(Debug, Default)]
struct Film {
    title: String,
}

#[relationship_properties]
#[derive(Debug, Default)]
struct Role {
    #[id]
    #[generated_value]
    id: Option<i64>,
    character: String,
    #[target_node]
    film: Film,
}

fn main() {
    assert_eq!(Role::KIND, EntityKind::RelationshipProperties);
    assert!(Role::LABELS.is_empty());

    let roles = Actor::PROPERTIES[1].relationship.unwrap();
    assert_eq!(roles.rel_type, "ACTED_IN");
    assert_eq!(roles.direction, Direction::Outgoing);
    assert!(roles.has_relationship_properties());
    assert_eq!(roles.end_node_description().type_name, "Film");

    let followers = Actor::PROPERTIES[2].relationship.unwrap();
    assert_eq!(followers.direction, Direction::Incoming);
}
