use proc_macro::TokenStream;

mod field_attrs;
mod node;

/// 节点实体宏
/// - 为结构体实现 `::ogm_mapping::entity::NodeEntity`（标签与属性描述均为编译期常量）
/// - 实现 `::ogm_mapping::entity::PropertyAccess`，按字段名读写属性
/// - 按 id 声明实现标识能力：
///   - `#[id] #[generated_value]`（`i64` / `Option<i64>`）：字段自身承载内部 id；
///   - 没有 `#[id]`：使用 `WithInternalId` 包装获得合成 `id`；
///   - `#[id]`（业务分配）：不实现 `IdentityCapable`。
/// - 参数：`#[node(labels = ["Person", "Human"])]`，缺省时以类型名作为标签
///
/// 字段上可用的辅助属性：`#[id]`、`#[generated_value]`、`#[version]`、`#[transient]`、
/// `#[property(name = "...")]`、`#[relationship(rel_type = "...", direction = outgoing|incoming)]`。
#[proc_macro_attribute]
pub fn node(attr: TokenStream, item: TokenStream) -> TokenStream {
    node::expand(attr, item, node::Kind::Node)
}

/// 关系属性实体宏
/// - 与 `#[node]` 相同，但不带标签；
/// - 必须恰有一个 `#[target_node]` 字段，指向关系另一端的节点。
#[proc_macro_attribute]
pub fn relationship_properties(attr: TokenStream, item: TokenStream) -> TokenStream {
    node::expand(attr, item, node::Kind::RelationshipProperties)
}
