use crate::field_attrs::{FieldMapping, take_field_mapping};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    GenericArgument, Ident, Item, LitStr, PathArguments, Result, Token, Type, parse::Parse,
    parse::ParseStream, parse_macro_input,
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Node,
    RelationshipProperties,
}

impl Kind {
    fn attr_name(self) -> &'static str {
        match self {
            Kind::Node => "#[node]",
            Kind::RelationshipProperties => "#[relationship_properties]",
        }
    }
}

/// #[node] / #[relationship_properties] 宏实现
pub(crate) fn expand(attr: TokenStream, item: TokenStream, kind: Kind) -> TokenStream {
    let cfg = parse_macro_input!(attr as NodeAttrConfig);
    let input = parse_macro_input!(item as Item);

    match expand_struct(cfg, input, kind) {
        Ok(out) => TokenStream::from(out),
        Err(err) => err.to_compile_error().into(),
    }
}

struct MappedField {
    ident: Ident,
    ty: Type,
    mapping: FieldMapping,
}

impl MappedField {
    fn is_association(&self) -> bool {
        self.mapping.relationship.is_some() || self.mapping.target_node
    }

    fn is_generated_id(&self) -> bool {
        self.mapping.id && self.mapping.generated
    }
}

fn expand_struct(cfg: NodeAttrConfig, input: Item, kind: Kind) -> Result<TokenStream2> {
    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return Err(syn::Error::new(
                other.span(),
                format!("{} only on struct", kind.attr_name()),
            ));
        }
    };

    if kind == Kind::RelationshipProperties && !cfg.labels.is_empty() {
        return Err(syn::Error::new(
            st.ident.span(),
            "#[relationship_properties] does not take labels",
        ));
    }

    // 仅支持具名字段结构体
    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return Err(syn::Error::new(
                st.span(),
                "only supports named-field struct",
            ));
        }
    };

    // 解析并移除字段上的映射辅助属性；瞬态字段不参与映射
    let mut mapped: Vec<MappedField> = Vec::new();
    for field in fields_named.named.iter_mut() {
        let mapping = take_field_mapping(&mut field.attrs)?;
        if mapping.transient {
            if mapping.annotations.len() > 1 {
                return Err(syn::Error::new(
                    field.span(),
                    "#[transient] cannot be combined with other mapping attributes",
                ));
            }
            continue;
        }
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        mapped.push(MappedField {
            ident,
            ty: field.ty.clone(),
            mapping,
        });
    }

    let ids: Vec<&MappedField> = mapped.iter().filter(|f| f.mapping.id).collect();
    if ids.len() > 1 {
        return Err(syn::Error::new(
            ids[1].ident.span(),
            "at most one #[id] field is allowed",
        ));
    }
    let id_field = ids.first().copied();

    let targets = mapped.iter().filter(|f| f.mapping.target_node).count();
    match kind {
        Kind::RelationshipProperties if targets != 1 => {
            return Err(syn::Error::new(
                st.ident.span(),
                "#[relationship_properties] requires exactly one #[target_node] field",
            ));
        }
        Kind::Node if targets > 0 => {
            return Err(syn::Error::new(
                st.ident.span(),
                "#[target_node] is only allowed in #[relationship_properties]",
            ));
        }
        _ => {}
    }

    let ident = &st.ident;
    let type_name = LitStr::new(&ident.to_string(), ident.span());
    let generics = st.generics.clone();
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let labels = &cfg.labels;
    let entity_kind = match kind {
        Kind::Node => quote! { ::ogm_mapping::metadata::EntityKind::Node },
        Kind::RelationshipProperties => {
            quote! { ::ogm_mapping::metadata::EntityKind::RelationshipProperties }
        }
    };

    let descriptions = mapped
        .iter()
        .map(property_description)
        .collect::<Result<Vec<_>>>()?;

    let read_arms = mapped.iter().map(|f| {
        let name = LitStr::new(&f.ident.to_string(), f.ident.span());
        let field = &f.ident;
        if f.is_association() {
            quote! { #name => ::std::result::Result::Err(not_value(name)) }
        } else if f.is_generated_id() {
            quote! { #name => ::std::result::Result::Ok(::ogm_mapping::identity::InternalIdField::id_value(&self.#field)) }
        } else {
            quote! { #name => ::std::result::Result::Ok(::ogm_mapping::value::ToValue::to_value(&self.#field)) }
        }
    });

    let write_arms = mapped.iter().map(|f| {
        let name = LitStr::new(&f.ident.to_string(), f.ident.span());
        let field = &f.ident;
        let ty = &f.ty;
        if f.is_association() {
            quote! { #name => ::std::result::Result::Err(not_value(name)) }
        } else if f.is_generated_id() {
            quote! {
                #name => ::ogm_mapping::identity::InternalIdField::set_id_value(&mut self.#field, #name, value)
            }
        } else {
            quote! {
                #name => {
                    self.#field = <#ty as ::ogm_mapping::value::FromValue>::from_value(value)
                        .map_err(|e| e.for_property(#name))?;
                    ::std::result::Result::Ok(())
                }
            }
        }
    });

    let identity = identity_impls(&st.ident, &generics, id_field)?;

    Ok(quote! {
        #st

        impl #impl_generics ::ogm_mapping::entity::NodeEntity for #ident #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;
            const LABELS: &'static [&'static str] = &[#(#labels),*];
            const KIND: ::ogm_mapping::metadata::EntityKind = #entity_kind;
            const PROPERTIES: &'static [::ogm_mapping::metadata::PropertyDescription] = &[#(#descriptions),*];
        }

        impl #impl_generics ::ogm_mapping::entity::PropertyAccess for #ident #ty_generics #where_clause {
            fn read_property(&self, name: &str) -> ::ogm_mapping::error::MappingResult<::ogm_mapping::value::Value> {
                #[allow(unused)]
                let not_value = |property: &str| ::ogm_mapping::error::MappingError::NotValueProperty {
                    type_name: #type_name,
                    property: property.to_string(),
                };
                match name {
                    #(#read_arms,)*
                    other => ::std::result::Result::Err(::ogm_mapping::error::MappingError::UnknownProperty {
                        type_name: #type_name,
                        property: other.to_string(),
                    }),
                }
            }

            #[allow(unused_variables)]
            fn write_property(
                &mut self,
                name: &str,
                value: ::ogm_mapping::value::Value,
            ) -> ::ogm_mapping::error::MappingResult<()> {
                #[allow(unused)]
                let not_value = |property: &str| ::ogm_mapping::error::MappingError::NotValueProperty {
                    type_name: #type_name,
                    property: property.to_string(),
                };
                match name {
                    #(#write_arms,)*
                    other => ::std::result::Result::Err(::ogm_mapping::error::MappingError::UnknownProperty {
                        type_name: #type_name,
                        property: other.to_string(),
                    }),
                }
            }
        }

        #identity
    })
}

fn property_description(f: &MappedField) -> Result<TokenStream2> {
    let name = LitStr::new(&f.ident.to_string(), f.ident.span());
    let ty = &f.ty;
    let m = &f.mapping;

    let property_type = if f.is_association() {
        quote! { ::ogm_mapping::value::PropertyType::Relationship }
    } else {
        quote! { <#ty as ::ogm_mapping::value::GraphType>::PROPERTY_TYPE }
    };

    let mut chain = quote! {
        ::ogm_mapping::metadata::PropertyDescription::new(#name, #property_type)
    };

    if let Some(graph_name) = &m.graph_name {
        chain = quote! { #chain.graph_name(#graph_name) };
    }
    if m.id {
        let id_kind = if m.generated {
            quote! { ::ogm_mapping::metadata::IdKind::Generated }
        } else {
            quote! { ::ogm_mapping::metadata::IdKind::Assigned }
        };
        chain = quote! { #chain.id(#id_kind) };
    }
    if m.version {
        chain = quote! { #chain.version() };
    }
    if m.target_node {
        let target = peel(ty);
        chain = quote! {
            #chain.target_node(<#target as ::ogm_mapping::entity::NodeEntity>::description)
        };
    }
    if let Some(rel) = &m.relationship {
        if m.id || m.version || m.target_node {
            return Err(syn::Error::new(
                f.ident.span(),
                "#[relationship] cannot be combined with #[id], #[version] or #[target_node]",
            ));
        }
        let target = peel(ty);
        let rel_type = &rel.rel_type;
        let direction = if rel.incoming {
            quote! { ::ogm_mapping::metadata::Direction::Incoming }
        } else {
            quote! { ::ogm_mapping::metadata::Direction::Outgoing }
        };
        chain = quote! {
            #chain.relationship(::ogm_mapping::metadata::RelationshipDescription {
                rel_type: #rel_type,
                direction: #direction,
                target: <#target as ::ogm_mapping::entity::NodeEntity>::description,
            })
        };
    }
    let annotations = &m.annotations;
    if !annotations.is_empty() {
        chain = quote! { #chain.annotations(&[#(#annotations),*]) };
    }
    Ok(chain)
}

/// 剥去 `Vec<T>` / `Option<T>` / `Box<T>` 等单参数容器，得到关联的目标实体类型
fn peel(ty: &Type) -> &Type {
    let Type::Path(tp) = ty else {
        return ty;
    };
    let Some(last) = tp.path.segments.last() else {
        return ty;
    };
    if !matches!(
        last.ident.to_string().as_str(),
        "Vec" | "Option" | "Box" | "Arc" | "Rc"
    ) {
        return ty;
    }
    match &last.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(GenericArgument::Type(inner)) => peel(inner),
            _ => ty,
        },
        _ => ty,
    }
}

fn identity_impls(
    ident: &Ident,
    generics: &syn::Generics,
    id_field: Option<&MappedField>,
) -> Result<TokenStream2> {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    match id_field {
        // 没有 id 字段：包装获得合成 id
        None => Ok(quote! {
            impl #impl_generics ::ogm_mapping::identity::IdentityCapable for #ident #ty_generics #where_clause {
                const NATIVE_ID: bool = false;
                type Identified = ::ogm_mapping::identity::WithInternalId<Self>;

                fn into_identified(self) -> Self::Identified {
                    ::ogm_mapping::identity::WithInternalId::new(self)
                }
            }
        }),
        // 数据库生成的 id：字段自身承载
        Some(f) if f.is_generated_id() => {
            let field = &f.ident;
            Ok(quote! {
                impl #impl_generics ::ogm_mapping::identity::HasInternalId for #ident #ty_generics #where_clause {
                    fn internal_id(&self) -> ::std::option::Option<i64> {
                        ::ogm_mapping::identity::InternalIdField::read_id(&self.#field)
                    }

                    fn set_internal_id(&mut self, id: i64) {
                        ::ogm_mapping::identity::InternalIdField::write_id(&mut self.#field, ::std::option::Option::Some(id))
                    }

                    fn clear_internal_id(&mut self) {
                        ::ogm_mapping::identity::InternalIdField::write_id(&mut self.#field, ::std::option::Option::None)
                    }
                }

                impl #impl_generics ::ogm_mapping::identity::IdentityCapable for #ident #ty_generics #where_clause {
                    const NATIVE_ID: bool = true;
                    type Identified = Self;

                    fn into_identified(self) -> Self::Identified {
                        self
                    }
                }
            })
        }
        // 业务分配的 id 不经由内部标识
        Some(_) => Ok(TokenStream2::new()),
    }
}

// -------- parsing --------

struct NodeAttrConfig {
    labels: Vec<LitStr>,
}

impl Parse for NodeAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut labels: Option<Vec<LitStr>> = None;

        if input.is_empty() {
            return Ok(Self { labels: Vec::new() });
        }

        let elems: Punctuated<LabelsKv, Token![,]> =
            Punctuated::<LabelsKv, Token![,]>::parse_terminated(input)?;

        for kv in elems.into_iter() {
            if labels.is_some() {
                return Err(syn::Error::new(
                    kv.key.span(),
                    "duplicate key 'labels' in attribute",
                ));
            }
            labels = Some(kv.labels);
        }

        Ok(Self {
            labels: labels.unwrap_or_default(),
        })
    }
}

// labels = ["A", "B"]
struct LabelsKv {
    key: Ident,
    labels: Vec<LitStr>,
}

impl Parse for LabelsKv {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        if key != "labels" {
            return Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'labels'",
            ));
        }
        let _eq: Token![=] = input.parse()?;
        let content;
        syn::bracketed!(content in input);
        let labels = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?
            .into_iter()
            .collect();
        Ok(Self { key, labels })
    }
}
