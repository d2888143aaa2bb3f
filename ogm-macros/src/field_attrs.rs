use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, Ident, LitStr, Result, Token, parse::Parse, parse::ParseStream};

/// 字段上的映射声明（解析后从字段上移除）
#[derive(Default)]
pub(crate) struct FieldMapping {
    pub id: bool,
    pub generated: bool,
    pub version: bool,
    pub transient: bool,
    pub target_node: bool,
    pub graph_name: Option<LitStr>,
    pub relationship: Option<RelationshipAttr>,
    /// 出现过的辅助属性名，作为字段标注暴露给元数据
    pub annotations: Vec<String>,
}

pub(crate) struct RelationshipAttr {
    pub rel_type: LitStr,
    pub incoming: bool,
}

const HELPERS: &[&str] = &[
    "id",
    "generated_value",
    "version",
    "transient",
    "target_node",
    "property",
    "relationship",
];

/// 取出并解析映射辅助属性，其余属性原样保留
pub(crate) fn take_field_mapping(attrs: &mut Vec<Attribute>) -> Result<FieldMapping> {
    let mut mapping = FieldMapping::default();
    let mut retained = Vec::with_capacity(attrs.len());
    let mut generated_span = None;

    for attr in attrs.drain(..) {
        let Some(name) = HELPERS.iter().find(|h| attr.path().is_ident(h)) else {
            retained.push(attr);
            continue;
        };
        if mapping.annotations.iter().any(|a| a == name) {
            return Err(syn::Error::new(
                attr.span(),
                format!("duplicate #[{name}] on this field"),
            ));
        }
        mapping.annotations.push(name.to_string());

        match *name {
            "id" => {
                attr.meta.require_path_only()?;
                mapping.id = true;
            }
            "generated_value" => {
                attr.meta.require_path_only()?;
                mapping.generated = true;
                generated_span = Some(attr.span());
            }
            "version" => {
                attr.meta.require_path_only()?;
                mapping.version = true;
            }
            "transient" => {
                attr.meta.require_path_only()?;
                mapping.transient = true;
            }
            "target_node" => {
                attr.meta.require_path_only()?;
                mapping.target_node = true;
            }
            "property" => mapping.graph_name = Some(parse_property_attr(&attr)?),
            "relationship" => mapping.relationship = Some(parse_relationship_attr(&attr)?),
            _ => unreachable!(),
        }
    }

    *attrs = retained;

    if let (Some(span), false) = (generated_span, mapping.id) {
        return Err(syn::Error::new(
            span,
            "#[generated_value] requires #[id] on the same field",
        ));
    }
    Ok(mapping)
}

struct AttrKv {
    key: Ident,
    #[allow(dead_code)]
    eq: Token![=],
    value: Expr,
}

impl Parse for AttrKv {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Self {
            key: input.parse()?,
            eq: input.parse()?,
            value: input.parse()?,
        })
    }
}

fn parse_kvs(attr: &Attribute) -> Result<Punctuated<AttrKv, Token![,]>> {
    attr.parse_args_with(Punctuated::<AttrKv, Token![,]>::parse_terminated)
}

fn expect_str(value: Expr, key: &str) -> Result<LitStr> {
    match value {
        Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            ..
        }) => Ok(lit),
        other => Err(syn::Error::new(
            other.span(),
            format!("expected string literal for '{key}'"),
        )),
    }
}

// #[property(name = "graphName")]
fn parse_property_attr(attr: &Attribute) -> Result<LitStr> {
    let mut name: Option<LitStr> = None;
    for kv in parse_kvs(attr)? {
        match kv.key.to_string().as_str() {
            "name" => {
                if name.is_some() {
                    return Err(syn::Error::new(
                        kv.key.span(),
                        "duplicate key 'name' in attribute",
                    ));
                }
                name = Some(expect_str(kv.value, "name")?);
            }
            _ => {
                return Err(syn::Error::new(
                    kv.key.span(),
                    "unknown key in attribute; expected 'name'",
                ));
            }
        }
    }
    name.ok_or_else(|| syn::Error::new(attr.span(), "#[property] requires name = \"...\""))
}

// #[relationship(rel_type = "KNOWS", direction = outgoing)]
fn parse_relationship_attr(attr: &Attribute) -> Result<RelationshipAttr> {
    let mut rel_type: Option<LitStr> = None;
    let mut incoming: Option<bool> = None;
    for kv in parse_kvs(attr)? {
        match kv.key.to_string().as_str() {
            "rel_type" => {
                if rel_type.is_some() {
                    return Err(syn::Error::new(
                        kv.key.span(),
                        "duplicate key 'rel_type' in attribute",
                    ));
                }
                rel_type = Some(expect_str(kv.value, "rel_type")?);
            }
            "direction" => {
                if incoming.is_some() {
                    return Err(syn::Error::new(
                        kv.key.span(),
                        "duplicate key 'direction' in attribute",
                    ));
                }
                let direction = match &kv.value {
                    Expr::Path(p) if p.path.segments.len() == 1 => {
                        p.path.segments[0].ident.to_string()
                    }
                    Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit),
                        ..
                    }) => lit.value(),
                    other => {
                        return Err(syn::Error::new(other.span(), "invalid 'direction'"));
                    }
                };
                incoming = Some(match direction.to_ascii_lowercase().as_str() {
                    "outgoing" => false,
                    "incoming" => true,
                    _ => {
                        return Err(syn::Error::new(
                            kv.value.span(),
                            "expected 'outgoing' | 'incoming' for 'direction'",
                        ));
                    }
                });
            }
            _ => {
                return Err(syn::Error::new(
                    kv.key.span(),
                    "unknown key in attribute; expected 'rel_type' | 'direction'",
                ));
            }
        }
    }
    let rel_type = rel_type
        .ok_or_else(|| syn::Error::new(attr.span(), "#[relationship] requires rel_type = \"...\""))?;
    Ok(RelationshipAttr {
        rel_type,
        incoming: incoming.unwrap_or(false),
    })
}
