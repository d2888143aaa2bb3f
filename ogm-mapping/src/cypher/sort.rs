use serde::{Deserialize, Serialize};

use crate::error::{MappingError, MappingResult};

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// 单个排序项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    property: String,
    direction: SortDirection,
}

impl Order {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Desc,
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// 排序规则（有序的排序项列表）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// 按给定属性升序
    pub fn by<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            orders: properties.into_iter().map(Order::asc).collect(),
        }
    }

    pub fn by_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            orders: orders.into_iter().collect(),
        }
    }

    pub fn and(mut self, other: Sort) -> Self {
        self.orders.extend(other.orders);
        self
    }

    pub fn ascending(self) -> Self {
        self.with_direction(SortDirection::Asc)
    }

    pub fn descending(self) -> Self {
        self.with_direction(SortDirection::Desc)
    }

    fn with_direction(mut self, direction: SortDirection) -> Self {
        for order in &mut self.orders {
            order.direction = direction;
        }
        self
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
}

/// 渲染 `ORDER BY` 片段；未排序时返回 `None`
///
/// 排序属性只能是简单属性名或一跳路径（`n.name`），每一段都必须是合法的标识符。
pub fn order_by_fragment(sort: Option<&Sort>) -> MappingResult<Option<String>> {
    let Some(sort) = sort.filter(|s| !s.is_unsorted()) else {
        return Ok(None);
    };

    let items = sort
        .orders()
        .iter()
        .map(|order| {
            validate_sort_property(order.property())?;
            Ok(format!("{} {}", order.property(), order.direction().keyword()))
        })
        .collect::<MappingResult<Vec<_>>>()?;

    Ok(Some(format!("ORDER BY {}", items.join(", "))))
}

fn validate_sort_property(property: &str) -> MappingResult<()> {
    let segments: Vec<&str> = property.split('.').collect();
    if segments.len() > 2 || segments.iter().any(|s| s.is_empty()) {
        return Err(MappingError::InvalidSortProperty {
            property: property.to_string(),
        });
    }
    for segment in segments {
        if !is_identifier(segment) {
            return Err(MappingError::InvalidIdentifier {
                name: segment.to_string(),
            });
        }
    }
    Ok(())
}

/// Cypher 符号名：字母或下划线开头，其后为字母、数字或下划线
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
