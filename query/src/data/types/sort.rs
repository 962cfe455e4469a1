use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn is_descending(&self) -> bool {
        matches!(self, Direction::Desc)
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(format!("Invalid sort direction '{}'. Valid options: asc, desc", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        })
    }
}

/// Placement of NULL values in an ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    /// Whatever the database does by default
    #[default]
    Native,
    NullsFirst,
    NullsLast,
}

/// One ordering term on an attribute path
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Order {
    pub property: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub null_handling: NullHandling,
}

impl Order {
    pub fn new(property: impl Into<String>, direction: Direction) -> Self {
        Self {
            property: property.into(),
            direction,
            null_handling: NullHandling::Native,
        }
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Asc)
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Desc)
    }

    pub fn nulls_first(mut self) -> Self {
        self.null_handling = NullHandling::NullsFirst;
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.null_handling = NullHandling::NullsLast;
        self
    }
}

/// Ordered list of sort terms; the first term is the primary key
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    /// Append a lower-priority term
    pub fn and(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }
}

impl From<Order> for Sort {
    fn from(order: Order) -> Self {
        Self {
            orders: vec![order],
        }
    }
}
