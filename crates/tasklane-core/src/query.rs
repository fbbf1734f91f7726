use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    EqualTo,
    /// Case-insensitive substring match
    Contains,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Field {
        field: String,
        op: Comparison,
        value: Value,
    },
    Group {
        op: Operator,
        conditions: Vec<Condition>,
    },
}

impl Condition {
    pub fn equal_to(field: &str, value: impl Into<Value>) -> Self {
        Condition::Field {
            field: field.to_string(),
            op: Comparison::EqualTo,
            value: value.into(),
        }
    }

    pub fn contains(field: &str, value: impl Into<Value>) -> Self {
        Condition::Field {
            field: field.to_string(),
            op: Comparison::Contains,
            value: value.into(),
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Group {
            op: Operator::Or,
            conditions,
        }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::Group {
            op: Operator::And,
            conditions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A fetch request against one store collection.
///
/// An empty `fields` list selects every field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub fields: Vec<String>,
    pub filter: Option<Condition>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u32>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(condition);
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}
