use serde_json::{Value, json};

/// One term of a backend search domain.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainTerm {
    /// `(field, operator, value)` leaf condition.
    Condition {
        /// Field name, possibly dotted for related fields.
        field: String,
        /// Comparison operator such as `=`, `ilike` or `in`.
        operator: String,
        /// Right-hand side value.
        value: Value,
    },
    /// Prefix logical operator: `&`, `|` or `!`.
    Operator(LogicalOperator),
}

/// Prefix logical operators understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    /// Conjunction of the next two terms.
    And,
    /// Disjunction of the next two terms.
    Or,
    /// Negation of the next term.
    Not,
}

impl LogicalOperator {
    /// Returns the wire symbol.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Not => "!",
        }
    }
}

/// Ordered list of terms in prefix (Polish) notation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchDomain {
    terms: Vec<DomainTerm>,
}

impl SearchDomain {
    /// Domain matching every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Appends a leaf condition.
    #[must_use]
    pub fn filter(
        mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.terms.push(DomainTerm::Condition {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        });
        self
    }

    /// Appends a logical operator.
    #[must_use]
    pub fn operator(mut self, operator: LogicalOperator) -> Self {
        self.terms.push(DomainTerm::Operator(operator));
        self
    }

    /// Returns the terms in order.
    #[must_use]
    pub fn terms(&self) -> &[DomainTerm] {
        &self.terms
    }

    /// Serializes into the nested-array form sent on the wire.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.terms
                .iter()
                .map(|term| match term {
                    DomainTerm::Condition {
                        field,
                        operator,
                        value,
                    } => json!([field, operator, value]),
                    DomainTerm::Operator(operator) => Value::from(operator.as_str()),
                })
                .collect(),
        )
    }
}
