use std::fmt::{Display, Formatter};

/// Comparison used by one WHERE predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Le,
    Lt,
    Ge,
    Gt,
    Ne,
    /// SQL pattern match (`%` and `_` wildcards).
    Like,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Eq,
        Operator::Le,
        Operator::Lt,
        Operator::Ge,
        Operator::Gt,
        Operator::Ne,
        Operator::Like,
    ];

    /// SQL text for this operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Le => "<=",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::Ne => "!=",
            Self::Like => "LIKE",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::Operator;
    use std::collections::HashSet;

    #[test]
    fn every_operator_renders_distinct_sql() {
        let rendered: HashSet<_> = Operator::ALL.iter().map(|op| op.as_sql()).collect();
        assert_eq!(rendered.len(), Operator::ALL.len());
    }

    #[test]
    fn like_renders_pattern_match_keyword() {
        assert_eq!(Operator::Like.to_string(), "LIKE");
        assert_eq!(Operator::Ne.to_string(), "!=");
    }
}
