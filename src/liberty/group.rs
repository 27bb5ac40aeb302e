use std::fmt;

use indexmap::IndexMap;

/// A liberty attribute value. Tokens that read as a float become numbers,
/// everything else (including every quoted string) stays text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn from_token(token: &str) -> Self {
        let numeric_start = token
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
        match token.parse::<f64>() {
            Ok(number) if numeric_start => Value::Number(number),
            _ => Value::Text(token.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// `name : value ;`
    Simple(Value),
    /// `name (value, value, ...) ;`
    Complex(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

/// `kind (args) { attributes... groups... }`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub kind: String,
    pub args: Vec<Value>,
    pub attributes: Vec<Attribute>,
    pub groups: Vec<Group>,
}

impl Group {
    /// First argument, e.g. the cell name of `cell (INVX1)`.
    pub fn name(&self) -> Option<String> {
        self.args.first().map(Value::to_string)
    }

    pub fn groups<'a, 'k>(&'a self, kind: &'k str) -> impl Iterator<Item = &'a Group> + 'k
    where
        'a: 'k,
    {
        self.groups.iter().filter(move |g| g.kind == kind)
    }

    pub fn group(&self, kind: &str, name: &str) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.kind == kind && g.name().as_deref() == Some(name))
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.iter().find_map(|a| match &a.value {
            AttributeValue::Simple(v) if a.name == name => Some(v),
            _ => None,
        })
    }

    pub fn complex_attribute(&self, name: &str) -> Option<&[Value]> {
        self.attributes.iter().find_map(|a| match &a.value {
            AttributeValue::Complex(v) if a.name == name => Some(v.as_slice()),
            _ => None,
        })
    }

    /// Simple attributes of this group keyed by name, in file order. Later
    /// duplicates win.
    pub fn attributes_map(&self) -> IndexMap<String, Value> {
        self.attributes
            .iter()
            .filter_map(|a| match &a.value {
                AttributeValue::Simple(v) => Some((a.name.clone(), v.clone())),
                AttributeValue::Complex(_) => None,
            })
            .collect()
    }
}
