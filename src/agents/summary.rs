use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value;

/// Lossy description of an agent input, kept in history for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSummary {
    /// A keyed mapping, summarized by its keys.
    Keyed(Vec<String>),
    /// An ordered sequence, summarized by its length.
    Sequence(usize),
    /// Anything else, summarized by its type name.
    Opaque(String),
}

impl fmt::Display for InputSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyed(keys) => write!(f, "map with keys: [{}]", keys.join(", ")),
            Self::Sequence(len) => write!(f, "sequence with {} items", len),
            Self::Opaque(name) => f.write_str(name),
        }
    }
}

/// Selects the summary strategy for an input type at compile time.
pub trait SummarizeInput {
    fn summarize(&self) -> InputSummary;
}

/// Short type name without the module path, e.g. `JobQuery` for `crate::models::JobQuery`.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Implement [`SummarizeInput`] as an opaque type-name summary.
#[macro_export]
macro_rules! opaque_summary {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::agents::summary::SummarizeInput for $ty {
                fn summarize(&self) -> $crate::agents::summary::InputSummary {
                    $crate::agents::summary::InputSummary::Opaque(
                        $crate::agents::summary::short_type_name::<$ty>(),
                    )
                }
            }
        )+
    };
}

opaque_summary!(String, bool, char, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, ());

impl SummarizeInput for &str {
    fn summarize(&self) -> InputSummary {
        InputSummary::Opaque("str".to_string())
    }
}

impl<K: fmt::Display, V, S> SummarizeInput for HashMap<K, V, S> {
    fn summarize(&self) -> InputSummary {
        let mut keys: Vec<String> = self.keys().map(|k| k.to_string()).collect();
        keys.sort();
        InputSummary::Keyed(keys)
    }
}

impl<K: fmt::Display, V> SummarizeInput for BTreeMap<K, V> {
    fn summarize(&self) -> InputSummary {
        InputSummary::Keyed(self.keys().map(|k| k.to_string()).collect())
    }
}

impl<T> SummarizeInput for Vec<T> {
    fn summarize(&self) -> InputSummary {
        InputSummary::Sequence(self.len())
    }
}

impl<T> SummarizeInput for [T] {
    fn summarize(&self) -> InputSummary {
        InputSummary::Sequence(self.len())
    }
}

impl<T: SummarizeInput> SummarizeInput for Option<T> {
    fn summarize(&self) -> InputSummary {
        match self {
            Some(inner) => inner.summarize(),
            None => InputSummary::Opaque("None".to_string()),
        }
    }
}

impl<T: SummarizeInput + ?Sized> SummarizeInput for Box<T> {
    fn summarize(&self) -> InputSummary {
        (**self).summarize()
    }
}

impl<T: SummarizeInput + ?Sized> SummarizeInput for std::sync::Arc<T> {
    fn summarize(&self) -> InputSummary {
        (**self).summarize()
    }
}

impl SummarizeInput for Value {
    fn summarize(&self) -> InputSummary {
        match self {
            Value::Object(map) => InputSummary::Keyed(map.keys().cloned().collect()),
            Value::Array(items) => InputSummary::Sequence(items.len()),
            Value::String(_) => InputSummary::Opaque("string".to_string()),
            Value::Number(_) => InputSummary::Opaque("number".to_string()),
            Value::Bool(_) => InputSummary::Opaque("bool".to_string()),
            Value::Null => InputSummary::Opaque("null".to_string()),
        }
    }
}
