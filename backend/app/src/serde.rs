use std::fmt::Display;

use serde::{Deserialize, de::Error};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber<T> {
    String(String),
    Number(T),
}

pub fn deserialize_number<'de, T, D>(deserialize: D) -> Result<T, D::Error>
where
    T: std::str::FromStr + Deserialize<'de>,
    D: serde::Deserializer<'de>,
    T::Err: Display,
{
    match StringOrNumber::<T>::deserialize(deserialize)? {
        StringOrNumber::String(s) => s
            .parse::<T>()
            .map_err(|e| Error::custom(format!("Failed to parse string: {}", e))),
        StringOrNumber::Number(n) => Ok(n),
    }
}

/// `a,b,,c` -> `["a", "b", "c"]`; query strings carry lists comma-separated.
pub fn deserialize_comma_list<'de, T, D>(deserialize: D) -> Result<Vec<T>, D::Error>
where
    T: std::str::FromStr,
    D: serde::Deserializer<'de>,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserialize)?;

    raw.as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<T>()
                .map_err(|e| Error::custom(format!("Failed to parse list item {item:?}: {e}")))
        })
        .collect()
}
