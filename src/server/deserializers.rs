use std::{fmt, marker::PhantomData};

use serde::{
    de::{value::MapAccessDeserializer, MapAccess, Visitor},
    Deserialize, Deserializer,
};

/// Request body that must be a JSON object. Derived struct impls also accept
/// arrays filled by position, which the API treats as malformed.
pub struct Object<T>(pub T);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Object<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ObjectVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for ObjectVisitor<T> {
            type Value = Object<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                T::deserialize(MapAccessDeserializer::new(map)).map(Object)
            }
        }

        deserializer.deserialize_map(ObjectVisitor(PhantomData))
    }
}

// html selects post their values as strings, so numeric fields accept both
// `4` and `"4"`
#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IntOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrString::Int(value)) => Ok(Some(value)),
        Some(IntOrString::Str(value)) if value.trim().is_empty() => Ok(None),
        Some(IntOrString::Str(value)) => value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("Wrong value {value}, can not parse to i64"))),
    }
}

// anything that is not an integer falls back to the first page
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "deserialize_optional_i64")]
        category: Option<i64>,
    }

    fn category(value: serde_json::Value) -> Result<Option<i64>, serde_json::Error> {
        serde_json::from_value::<Body>(value).map(|b| b.category)
    }

    #[test]
    fn accepts_integers_and_numeric_strings() {
        assert_eq!(category(json!({"category": 4})).unwrap(), Some(4));
        assert_eq!(category(json!({"category": "4"})).unwrap(), Some(4));
        assert_eq!(category(json!({"category": ""})).unwrap(), None);
        assert_eq!(category(json!({"category": null})).unwrap(), None);
        assert_eq!(category(json!({})).unwrap(), None);
    }

    #[test]
    fn object_rejects_arrays() {
        let positional = serde_json::from_value::<Object<Body>>(json!([4]));
        assert!(positional.is_err());
        let Object(body) = serde_json::from_value::<Object<Body>>(json!({"category": "2"})).unwrap();
        assert_eq!(body.category, Some(2));
    }

    #[test]
    fn rejects_garbage() {
        assert!(category(json!({"category": "science"})).is_err());
        assert!(category(json!({"category": [1]})).is_err());
    }
}
