use lazy_static::lazy_static;
use regex::Regex;
use serde::de::Visitor;
use serde_with::DeserializeAs;
use std::{marker::PhantomData, str::FromStr};

/// Ignore thousands separators when parsing numbers written as strings.
/// e.g. `"13,096"` -> 13096, `"65.5"` -> 65.5
pub struct IgnoreComma<T>
where
    T: FromStr,
{
    _t: PhantomData<T>,
}

impl<'de, T> DeserializeAs<'de, T> for IgnoreComma<T>
where
    T: FromStr,
{
    fn deserialize_as<D>(deserializer: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Helper<TT>
        where
            TT: FromStr,
        {
            _tt: PhantomData<TT>,
        }

        impl<'de, TT> Visitor<'de> for Helper<TT>
        where
            TT: FromStr,
        {
            type Value = TT;

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let cleaned: String = v.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
                TT::from_str(&cleaned)
                    .map_err(|_| E::custom(format!("'{}' is not a number", v)))
            }

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a number, possibly with thousands separators")
            }
        }

        deserializer.deserialize_str(Helper::<T> { _tt: PhantomData })
    }
}

/// Reduce a product name to a vendor-free matching key.
///
/// ## Example
/// ```txt
/// "NVIDIA GeForce RTX 4070" -> "rtx 4070"
/// "AMD Ryzen 5 7600X"       -> "ryzen 5 7600x"
/// "Intel Core i5-12400F"    -> "core i512400f"
/// ```
pub fn normalize_name<S: AsRef<str>>(name: S) -> String {
    lazy_static! {
        static ref RE_VENDOR: Regex = Regex::new(r"\b(nvidia|amd|intel|geforce|radeon)\b").unwrap();
        static ref RE_SYMBOLS: Regex = Regex::new(r"[^a-z0-9\s]").unwrap();
    }
    let lower = name.as_ref().to_lowercase();
    let without_vendor = RE_VENDOR.replace_all(&lower, "");
    let cleaned = RE_SYMBOLS.replace_all(&without_vendor, "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
