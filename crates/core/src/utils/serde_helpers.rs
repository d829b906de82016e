//! Serde helpers

/// Implement case-insensitive deserialization for a fieldless enum.
///
/// Config files are hand-edited, so `"JavaScript"` and `"javascript"` must
/// both resolve to the same variant.
///
/// ```ignore
/// impl_case_insensitive_deserialize!(
///     Language,
///     JavaScript => "javascript",
///     Python => "python"
/// );
/// ```
#[macro_export]
macro_rules! impl_case_insensitive_deserialize {
    ($enum_type:ty, $($variant:ident => $str_val:expr),+ $(,)?) => {
        impl<'de> serde::Deserialize<'de> for $enum_type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                match s.to_lowercase().as_str() {
                    $(
                        $str_val => Ok(Self::$variant),
                    )+
                    _ => Err(serde::de::Error::custom(format!(
                        "unknown variant '{}', expected one of: {}",
                        s,
                        [$($str_val),+].join(", ")
                    ))),
                }
            }
        }
    };
}
