//! Keyword-valued style settings.
//!
//! Stored styles carry values such as transition names and badge models as
//! plain strings, and other clients add new ones over time. Known keywords map
//! to variants; anything else is kept verbatim in `Other` and written back
//! unchanged.

macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            Other(String),
        }

        impl $name {
            /// Every keyword with a dedicated variant, in presentation order.
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $value, )+
                    $name::Other(value) => value,
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $( $value => $name::$variant, )+
                    _ => $name::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                match value {
                    $name::Other(value) => value,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use keyword_enum;

#[cfg(test)]
mod tests {
    use crate::style::{BadgeModel, Transition};
    use serde_json::json;

    #[test]
    fn test_unknown_keyword_is_written_back_verbatim() {
        let model: BadgeModel = serde_json::from_value(json!("holo-foil")).unwrap();
        assert_eq!(model, BadgeModel::Other("holo-foil".into()));
        assert_eq!(serde_json::to_value(&model).unwrap(), json!("holo-foil"));
    }

    #[test]
    fn test_known_keyword_maps_to_variant() {
        let model: BadgeModel = serde_json::from_value(json!("price-tag")).unwrap();
        assert_eq!(model, BadgeModel::PriceTag);
        assert_eq!(Transition::from("slide-left"), Transition::SlideLeft);
        assert_eq!(Transition::SlideLeft.to_string(), "slide-left");
        assert!(Transition::KNOWN.contains(&Transition::None));
    }
}
