//! Role, order status and discount kind enums.
//!
//! These are stored as plain `TEXT` columns with the shop's Spanish values
//! (`cliente`, `pendiente`, `porcentaje`, ...), so each enum has a string
//! form used by the database, the admin forms and the templates.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a stored or submitted value is not a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The offending value.
    pub value: String,
}

/// Implements `as_str`, `ALL`, `Display`, `FromStr` and `TEXT` sqlx support.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stored string form.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, ::sqlx::error::BoxDynError> {
                let s = <&str as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(s.parse::<Self>()?)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <&str as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

/// Account role. Only `Admin` may use the administration panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular shop customer.
    #[default]
    #[serde(rename = "cliente")]
    Customer,
    /// Shop administrator.
    Admin,
}

text_enum!(UserRole, "user role", {
    Customer => "cliente",
    Admin => "admin",
});

impl UserRole {
    /// Whether this role grants access to the admin panel.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Lifecycle of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

text_enum!(OrderStatus, "order status", {
    Pending => "pendiente",
    Paid => "pagado",
    Shipped => "enviado",
    Delivered => "entregado",
    Cancelled => "cancelado",
});

/// How a discount code reduces the order subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountKind {
    /// `value` is a percentage of the subtotal (e.g. `15.00` = 15%).
    Percentage,
    /// `value` is an amount subtracted from the subtotal.
    Fixed,
}

text_enum!(DiscountKind, "discount kind", {
    Percentage => "porcentaje",
    Fixed => "fijo",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_strings() {
        assert_eq!(UserRole::default(), UserRole::Customer);
        assert_eq!(UserRole::Customer.as_str(), "cliente");
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Customer.is_admin());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let err = "super_admin".parse::<UserRole>().unwrap_err();
        assert_eq!(err.kind, "user role");
        assert_eq!(err.to_string(), "invalid user role: super_admin");
    }

    #[test]
    fn test_order_status_defaults_to_pending() {
        assert_eq!(OrderStatus::default().as_str(), "pendiente");
        assert_eq!(" enviado ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(OrderStatus::ALL.len(), 5);
    }

    #[test]
    fn test_discount_kind_strings() {
        assert_eq!(DiscountKind::Percentage.to_string(), "porcentaje");
        assert_eq!("fijo".parse::<DiscountKind>().unwrap(), DiscountKind::Fixed);
        assert!("percent".parse::<DiscountKind>().is_err());
    }
}
