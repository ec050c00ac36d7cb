use papeleria_core::{Email, UserId, UserRole};
use sqlx::PgPool;

use crate::db::{RepositoryError, UserRepository};
use crate::models::{NewUser, User, UserUpdate};
use crate::routes::admin::form::{Field, FieldError, FieldKind, FormMode, FormValues};
use crate::routes::admin::resource::{AdminResource, cell};
use crate::services::auth::{MAX_PHONE_LENGTH, hash_password, validate_name, validate_password};

const ROLES: &[&str] = &[UserRole::Customer.as_str(), UserRole::Admin.as_str()];

/// Shop accounts. The password is required on create and kept when left
/// blank on edit.
pub struct Users;

impl AdminResource for Users {
    type Row = User;
    type Input = UserUpdate;

    const SLUG: &'static str = "users";
    const TITLE: &'static str = "Usuarios";
    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "Nombre",
        "Correo",
        "Teléfono",
        "Rol",
        "Confirmado",
        "Alta",
    ];
    const FIELDS: &'static [Field] = &[
        Field::new("name", "Nombre", FieldKind::Text),
        Field::new("email", "Correo electrónico", FieldKind::Email),
        Field::new("password", "Contraseña", FieldKind::Password),
        Field::new("phone", "Teléfono", FieldKind::Text).optional(),
        Field::new("shipping_address", "Dirección de envío", FieldKind::TextArea).optional(),
        Field::new("billing_address", "Dirección de facturación", FieldKind::TextArea).optional(),
        Field::new("role", "Rol", FieldKind::Select(ROLES)),
        Field::new("email_confirmed", "Correo confirmado", FieldKind::Checkbox),
    ];

    fn row_id(row: &User) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &User) -> Vec<String> {
        vec![
            row.id.to_string(),
            row.name.clone(),
            row.email.to_string(),
            cell(row.phone.as_ref()),
            row.role.to_string(),
            if row.email_confirmed { "sí" } else { "no" }.to_owned(),
            row.created_at.format("%Y-%m-%d").to_string(),
        ]
    }

    fn values(row: &User) -> FormValues {
        let mut values = FormValues::default();
        values.set("name", &row.name);
        values.set("email", &row.email);
        values.set_opt("phone", row.phone.as_ref());
        values.set_opt("shipping_address", row.shipping_address.as_ref());
        values.set_opt("billing_address", row.billing_address.as_ref());
        values.set("role", row.role);
        if row.email_confirmed {
            values.set("email_confirmed", "on");
        }
        values
    }

    fn parse(values: &FormValues, mode: FormMode) -> Result<UserUpdate, FieldError> {
        let name = validate_name(values.get("name"))
            .map_err(|_| FieldError::new("name", "es obligatorio"))?;
        let email = Email::parse(values.get("email"))
            .map_err(|_| FieldError::new("email", "correo no válido"))?;

        let password = values.get("password");
        let password_hash = match (password.is_empty(), mode) {
            (true, FormMode::Create) => return Err(FieldError::new("password", "es obligatorio")),
            (true, FormMode::Edit) => None,
            (false, _) => {
                validate_password(password).map_err(|_| {
                    FieldError::new(
                        "password",
                        format!(
                            "debe tener al menos {} caracteres",
                            crate::services::auth::MIN_PASSWORD_LENGTH
                        ),
                    )
                })?;
                let hash = hash_password(password).map_err(|e| {
                    tracing::error!(error = %e, "Password hashing failed");
                    FieldError::new("password", "no se pudo procesar")
                })?;
                Some(hash)
            }
        };

        Ok(UserUpdate {
            name,
            email,
            phone: values.optional_text_max("phone", MAX_PHONE_LENGTH)?,
            shipping_address: values.optional_text("shipping_address"),
            billing_address: values.optional_text("billing_address"),
            role: values.choice("role")?,
            email_confirmed: values.checkbox("email_confirmed"),
            password_hash,
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<User>, RepositoryError> {
        UserRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(pool).get_by_id(UserId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &UserUpdate) -> Result<(), RepositoryError> {
        let password_hash = input
            .password_hash
            .clone()
            .ok_or_else(|| RepositoryError::DataCorruption("new user without password".to_owned()))?;
        let user = NewUser {
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash,
            phone: input.phone.clone(),
            shipping_address: input.shipping_address.clone(),
            billing_address: input.billing_address.clone(),
            role: input.role,
            email_confirmed: input.email_confirmed,
        };
        UserRepository::new(pool).create(&user).await.map(drop)
    }

    async fn update(pool: &PgPool, id: i32, input: &UserUpdate) -> Result<(), RepositoryError> {
        UserRepository::new(pool)
            .update(UserId::new(id), input)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        UserRepository::new(pool).delete(UserId::new(id)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(password: &str) -> FormValues {
        let mut values = FormValues::default();
        values.set("name", "Ana");
        values.set("email", "Ana@Example.com");
        values.set("password", password);
        values.set("role", "admin");
        values
    }

    #[test]
    fn test_password_required_on_create() {
        let err = Users::parse(&form(""), FormMode::Create).unwrap_err();
        assert_eq!(err.field, "password");
    }

    #[test]
    fn test_blank_password_kept_on_edit() {
        let input = Users::parse(&form(""), FormMode::Edit).unwrap();
        assert!(input.password_hash.is_none());
        assert_eq!(input.email.as_str(), "ana@example.com");
        assert_eq!(input.role, UserRole::Admin);
        assert!(!input.email_confirmed);
    }

    #[test]
    fn test_new_password_is_hashed() {
        let input = Users::parse(&form("cuaderno-rojo"), FormMode::Edit).unwrap();
        let hash = input.password_hash.unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_short_password_rejected() {
        let err = Users::parse(&form("corta"), FormMode::Create).unwrap_err();
        assert_eq!(err.field, "password");
    }

    #[test]
    fn test_unknown_role_rejected() {
        let mut values = form("cuaderno-rojo");
        values.set("role", "root");
        assert_eq!(Users::parse(&values, FormMode::Create).unwrap_err().field, "role");
    }

    #[test]
    fn test_long_phone_rejected() {
        let mut values = form("cuaderno-rojo");
        values.set("phone", "+52 (55) 1234-5678 ext 99");
        assert_eq!(Users::parse(&values, FormMode::Edit).unwrap_err().field, "phone");
    }
}
