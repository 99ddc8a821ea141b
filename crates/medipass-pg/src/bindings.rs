//! Postgres role-binding store.

use async_trait::async_trait;
use medipass_core::{IdentityId, Role};
use medipass_directory::{
    DirectoryError, DirectoryResult, RoleBinding, RoleBindingStore, StoreKind,
};
use sqlx::PgPool;
use uuid::Uuid;

fn db_error(e: sqlx::Error) -> DirectoryError {
    DirectoryError::backend(StoreKind::Binding, e.to_string())
}

#[derive(Debug, sqlx::FromRow)]
struct BindingRow {
    identity_id: Uuid,
    role: String,
    account_number: String,
    patient_number: Option<String>,
}

impl BindingRow {
    fn into_model(self) -> DirectoryResult<RoleBinding> {
        let role: Role = self.role.parse().map_err(|_| {
            DirectoryError::backend(
                StoreKind::Binding,
                format!("unknown role in role_bindings: {}", self.role),
            )
        })?;
        Ok(RoleBinding {
            identity_id: IdentityId::from_uuid(self.identity_id),
            role,
            account_number: self.account_number,
            patient_number: self.patient_number,
        })
    }
}

/// [`RoleBindingStore`] over the `role_bindings` table.
#[derive(Clone)]
pub struct PgRoleBindingStore {
    pool: PgPool,
}

impl PgRoleBindingStore {
    /// Create the store over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleBindingStore for PgRoleBindingStore {
    async fn find_by_identity(
        &self,
        identity_id: IdentityId,
    ) -> DirectoryResult<Option<RoleBinding>> {
        let row: Option<BindingRow> = sqlx::query_as(
            "SELECT identity_id, role, account_number, patient_number \
             FROM role_bindings WHERE identity_id = $1",
        )
        .bind(identity_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        row.map(BindingRow::into_model).transpose()
    }

    async fn list(&self, role: Option<Role>) -> DirectoryResult<Vec<RoleBinding>> {
        let rows: Vec<BindingRow> = match role {
            Some(role) => {
                sqlx::query_as(
                    "SELECT identity_id, role, account_number, patient_number \
                     FROM role_bindings WHERE role = $1 ORDER BY account_number",
                )
                .bind(role.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(
                    "SELECT identity_id, role, account_number, patient_number \
                     FROM role_bindings ORDER BY account_number",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_error)?;
        rows.into_iter().map(BindingRow::into_model).collect()
    }

    async fn upsert(&self, binding: RoleBinding) -> DirectoryResult<()> {
        sqlx::query(
            "INSERT INTO role_bindings (identity_id, role, account_number, patient_number) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (identity_id) DO UPDATE SET \
                 role = EXCLUDED.role, \
                 account_number = EXCLUDED.account_number, \
                 patient_number = EXCLUDED.patient_number, \
                 updated_at = now()",
        )
        .bind(binding.identity_id.as_uuid())
        .bind(binding.role.as_str())
        .bind(&binding.account_number)
        .bind(&binding.patient_number)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        tracing::debug!(
            identity_id = %binding.identity_id,
            role = %binding.role,
            "Role binding upserted"
        );
        Ok(())
    }
}
