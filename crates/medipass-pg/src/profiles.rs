//! Postgres profile stores.
//!
//! One table per [`ProfileKind`]; [`table`] is the single dispatch
//! point from kind to relation. Table names come from that fixed
//! mapping only, never from input, so interpolating them into SQL is
//! safe.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medipass_core::{IdentityId, ProfileId, ProfileKind};
use medipass_directory::{
    DirectoryError, DirectoryResult, NewProfile, ProfileLinkUpdate, ProfileRecord, ProfileStore,
    StoreKind,
};
use sqlx::PgPool;
use uuid::Uuid;

/// The relation backing a profile kind.
#[must_use]
pub fn table(kind: ProfileKind) -> &'static str {
    match kind {
        ProfileKind::Doctor => "doctors",
        ProfileKind::MedTech => "med_techs",
        ProfileKind::RadTech => "rad_techs",
        ProfileKind::Patient => "patients",
    }
}

const COLUMNS: &str = "id, name, account_number, identity_id, shadow_password, specialty, created_at";

fn db_error(e: sqlx::Error) -> DirectoryError {
    DirectoryError::backend(StoreKind::Profile, e.to_string())
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    name: String,
    account_number: String,
    identity_id: Option<Uuid>,
    shadow_password: Option<String>,
    specialty: Option<String>,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_model(self, kind: ProfileKind) -> ProfileRecord {
        ProfileRecord {
            id: ProfileId::from_uuid(self.id),
            kind,
            name: self.name,
            account_number: self.account_number,
            identity_id: self.identity_id.map(IdentityId::from_uuid),
            shadow_password: self.shadow_password,
            specialty: self.specialty,
            created_at: self.created_at,
        }
    }
}

/// [`ProfileStore`] over the per-kind profile tables.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    /// Create the store over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(
        &self,
        kind: ProfileKind,
        id: ProfileId,
    ) -> DirectoryResult<Option<ProfileRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", table(kind));
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(|r| r.into_model(kind)))
    }

    async fn find_by_identity(
        &self,
        kind: ProfileKind,
        identity_id: IdentityId,
    ) -> DirectoryResult<Option<ProfileRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE identity_id = $1",
            table(kind)
        );
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(identity_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(|r| r.into_model(kind)))
    }

    async fn list_unlinked(&self, kind: ProfileKind) -> DirectoryResult<Vec<ProfileRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE identity_id IS NULL ORDER BY account_number",
            table(kind)
        );
        let rows: Vec<ProfileRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(|r| r.into_model(kind)).collect())
    }

    async fn create(&self, new: NewProfile) -> DirectoryResult<ProfileRecord> {
        let id = ProfileId::new();
        let sql = format!(
            "INSERT INTO {} (id, name, account_number, identity_id, shadow_password, specialty) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}",
            table(new.kind)
        );
        let row: ProfileRow = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .bind(&new.name)
            .bind(&new.account_number)
            .bind(new.identity_id.map(|i| *i.as_uuid()))
            .bind(&new.shadow_password)
            .bind(&new.specialty)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        tracing::debug!(profile_id = %id, kind = %new.kind, "Profile created");
        Ok(row.into_model(new.kind))
    }

    async fn link_identity(
        &self,
        kind: ProfileKind,
        id: ProfileId,
        update: ProfileLinkUpdate,
    ) -> DirectoryResult<()> {
        let sql = format!(
            "UPDATE {} SET identity_id = $2, \
                 account_number = COALESCE($3, account_number), \
                 specialty = COALESCE($4, specialty) \
             WHERE id = $1",
            table(kind)
        );
        let result = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(update.identity_id.as_uuid())
            .bind(&update.account_number)
            .bind(&update.specialty)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(DirectoryError::not_found("Profile", Some(id.to_string())));
        }
        Ok(())
    }

    async fn set_shadow_password(
        &self,
        kind: ProfileKind,
        id: ProfileId,
        plaintext: &str,
    ) -> DirectoryResult<()> {
        let sql = format!(
            "UPDATE {} SET shadow_password = $2 WHERE id = $1",
            table(kind)
        );
        let result = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(plaintext)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(DirectoryError::not_found("Profile", Some(id.to_string())));
        }
        Ok(())
    }
}
