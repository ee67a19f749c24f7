use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::comment::Comment;
use crate::models::dismissal::{DismissalType, DismissedNotification};
use crate::models::lead::Lead;
use crate::models::user::{CurrentUser, Role, User};
use crate::nudge::engine::LeadActivity;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Partial update payload for a lead. `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct LeadPatch {
    pub name: Option<String>,
    pub status: Option<String>,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub owner_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // -- User Operations --

    pub async fn insert_user(&self, email: &str, name: &str, role: Role) -> anyhow::Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (email, name, role) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(email)
        .bind(name)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, User>(
            "SELECT id, email, name, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            "SELECT id, email, name, role, created_at FROM users ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // -- Session Operations --

    pub async fn insert_session(
        &self,
        token_hash: &str,
        user_id: Uuid,
        ttl_days: i64,
    ) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token_hash)
            .bind(user_id)
            .bind(Utc::now() + Duration::days(ttl_days))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Resolve a session token hash to the immutable per-request identity.
    /// Expired sessions resolve to `None`.
    pub async fn resolve_session(&self, token_hash: &str) -> Result<Option<CurrentUser>, sqlx::Error> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            r#"SELECT u.id, u.role FROM sessions s
               JOIN users u ON u.id = s.user_id
               WHERE s.token_hash = $1 AND s.expires_at > NOW()"#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, role)| CurrentUser {
            id,
            role: Role::from_str(&role),
        }))
    }

    // -- Lead Operations --

    pub async fn insert_lead(
        &self,
        name: &str,
        status: &str,
        value: f64,
        currency: &str,
        owner_id: Option<Uuid>,
    ) -> Result<Lead, sqlx::Error> {
        sqlx::query_as::<_, Lead>(
            r#"INSERT INTO leads (name, status, value, currency, owner_id)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, name, status, value, currency, owner_id, is_active, created_at, status_changed_at"#,
        )
        .bind(name)
        .bind(status)
        .bind(value)
        .bind(currency)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
    }

    /// List leads visible to a scope: `None` means all (admin), `Some(uid)`
    /// restricts to that owner.
    pub async fn list_leads(&self, scope: Option<Uuid>) -> Result<Vec<Lead>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(
            r#"SELECT id, name, status, value, currency, owner_id, is_active, created_at, status_changed_at
               FROM leads
               WHERE ($1::uuid IS NULL OR owner_id = $1)
               ORDER BY created_at DESC"#,
        )
        .bind(scope)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(
            r#"SELECT id, name, status, value, currency, owner_id, is_active, created_at, status_changed_at
               FROM leads WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Apply a partial update. `status_changed_at` refreshes only when the
    /// status actually transitions (old column values are visible on the
    /// right-hand side of SET).
    pub async fn update_lead(&self, id: Uuid, patch: &LeadPatch) -> Result<Option<Lead>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(
            r#"UPDATE leads SET
                 name = COALESCE($2, name),
                 value = COALESCE($3, value),
                 currency = COALESCE($4, currency),
                 owner_id = COALESCE($5, owner_id),
                 is_active = COALESCE($6, is_active),
                 status = COALESCE($7, status),
                 status_changed_at = CASE
                   WHEN $7 IS NOT NULL AND $7 IS DISTINCT FROM status THEN NOW()
                   ELSE status_changed_at
                 END
               WHERE id = $1
               RETURNING id, name, status, value, currency, owner_id, is_active, created_at, status_changed_at"#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(patch.value)
        .bind(&patch.currency)
        .bind(patch.owner_id)
        .bind(patch.is_active)
        .bind(&patch.status)
        .fetch_optional(&self.pool)
        .await
    }

    /// Bulk activity scan feeding the nudge engine: one row per open, active,
    /// visible lead with the latest comment timestamp joined in. Single
    /// round trip, newest lead first.
    pub async fn lead_activity(&self, scope: Option<Uuid>) -> Result<Vec<LeadActivity>, sqlx::Error> {
        sqlx::query_as::<_, LeadActivity>(
            r#"SELECT l.id AS lead_id, l.name AS lead_name, l.created_at,
                      (SELECT MAX(c.created_at) FROM comments c WHERE c.lead_id = l.id) AS last_comment_at
               FROM leads l
               WHERE l.is_active = TRUE
                 AND l.status NOT IN ('WON', 'LOST', 'CLOSED')
                 AND ($1::uuid IS NULL OR l.owner_id = $1)
               ORDER BY l.created_at DESC"#,
        )
        .bind(scope)
        .fetch_all(&self.pool)
        .await
    }

    // -- Comment Operations --

    pub async fn insert_comment(
        &self,
        lead_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"INSERT INTO comments (lead_id, author_id, content)
               VALUES ($1, $2, $3)
               RETURNING id, lead_id, author_id, content, created_at"#,
        )
        .bind(lead_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_comments(&self, lead_id: Uuid) -> Result<Vec<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"SELECT id, lead_id, author_id, content, created_at
               FROM comments WHERE lead_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await
    }

    // -- Dismissal Operations --

    /// Create-or-refresh a suppression row. The primary key on
    /// (user_id, lead_id, type) makes this race-safe and idempotent.
    pub async fn upsert_dismissal(
        &self,
        user_id: Uuid,
        lead_id: Uuid,
        kind: DismissalType,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO dismissed_notifications (user_id, lead_id, type, dismissed_at)
               VALUES ($1, $2, $3, NOW())
               ON CONFLICT (user_id, lead_id, type)
               DO UPDATE SET dismissed_at = NOW()"#,
        )
        .bind(user_id)
        .bind(lead_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn clear_dismissals(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dismissed_notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_dismissals(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<DismissedNotification>, sqlx::Error> {
        sqlx::query_as::<_, DismissedNotification>(
            r#"SELECT user_id, lead_id, type, dismissed_at
               FROM dismissed_notifications WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// The caller's suppression set in the shape the engine filters on.
    /// Rows with unknown types (left over from removed notification kinds)
    /// are skipped.
    pub async fn dismissed_set(
        &self,
        user_id: Uuid,
    ) -> Result<std::collections::HashSet<(Uuid, DismissalType)>, sqlx::Error> {
        let rows = self.list_dismissals(user_id).await?;
        Ok(rows
            .into_iter()
            .filter_map(|d| DismissalType::from_str(&d.r#type).map(|t| (d.lead_id, t)))
            .collect())
    }

    pub async fn lead_exists(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM leads WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }
}
