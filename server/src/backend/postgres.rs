use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{
    BackendResult, EventsTable, IdentityService, PurchaseProcedure, PurchaseReceipt, TicketsTable,
};
use crate::models::{Event, NewEvent, Ticket, User, UserRole};

const EVENT_COLUMNS: &str = "id, title, description, date, time, location, price, image_url, \
     available_seats, organizer_id, created_at";

#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityService for PgBackend {
    async fn user_for_token(&self, token: &str) -> BackendResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.name, u.email
             FROM auth_sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.token = $1
               AND (s.expires_at IS NULL OR s.expires_at > now())",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn role_of(&self, user_id: Uuid) -> BackendResult<Option<UserRole>> {
        let role: Option<(String,)> =
            sqlx::query_as("SELECT role FROM user_roles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(role.and_then(|(role,)| UserRole::parse(&role)))
    }

    async fn revoke(&self, token: &str) -> BackendResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl EventsTable for PgBackend {
    async fn select_ordered(&self) -> BackendResult<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY date ASC, time ASC");
        let events = sqlx::query_as::<_, Event>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn select_by_id(&self, id: Uuid) -> BackendResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn insert(
        &self,
        event: &NewEvent,
        organizer_id: Uuid,
        image_url: &str,
    ) -> BackendResult<Event> {
        let sql = format!(
            "INSERT INTO events
                (title, description, date, time, location, price, image_url,
                 available_seats, organizer_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {EVENT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Event>(&sql)
            .bind(event.title.trim())
            .bind(event.description.trim())
            .bind(event.date)
            .bind(event.time.trim())
            .bind(event.location.trim())
            .bind(event.price)
            .bind(image_url)
            .bind(event.available_seats)
            .bind(organizer_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }
}

#[async_trait]
impl PurchaseProcedure for PgBackend {
    async fn purchase_ticket(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        idempotency_key: Option<Uuid>,
    ) -> BackendResult<PurchaseReceipt> {
        let receipt = sqlx::query_as::<_, PurchaseReceipt>(
            "SELECT success, reason, ticket_id, event_id, qr_code, issued_at, message
             FROM purchase_ticket($1, $2, $3)",
        )
        .bind(event_id)
        .bind(user_id)
        .bind(idempotency_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(receipt)
    }
}

#[derive(FromRow)]
struct TicketRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    purchased_at: DateTime<Utc>,
    qr_code_data: String,
    event_title: String,
    event_description: String,
    event_date: NaiveDate,
    event_time: String,
    event_location: String,
    event_price: Decimal,
    event_image_url: String,
    event_available_seats: i32,
    event_organizer_id: Uuid,
    event_created_at: DateTime<Utc>,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        let event = Event {
            id: row.event_id,
            title: row.event_title,
            description: row.event_description,
            date: row.event_date,
            time: row.event_time,
            location: row.event_location,
            price: row.event_price,
            image_url: row.event_image_url,
            available_seats: row.event_available_seats,
            organizer_id: row.event_organizer_id,
            created_at: row.event_created_at,
        };

        Ticket {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            purchased_at: row.purchased_at,
            qr_code_data: row.qr_code_data,
            event: Some(event),
        }
    }
}

#[async_trait]
impl TicketsTable for PgBackend {
    async fn select_for_user(&self, user_id: Uuid) -> BackendResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            "SELECT t.id, t.event_id, t.user_id, t.purchased_at, t.qr_code_data,
                    e.title AS event_title,
                    e.description AS event_description,
                    e.date AS event_date,
                    e.time AS event_time,
                    e.location AS event_location,
                    e.price AS event_price,
                    e.image_url AS event_image_url,
                    e.available_seats AS event_available_seats,
                    e.organizer_id AS event_organizer_id,
                    e.created_at AS event_created_at
             FROM tickets t
             JOIN events e ON e.id = t.event_id
             WHERE t.user_id = $1
             ORDER BY t.purchased_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Ticket::from).collect())
    }
}
