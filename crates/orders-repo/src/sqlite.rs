use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use orders_types::domain::bulk::OrderStats;
use orders_types::domain::order::{
    order_number_for, NewOrder, Order, OrderId, OrderPatch, OrderStatus, PaymentStatus,
};
use orders_types::domain::query::{OrderFilter, PageRequest};
use orders_types::ports::order_repository::{OrderRepository, RepoError};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

const SELECT_ORDERS: &str = "SELECT id, order_number, customer_name, customer_avatar, order_date, \
     status, total_amount, payment_status, created_at, updated_at FROM orders";

pub struct SqliteRepo {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct DbOrder {
    id: i64,
    order_number: String,
    customer_name: String,
    customer_avatar: Option<String>,
    order_date: String,
    status: String,
    total_amount: f64,
    payment_status: String,
    created_at: String,
    updated_at: String,
}

impl DbOrder {
    fn into_order(self) -> Result<Order, RepoError> {
        let status: OrderStatus = self.status.parse().map_err(db_err)?;
        let payment_status: PaymentStatus = self.payment_status.parse().map_err(db_err)?;
        let order_date = NaiveDate::parse_from_str(&self.order_date, "%Y-%m-%d").map_err(db_err)?;
        let created_at = parse_timestamp(&self.created_at)?;
        let updated_at = parse_timestamp(&self.updated_at)?;
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            customer_name: self.customer_name,
            customer_avatar: self.customer_avatar,
            order_date,
            status,
            total_amount: self.total_amount,
            payment_status,
            created_at,
            updated_at,
        })
    }
}

fn db_err(e: impl ToString) -> RepoError {
    RepoError::DbError(e.to_string())
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepoError> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(db_err)?
        .with_timezone(&Utc))
}

// Fixed width so that text ordering in SQL matches chronological ordering.
fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &OrderFilter) {
    let mut keyword = " WHERE ";
    if let Some(status) = filter.status {
        qb.push(keyword).push("status = ").push_bind(status.as_str());
        keyword = " AND ";
    }
    if let Some(payment) = filter.payment_status {
        qb.push(keyword)
            .push("payment_status = ")
            .push_bind(payment.as_str());
        keyword = " AND ";
    }
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        qb.push(keyword)
            .push("(order_number LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR customer_name LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[OrderId]) {
    qb.push(" WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

/// Inserts a row for `draft` and assigns its order number from the new id.
async fn insert_order(
    conn: &mut SqliteConnection,
    draft: NewOrder,
    now: DateTime<Utc>,
) -> Result<Order, RepoError> {
    // The number depends on the id, so a unique placeholder fills the slot first.
    let placeholder = format!("pending-{}", Uuid::new_v4());
    let inserted = sqlx::query(
        "INSERT INTO orders (order_number, customer_name, customer_avatar, order_date, status,
             total_amount, payment_status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(placeholder)
    .bind(&draft.customer_name)
    .bind(&draft.customer_avatar)
    .bind(draft.order_date.format("%Y-%m-%d").to_string())
    .bind(draft.status.as_str())
    .bind(draft.total_amount)
    .bind(draft.payment_status.as_str())
    .bind(timestamp(now))
    .bind(timestamp(now))
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;

    let id = inserted.last_insert_rowid();
    sqlx::query("UPDATE orders SET order_number = ? WHERE id = ?")
        .bind(order_number_for(id))
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    Ok(Order::from_draft(id, draft, now))
}

async fn fetch_order(conn: &mut SqliteConnection, id: OrderId) -> Result<Option<Order>, RepoError> {
    let row: Option<DbOrder> = sqlx::query_as(&format!("{SELECT_ORDERS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    row.map(DbOrder::into_order).transpose()
}

impl SqliteRepo {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await?;

        let ddl = include_str!("../migrations/0001_create_orders.sql");
        for statement in ddl.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&pool).await?;
        }

        Ok(Self { pool })
    }
}

#[async_trait]
impl OrderRepository for SqliteRepo {
    async fn create(&self, draft: NewOrder) -> Result<Order, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let order = insert_order(&mut tx, draft, Utc::now()).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        fetch_order(&mut conn, id).await
    }

    async fn list(&self, request: &PageRequest) -> Result<(Vec<Order>, u64), RepoError> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM orders");
        push_filter(&mut count, &request.filter);
        let total: i64 = count
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?
            .try_get(0)
            .map_err(db_err)?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_ORDERS);
        push_filter(&mut select, &request.filter);
        select
            .push(" ORDER BY ")
            .push(request.sort_by.as_str())
            .push(" ")
            .push(request.sort_order.as_sql())
            .push(", id ASC LIMIT ")
            .push_bind(i64::from(request.per_page))
            .push(" OFFSET ")
            .push_bind(i64::try_from(request.offset()).unwrap_or(i64::MAX));
        let rows: Vec<DbOrder> = select
            .build_query_as::<DbOrder>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let orders = rows
            .into_iter()
            .map(DbOrder::into_order)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((orders, u64::try_from(total).unwrap_or_default()))
    }

    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Option<Order>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let Some(mut order) = fetch_order(&mut tx, id).await? else {
            return Ok(None);
        };
        order.apply(&patch);
        sqlx::query(
            "UPDATE orders SET customer_name = ?, customer_avatar = ?, order_date = ?, status = ?,
                 total_amount = ?, payment_status = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&order.customer_name)
        .bind(&order.customer_avatar)
        .bind(order.order_date.format("%Y-%m-%d").to_string())
        .bind(order.status.as_str())
        .bind(order.total_amount)
        .bind(order.payment_status.as_str())
        .bind(timestamp(order.updated_at))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(Some(order))
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn bulk_update_status(
        &self,
        ids: &[OrderId],
        status: OrderStatus,
    ) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE orders SET status = ");
        qb.push_bind(status.as_str())
            .push(", updated_at = MAX(updated_at, ")
            .push_bind(timestamp(Utc::now()))
            .push(")");
        push_id_list(&mut qb, ids);
        let res = qb.build().execute(&self.pool).await.map_err(db_err)?;
        Ok(res.rows_affected())
    }

    async fn bulk_duplicate(&self, ids: &[OrderId]) -> Result<Vec<OrderId>, RepoError> {
        let mut seen = std::collections::HashSet::new();
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut new_ids = Vec::new();
        for id in ids.iter().copied().filter(|id| seen.insert(*id)) {
            if let Some(original) = fetch_order(&mut tx, id).await? {
                let copy = insert_order(&mut tx, original.to_draft(), Utc::now()).await?;
                new_ids.push(copy.id);
            }
        }
        tx.commit().await.map_err(db_err)?;
        Ok(new_ids)
    }

    async fn bulk_delete(&self, ids: &[OrderId]) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM orders");
        push_id_list(&mut qb, ids);
        let res = qb.build().execute(&self.pool).await.map_err(db_err)?;
        Ok(res.rows_affected())
    }

    async fn stats(&self, today: NaiveDate) -> Result<OrderStats, RepoError> {
        let this_month: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE substr(order_date, 1, 7) = ?")
                .bind(today.format("%Y-%m").to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;

        let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM orders GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut stats = OrderStats {
            total_this_month: u64::try_from(this_month).unwrap_or_default(),
            ..OrderStats::default()
        };
        for row in rows {
            let status: String = row.try_get("status").map_err(db_err)?;
            let count: i64 = row.try_get("count").map_err(db_err)?;
            let count = u64::try_from(count).unwrap_or_default();
            match status.parse::<OrderStatus>().map_err(db_err)? {
                OrderStatus::Pending => stats.pending = count,
                OrderStatus::Completed => stats.shipped = count,
                OrderStatus::Refunded => stats.refunded = count,
            }
        }
        Ok(stats)
    }
}
