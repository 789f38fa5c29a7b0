use chrono::{Days, NaiveDate};
use orders_types::domain::order::{NewOrder, OrderStatus, PaymentStatus};
use orders_types::ports::order_repository::OrderRepository;

use super::order_service::OrderService;
use crate::errors::AppError;

const CUSTOMERS: [&str; 15] = [
    "Esther Kiehn",
    "Denise Kuhn",
    "Clint Hoppe",
    "Darin Deckow",
    "Jacquelyn Robel",
    "Erin Bins",
    "Gretchen Quitz",
    "Stewart Kulas",
    "Sarah Johnson",
    "Michael Chen",
    "Emily Rodriguez",
    "David Kim",
    "Jessica Martinez",
    "James Wilson",
    "Lisa Anderson",
];

// Knuth multiplicative hash; spreads consecutive indices over the roster.
fn mix(i: usize) -> u64 {
    (i as u64 + 1).wrapping_mul(2_654_435_761) % 1_000_003
}

/// Demo orders dated within the 30 days before `today`, roughly 25% pending,
/// 65% completed and 10% refunded. The output is deterministic.
pub fn demo_orders(count: usize, today: NaiveDate) -> Vec<NewOrder> {
    (0..count)
        .map(|i| {
            let h = mix(i);
            let status = match i % 20 {
                0..=4 => OrderStatus::Pending,
                5..=17 => OrderStatus::Completed,
                _ => OrderStatus::Refunded,
            };
            let payment_status = match status {
                OrderStatus::Completed if h % 10 == 0 => PaymentStatus::Unpaid,
                OrderStatus::Completed | OrderStatus::Refunded => PaymentStatus::Paid,
                OrderStatus::Pending if h % 2 == 0 => PaymentStatus::Paid,
                OrderStatus::Pending => PaymentStatus::Unpaid,
            };
            let order_date = today
                .checked_sub_days(Days::new(h % 31))
                .unwrap_or(today);
            NewOrder {
                customer_name: CUSTOMERS[(h as usize) % CUSTOMERS.len()].to_string(),
                customer_avatar: None,
                order_date,
                status,
                total_amount: 10.0 + (h % 99_000) as f64 / 100.0,
                payment_status,
            }
        })
        .collect()
}

pub async fn seed_orders<R: OrderRepository>(
    service: &OrderService<R>,
    count: usize,
    today: NaiveDate,
) -> Result<usize, AppError> {
    for draft in demo_orders(count, today) {
        service.create_order(draft).await?;
    }
    tracing::info!(count, "seeded demo orders");
    Ok(count)
}
