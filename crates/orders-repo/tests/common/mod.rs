#![allow(dead_code)]

use chrono::NaiveDate;
use orders_types::domain::order::{NewOrder, OrderStatus, PaymentStatus};
use orders_types::domain::query::{ListQuery, SortField, SortOrder};
use orders_types::ports::order_repository::OrderRepository;

pub fn draft(name: &str, status: OrderStatus, amount: f64, date: NaiveDate) -> NewOrder {
    NewOrder {
        customer_name: name.into(),
        customer_avatar: None,
        order_date: date,
        status,
        total_amount: amount,
        payment_status: PaymentStatus::Paid,
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

pub async fn crud_flow<R: OrderRepository>(repo: &R) {
    let created = repo
        .create(draft("Esther Kiehn", OrderStatus::Pending, 50.0, day(1)))
        .await
        .unwrap();
    assert_eq!(created.order_number, format!("#ORD{}", 1000 + created.id));

    let fetched = repo.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.customer_name, "Esther Kiehn");
    assert_eq!(fetched.order_date, day(1));

    let (listed, total) = repo.list(&ListQuery::default().normalize()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(listed.len(), 1);

    let updated = repo
        .update(
            created.id,
            orders_types::domain::order::OrderPatch::status(OrderStatus::Completed),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Completed);
    assert_eq!(updated.customer_name, "Esther Kiehn");
    assert!(updated.updated_at >= created.updated_at);

    assert!(repo.delete(created.id).await.unwrap());
    assert!(repo.get(created.id).await.unwrap().is_none());
}

pub async fn missing_rows<R: OrderRepository>(repo: &R) {
    assert!(repo.get(999).await.unwrap().is_none());
    let updated = repo
        .update(
            999,
            orders_types::domain::order::OrderPatch::status(OrderStatus::Refunded),
        )
        .await
        .unwrap();
    assert!(updated.is_none());
    assert!(!repo.delete(999).await.unwrap());
    assert_eq!(repo.bulk_delete(&[999]).await.unwrap(), 0);
    assert!(repo.bulk_duplicate(&[999]).await.unwrap().is_empty());
}

/// Sorting must happen over the whole filtered set before paging.
pub async fn paging_sorts_whole_collection<R: OrderRepository>(repo: &R) {
    let amounts = [30.0, 10.0, 50.0, 20.0, 40.0];
    for (i, amount) in amounts.iter().enumerate() {
        repo.create(draft(
            &format!("Customer {i}"),
            OrderStatus::Pending,
            *amount,
            day(i as u32 + 1),
        ))
        .await
        .unwrap();
    }
    repo.create(draft("Other", OrderStatus::Refunded, 5.0, day(9)))
        .await
        .unwrap();

    let query = |page| ListQuery {
        page: Some(page),
        per_page: Some(2),
        status: Some(OrderStatus::Pending),
        sort_by: Some(SortField::TotalAmount),
        sort_order: Some(SortOrder::Asc),
        ..ListQuery::default()
    };

    let mut seen = Vec::new();
    for page in 1..=3 {
        let (orders, total) = repo.list(&query(page).normalize()).await.unwrap();
        assert_eq!(total, 5);
        seen.extend(orders.iter().map(|o| o.total_amount));
    }
    assert_eq!(seen, vec![10.0, 20.0, 30.0, 40.0, 50.0]);

    let (desc, _) = repo
        .list(
            &ListQuery {
                sort_by: Some(SortField::OrderDate),
                sort_order: Some(SortOrder::Desc),
                per_page: Some(1),
                ..ListQuery::default()
            }
            .normalize(),
        )
        .await
        .unwrap();
    assert_eq!(desc[0].customer_name, "Other");
}

pub async fn search_is_case_insensitive<R: OrderRepository>(repo: &R) {
    repo.create(draft("Denise Kuhn", OrderStatus::Pending, 12.0, day(2)))
        .await
        .unwrap();
    let clint = repo
        .create(draft("Clint Hoppe", OrderStatus::Completed, 15.0, day(3)))
        .await
        .unwrap();

    let search = |term: &str| ListQuery {
        search: Some(term.into()),
        ..ListQuery::default()
    };

    let (by_name, total) = repo.list(&search("kuhn").normalize()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(by_name[0].customer_name, "Denise Kuhn");

    let (by_number, _) = repo
        .list(&search(&clint.order_number).normalize())
        .await
        .unwrap();
    assert_eq!(by_number.len(), 1);
    assert_eq!(by_number[0].id, clint.id);

    let (none, total) = repo.list(&search("100%").normalize()).await.unwrap();
    assert!(none.is_empty());
    assert_eq!(total, 0);
}

pub async fn bulk_operations<R: OrderRepository>(repo: &R) {
    let mut ids = Vec::new();
    for i in 0..3 {
        let o = repo
            .create(draft(&format!("Bulk {i}"), OrderStatus::Pending, 10.0, day(4)))
            .await
            .unwrap();
        ids.push(o.id);
    }

    let updated = repo
        .bulk_update_status(&[ids[0], ids[1], 4242], OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(updated, 2);
    let first = repo.get(ids[0]).await.unwrap().unwrap();
    assert_eq!(first.status, OrderStatus::Completed);

    let copies = repo.bulk_duplicate(&[ids[0], ids[2]]).await.unwrap();
    assert_eq!(copies.len(), 2);
    let copy = repo.get(copies[0]).await.unwrap().unwrap();
    assert_eq!(copy.customer_name, "Bulk 0");
    assert_eq!(copy.status, OrderStatus::Completed);
    assert_ne!(copy.order_number, first.order_number);
    assert!(copies.iter().all(|id| !ids.contains(id)));

    let deleted = repo.bulk_delete(&[ids[1], copies[1]]).await.unwrap();
    assert_eq!(deleted, 2);
    let (_, total) = repo.list(&ListQuery::default().normalize()).await.unwrap();
    assert_eq!(total, 3);
}

pub async fn stats_summary<R: OrderRepository>(repo: &R) {
    repo.create(draft("A", OrderStatus::Pending, 1.0, day(1)))
        .await
        .unwrap();
    repo.create(draft("B", OrderStatus::Completed, 1.0, day(20)))
        .await
        .unwrap();
    repo.create(draft("C", OrderStatus::Completed, 1.0, day(21)))
        .await
        .unwrap();
    repo.create(draft(
        "D",
        OrderStatus::Refunded,
        1.0,
        NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
    ))
    .await
    .unwrap();

    let stats = repo.stats(day(25)).await.unwrap();
    assert_eq!(stats.total_this_month, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.shipped, 2);
    assert_eq!(stats.refunded, 1);
}

pub async fn ids_are_never_reused<R: OrderRepository>(repo: &R) {
    let a = repo
        .create(draft("A", OrderStatus::Pending, 1.0, day(1)))
        .await
        .unwrap();
    repo.delete(a.id).await.unwrap();
    let b = repo
        .create(draft("B", OrderStatus::Pending, 1.0, day(1)))
        .await
        .unwrap();
    assert!(b.id > a.id);
    assert_ne!(a.order_number, b.order_number);
}
