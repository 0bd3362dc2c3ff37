// tests/sale_flow_test.rs

mod common;

use common::{bare_membership, d, spawn_app, SaleBuilder};
use gym_backend::{
    common::error::AppError,
    db::{ClientRepository, Scope, Tx},
    models::{
        finance::{ReceivableKind, ReceivableStatus},
        membership::MembershipStatus,
        sales::SaleStatus,
    },
};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn open_balance_without_due_date_writes_nothing() {
    let app = spawn_app();
    let client = app.client("Ana").await;
    let before = app.store.document_count().await;

    let payload = SaleBuilder::new(client.id)
        .membership("2024-01-15", 1, None, 10000)
        .cash(9500)
        .remaining(500, None)
        .build();
    let err = app.state.sale_service.create_sale(app.scope, payload).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(app.store.document_count().await, before);
    assert!(app.memberships(client.id).await.is_empty());
}

#[tokio::test]
async fn first_membership_is_activated_immediately() {
    let app = spawn_app();
    let client = app.client("Ana").await;

    let payload = SaleBuilder::new(client.id)
        .membership("2024-01-15", 1, None, 10000)
        .cash(10000)
        .build();
    let sale_id = app.state.sale_service.create_sale(app.scope, payload).await.unwrap();

    let memberships = app.memberships(client.id).await;
    assert_eq!(memberships.len(), 1);
    let membership = &memberships[0];
    assert_eq!(membership.status, MembershipStatus::Active);
    assert_eq!(membership.start_date, d("2024-01-15"));
    assert_eq!(membership.end_date, Some(d("2024-02-14")));
    assert_eq!(membership.sale_id, Some(sale_id));

    let client = app.reload_client(client.id).await;
    assert_eq!(client.active_membership_id, Some(membership.id));
    assert_eq!(client.active_sale_id, Some(sale_id));
    assert_eq!(client.scheduled_membership_id, None);
    assert_eq!(client.access.get(&app.scope.branch_id.to_string()), Some(&true));

    let sales = app.state.sale_service.fetch_sales_by_client(app.scope, client.id).await.unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].status, SaleStatus::Paid);
    assert_eq!(sales[0].items[0].membership_id, Some(membership.id));
    assert_eq!(sales[0].client.name, "Ana");
}

#[tokio::test]
async fn overlapping_purchase_is_queued_after_the_active_one() {
    let app = spawn_app();
    let client = app.client("Bruno").await;
    let active = app.sell_monthly_plan(client.id, "2024-01-01", None).await;
    assert_eq!(active.end_date, Some(d("2024-01-31")));

    let queued = app.sell_monthly_plan(client.id, "2024-01-20", None).await;

    assert_eq!(queued.status, MembershipStatus::Pending);
    assert_eq!(queued.start_date, d("2024-02-01"));
    assert_eq!(queued.end_date, Some(d("2024-02-29")));
    assert_eq!(queued.previous_membership_id, Some(active.id));

    let active = app.membership(client.id, active.id).await;
    assert_eq!(active.next_membership_id, Some(queued.id));
    assert_eq!(active.status, MembershipStatus::Active);

    let client = app.reload_client(client.id).await;
    assert_eq!(client.active_membership_id, Some(active.id));
    assert_eq!(client.scheduled_membership_id, Some(queued.id));
}

#[tokio::test]
async fn third_purchase_goes_to_the_tail_and_keeps_the_scheduled_pointer() {
    let app = spawn_app();
    let client = app.client("Carla").await;
    let first = app.sell_monthly_plan(client.id, "2024-01-01", None).await;
    let second = app.sell_monthly_plan(client.id, "2024-01-05", None).await;
    let third = app.sell_monthly_plan(client.id, "2024-01-10", None).await;

    assert_eq!(second.start_date, d("2024-02-01"));
    assert_eq!(third.start_date, d("2024-03-01"));
    assert_eq!(third.previous_membership_id, Some(second.id));
    assert_eq!(app.membership(client.id, second.id).await.next_membership_id, Some(third.id));

    let client = app.reload_client(client.id).await;
    assert_eq!(client.active_membership_id, Some(first.id));
    assert_eq!(client.scheduled_membership_id, Some(second.id));
}

#[tokio::test]
async fn queued_purchase_after_an_unreadable_end_date_is_rejected() {
    let app = spawn_app();
    let client = app.client("Davi").await;
    let mut current = bare_membership(client.id, MembershipStatus::Active, "2024-01-01", "2024-01-31");
    current.end_date = None;
    app.seed_membership(&current).await;

    let mut tx = Tx::begin(&app.store, app.scope).await.unwrap();
    ClientRepository::new().patch(&mut tx, client.id, json!({ "activeMembershipId": current.id }));
    tx.commit().await.unwrap();

    let before = app.store.document_count().await;
    let payload = SaleBuilder::new(client.id)
        .membership("2024-01-10", 1, None, 10000)
        .cash(10000)
        .build();
    let err = app.state.sale_service.create_sale(app.scope, payload).await.unwrap_err();

    assert!(matches!(err, AppError::BusinessRule(_)));
    assert_eq!(app.store.document_count().await, before);
}

#[tokio::test]
async fn credit_installments_become_monthly_receivables() {
    let app = spawn_app();
    app.stone().await;
    let client = app.client("Eva").await;

    let payload = SaleBuilder::new(client.id)
        .membership("2024-01-15", 3, None, 10000)
        .credit(10000, "stone", 3, None)
        .build();
    let sale_id = app.state.sale_service.create_sale(app.scope, payload).await.unwrap();

    let receivables = app
        .state
        .sale_service
        .list_receivables_by_sale(app.scope, sale_id)
        .await
        .unwrap();
    assert_eq!(receivables.len(), 3);
    assert!(receivables.iter().all(|r| r.kind == ReceivableKind::CardInstallment));
    assert!(receivables.iter().all(|r| r.status == ReceivableStatus::Pending));
    assert!(receivables.iter().all(|r| r.net_cents == r.gross_cents - r.fee_cents));

    let due: Vec<_> = receivables.iter().map(|r| r.due_date).collect();
    assert_eq!(due, vec![d("2024-02-15"), d("2024-03-15"), d("2024-04-15")]);

    // 4,29% de R$ 100,00
    assert_eq!(receivables.iter().map(|r| r.gross_cents).sum::<i64>(), 10000);
    assert_eq!(receivables.iter().map(|r| r.fee_cents).sum::<i64>(), 429);
    assert_eq!(receivables.iter().map(|r| r.net_cents).sum::<i64>(), 9571);

    let sale = &app.state.sale_service.fetch_sales_by_client(app.scope, client.id).await.unwrap()[0];
    assert_eq!(sale.fees_cents, 429);
    assert_eq!(sale.net_paid_total_cents, 9571);
    assert_eq!(sale.payments[0].acquirer_name.as_deref(), Some("Stone"));
}

#[tokio::test]
async fn anticipated_installments_fall_due_on_the_sale_date() {
    let app = spawn_app();
    app.stone_anticipating().await;
    let client = app.client("Fabio").await;

    let payload = SaleBuilder::new(client.id)
        .product(10000)
        .credit(10000, "Stone", 3, Some(true))
        .build();
    let sale_id = app.state.sale_service.create_sale(app.scope, payload).await.unwrap();

    let receivables = app
        .state
        .sale_service
        .list_receivables_by_sale(app.scope, sale_id)
        .await
        .unwrap();
    assert!(receivables.iter().all(|r| r.anticipated && r.due_date == d("2024-01-15")));
    // mesmo vencimento: ordem pelo número da parcela
    let numbers: Vec<_> = receivables.iter().map(|r| r.installment_number).collect();
    assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);

    // processamento 429 + antecipação 1,5% × 3 parcelas = 450
    assert_eq!(receivables.iter().map(|r| r.fee_cents).sum::<i64>(), 879);
    assert_eq!(receivables.iter().map(|r| r.net_cents).sum::<i64>(), 10000 - 879);

    // venda sem matrícula não mexe nos ponteiros do cliente
    let client = app.reload_client(client.id).await;
    assert_eq!(client.active_membership_id, None);
    assert!(client.access.is_empty());
}

#[tokio::test]
async fn acquirer_without_anticipation_keeps_monthly_due_dates() {
    let app = spawn_app();
    app.stone().await;
    let client = app.client("Fabiana").await;

    let payload = SaleBuilder::new(client.id)
        .product(10000)
        .credit(10000, "Stone", 3, Some(true))
        .build();
    let sale_id = app.state.sale_service.create_sale(app.scope, payload).await.unwrap();

    let receivables = app
        .state
        .sale_service
        .list_receivables_by_sale(app.scope, sale_id)
        .await
        .unwrap();
    assert!(receivables.iter().all(|r| !r.anticipated));
    let due: Vec<_> = receivables.iter().map(|r| r.due_date).collect();
    assert_eq!(due, vec![d("2024-02-15"), d("2024-03-15"), d("2024-04-15")]);

    // só a taxa de 4,29%, sem antecipação
    assert_eq!(receivables.iter().map(|r| r.fee_cents).sum::<i64>(), 429);
}

#[tokio::test]
async fn unknown_acquirer_charges_no_fee() {
    let app = spawn_app();
    app.stone().await;
    let client = app.client("Gil").await;

    let payload = SaleBuilder::new(client.id)
        .product(6000)
        .credit(6000, "Cielo", 1, None)
        .build();
    let sale_id = app.state.sale_service.create_sale(app.scope, payload).await.unwrap();

    let receivables = app
        .state
        .sale_service
        .list_receivables_by_sale(app.scope, sale_id)
        .await
        .unwrap();
    assert_eq!(receivables.len(), 1);
    assert_eq!(receivables[0].fee_cents, 0);
    assert_eq!(receivables[0].net_cents, 6000);
}

#[tokio::test]
async fn open_balance_becomes_a_manual_receivable_and_client_debt() {
    let app = spawn_app();
    let client = app.client("Helena").await;

    let payload = SaleBuilder::new(client.id)
        .product(10000)
        .cash(7000)
        .remaining(3000, Some("2024-02-10"))
        .build();
    let sale_id = app.state.sale_service.create_sale(app.scope, payload).await.unwrap();

    let receivables = app
        .state
        .sale_service
        .list_receivables_by_sale(app.scope, sale_id)
        .await
        .unwrap();
    assert_eq!(receivables.len(), 1);
    assert_eq!(receivables[0].kind, ReceivableKind::Manual);
    assert_eq!(receivables[0].gross_cents, 3000);
    assert_eq!(receivables[0].due_date, d("2024-02-10"));

    let client = app.reload_client(client.id).await;
    assert_eq!(client.debt_cents, 3000);

    let sale = &app.state.sale_service.fetch_sales_by_client(app.scope, client.id).await.unwrap()[0];
    assert_eq!(sale.status, SaleStatus::Open);
    assert_eq!(sale.remaining_cents, 3000);
}

#[tokio::test]
async fn missing_client_is_not_found_and_writes_nothing() {
    let app = spawn_app();
    let payload = SaleBuilder::new(Uuid::new_v4()).product(1000).cash(1000).build();

    let err = app.state.sale_service.create_sale(app.scope, payload).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(app.store.document_count().await, 0);
}

#[tokio::test]
async fn other_branches_do_not_see_the_client() {
    let app = spawn_app();
    let client = app.client("Igor").await;
    let other_branch = Scope::new(app.scope.tenant_id, Uuid::new_v4());

    let payload = SaleBuilder::new(client.id).product(1000).cash(1000).build();
    let err = app.state.sale_service.create_sale(other_branch, payload).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn debt_beyond_the_representable_range_is_rejected() {
    let app = spawn_app();
    let client = app.client("Otavio").await;

    let mut tx = Tx::begin(&app.store, app.scope).await.unwrap();
    ClientRepository::new().patch(&mut tx, client.id, json!({ "debtCents": i64::MAX - 100 }));
    tx.commit().await.unwrap();

    let before = app.store.document_count().await;
    let payload = SaleBuilder::new(client.id)
        .product(1000)
        .cash(500)
        .remaining(500, Some("2024-02-15"))
        .build();
    let err = app.state.sale_service.create_sale(app.scope, payload).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(app.store.document_count().await, before);
    assert_eq!(app.reload_client(client.id).await.debt_cents, i64::MAX - 100);
}

#[tokio::test]
async fn concurrent_membership_sales_end_up_chained() {
    let app = spawn_app();
    let client = app.client("Julia").await;

    let first = SaleBuilder::new(client.id)
        .membership("2024-01-15", 1, None, 10000)
        .cash(10000)
        .build();
    let second = SaleBuilder::new(client.id)
        .membership("2024-01-15", 1, None, 10000)
        .cash(10000)
        .build();

    let (a, b) = tokio::join!(
        app.state.sale_service.create_sale(app.scope, first),
        app.state.sale_service.create_sale(app.scope, second),
    );
    a.unwrap();
    b.unwrap();

    let memberships = app.memberships(client.id).await;
    assert_eq!(memberships.len(), 2);
    let active = memberships.iter().find(|m| m.status == MembershipStatus::Active).unwrap();
    let pending = memberships.iter().find(|m| m.status == MembershipStatus::Pending).unwrap();
    assert_eq!(active.next_membership_id, Some(pending.id));
    assert_eq!(pending.start_date, d("2024-02-15"));

    let client = app.reload_client(client.id).await;
    assert_eq!(client.active_membership_id, Some(active.id));
    assert_eq!(client.scheduled_membership_id, Some(pending.id));
}

#[tokio::test]
async fn read_accessors_order_and_filter_sales() {
    let app = spawn_app();
    let client = app.client("Karen").await;

    for date in ["2024-01-10", "2024-02-20", "2024-01-31"] {
        let mut payload = SaleBuilder::new(client.id).product(1000).cash(1000).build();
        payload.sale_date = Some(d(date));
        app.state.sale_service.create_sale(app.scope, payload).await.unwrap();
    }

    let by_client = app.state.sale_service.fetch_sales_by_client(app.scope, client.id).await.unwrap();
    let dates: Vec<_> = by_client.iter().map(|s| s.sale_date).collect();
    assert_eq!(dates, vec![d("2024-02-20"), d("2024-01-31"), d("2024-01-10")]);

    let january = app
        .state
        .sale_service
        .fetch_sales_range(app.scope, d("2024-01-01"), d("2024-01-31"))
        .await
        .unwrap();
    assert_eq!(january.len(), 2);
    assert!(january.iter().all(|s| s.sale_date <= d("2024-01-31")));

    let err = app
        .state
        .sale_service
        .fetch_sales_range(app.scope, d("2024-02-01"), d("2024-01-01"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = app
        .state
        .sale_service
        .list_receivables_by_sale(app.scope, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
