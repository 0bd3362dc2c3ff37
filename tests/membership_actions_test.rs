// tests/membership_actions_test.rs

mod common;

use common::{bare_membership, d, spawn_app, SaleBuilder};
use gym_backend::{
    common::error::AppError,
    models::{
        catalog::CreateContractPayload,
        finance::ReceivableStatus,
        membership::{
            AdjustMembershipDaysPayload, CancelMembershipPayload, MembershipStatus, SuspendMembershipPayload,
        },
    },
};
use uuid::Uuid;

fn suspend_between(start: &str, end: &str) -> SuspendMembershipPayload {
    SuspendMembershipPayload {
        start_date: Some(d(start)),
        end_date: Some(d(end)),
        reason: Some("Viagem".into()),
    }
}

fn adjust(days: i64) -> AdjustMembershipDaysPayload {
    AdjustMembershipDaysPayload {
        days,
        reason: Some("Cortesia".into()),
    }
}

// =============================================================================
//  TRANCAMENTO
// =============================================================================

#[tokio::test]
async fn ten_day_suspension_extends_the_end_date() {
    let app = spawn_app();
    let contract = app.freeze_contract(Some(2)).await;
    let client = app.client("Ana").await;
    let membership = app.sell_monthly_plan(client.id, "2024-01-15", Some(contract.id)).await;
    assert_eq!(membership.end_date, Some(d("2024-02-14")));

    let updated = app
        .state
        .membership_service
        .suspend(app.scope, client.id, membership.id, suspend_between("2024-01-20", "2024-01-29"))
        .await
        .unwrap();

    assert_eq!(updated.status, MembershipStatus::Paused);
    assert_eq!(updated.end_date, Some(d("2024-02-24")));
    assert_eq!(updated.pause_until, Some(d("2024-01-29")));
    assert_eq!(updated.suspension_count, 1);
    assert_eq!(updated.suspension_days_used, 10);

    let stored = app.membership(client.id, membership.id).await;
    assert_eq!(stored.status, MembershipStatus::Paused);
    assert_eq!(stored.end_date, Some(d("2024-02-24")));
    assert_eq!(stored.suspension_count, 1);

    let history = app
        .state
        .membership_service
        .list_suspensions(app.scope, client.id, membership.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].days, 10);
    assert_eq!(history[0].reason.as_deref(), Some("Viagem"));
}

#[tokio::test]
async fn suspension_at_the_contract_limit_changes_nothing() {
    let app = spawn_app();
    let contract = app.freeze_contract(Some(2)).await;
    let client = app.client("Bruno").await;
    let mut membership = bare_membership(client.id, MembershipStatus::Active, "2024-01-01", "2024-03-31");
    membership.contract_id = Some(contract.id);
    membership.suspension_count = 2;
    app.seed_membership(&membership).await;
    let before = app.store.document_count().await;

    let err = app
        .state
        .membership_service
        .suspend(app.scope, client.id, membership.id, suspend_between("2024-02-01", "2024-02-10"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BusinessRule(_)));
    assert_eq!(app.store.document_count().await, before);
    let stored = app.membership(client.id, membership.id).await;
    assert_eq!(stored.status, MembershipStatus::Active);
    assert_eq!(stored.end_date, Some(d("2024-03-31")));
    assert_eq!(stored.suspension_count, 2);
}

#[tokio::test]
async fn suspension_respects_contract_rules() {
    let app = spawn_app();
    let contract = app.freeze_contract(None).await;
    let client = app.client("Carla").await;
    let membership = app.sell_monthly_plan(client.id, "2024-01-15", Some(contract.id)).await;
    let service = &app.state.membership_service;

    // menos que o mínimo de 7 dias
    let err = service
        .suspend(app.scope, client.id, membership.id, suspend_between("2024-01-20", "2024-01-24"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    // mais que o máximo de 30 dias
    let err = service
        .suspend(app.scope, client.id, membership.id, suspend_between("2024-01-20", "2024-02-28"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    // sem data final
    let err = service
        .suspend(
            app.scope,
            client.id,
            membership.id,
            SuspendMembershipPayload {
                start_date: Some(d("2024-01-20")),
                end_date: None,
                reason: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    // já trancada
    service
        .suspend(app.scope, client.id, membership.id, suspend_between("2024-01-20", "2024-01-29"))
        .await
        .unwrap();
    let err = service
        .suspend(app.scope, client.id, membership.id, suspend_between("2024-02-01", "2024-02-10"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
}

#[tokio::test]
async fn suspension_needs_a_contract_that_allows_it() {
    let app = spawn_app();
    let client = app.client("Davi").await;
    let service = &app.state.membership_service;

    let without_contract = app.sell_monthly_plan(client.id, "2024-01-15", None).await;
    let err = service
        .suspend(app.scope, client.id, without_contract.id, suspend_between("2024-01-20", "2024-01-29"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    let strict = app
        .state
        .catalog_service
        .create_contract(
            app.scope,
            CreateContractPayload {
                name: "Mensal sem trancamento".into(),
                allow_freeze: false,
                max_suspension_times: None,
                max_suspension_days: None,
                minimum_suspension_days: None,
            },
        )
        .await
        .unwrap();
    let other = app.client("Eva").await;
    let strict_membership = app.sell_monthly_plan(other.id, "2024-01-15", Some(strict.id)).await;
    let err = service
        .suspend(app.scope, other.id, strict_membership.id, suspend_between("2024-01-20", "2024-01-29"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    let err = service
        .suspend(app.scope, client.id, Uuid::new_v4(), suspend_between("2024-01-20", "2024-01-29"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn suspension_pushes_queued_memberships_forward() {
    let app = spawn_app();
    let contract = app.freeze_contract(Some(2)).await;
    let client = app.client("Fabio").await;
    let current = app.sell_monthly_plan(client.id, "2024-01-15", Some(contract.id)).await;
    let queued = app.sell_monthly_plan(client.id, "2024-01-20", None).await;
    assert_eq!(queued.start_date, d("2024-02-15"));
    assert_eq!(queued.end_date, Some(d("2024-03-14")));

    app.state
        .membership_service
        .suspend(app.scope, client.id, current.id, suspend_between("2024-01-20", "2024-01-29"))
        .await
        .unwrap();

    let queued = app.membership(client.id, queued.id).await;
    assert_eq!(queued.start_date, d("2024-02-25"));
    assert_eq!(queued.end_date, Some(d("2024-03-24")));
    assert_eq!(queued.status, MembershipStatus::Pending);
}

// =============================================================================
//  AJUSTE DE DIAS
// =============================================================================

#[tokio::test]
async fn adjusting_days_moves_the_end_date_and_the_queue() {
    let app = spawn_app();
    let client = app.client("Gil").await;
    let current = app.sell_monthly_plan(client.id, "2024-01-15", None).await;
    let queued = app.sell_monthly_plan(client.id, "2024-01-15", None).await;
    let service = &app.state.membership_service;

    let updated = service
        .adjust_days(app.scope, client.id, current.id, adjust(5))
        .await
        .unwrap();
    assert_eq!(updated.end_date, Some(d("2024-02-19")));

    let queued = app.membership(client.id, queued.id).await;
    assert_eq!(queued.start_date, d("2024-02-20"));
    assert_eq!(queued.end_date, Some(d("2024-03-19")));

    let history = service
        .list_adjustments(app.scope, client.id, current.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].previous_end_date, Some(d("2024-02-14")));
    assert_eq!(history[0].next_end_date, d("2024-02-19"));
    assert_eq!(history[0].days, 5);

    let err = service
        .adjust_days(app.scope, client.id, current.id, adjust(0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = service
        .adjust_days(app.scope, client.id, current.id, adjust(-60))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
    assert_eq!(app.membership(client.id, current.id).await.end_date, Some(d("2024-02-19")));
}

// =============================================================================
//  CANCELAMENTO
// =============================================================================

#[tokio::test]
async fn cancel_voids_pending_receivables_debt_and_pointers() {
    let app = spawn_app();
    app.stone().await;
    let client = app.client("Helena").await;

    let payload = SaleBuilder::new(client.id)
        .membership("2024-01-15", 3, None, 10000)
        .credit(6000, "Stone", 3, None)
        .remaining(4000, Some("2024-02-15"))
        .build();
    let sale_id = app.state.sale_service.create_sale(app.scope, payload).await.unwrap();
    assert_eq!(app.reload_client(client.id).await.debt_cents, 4000);

    let membership = app.memberships(client.id).await.remove(0);
    let canceled = app
        .state
        .membership_service
        .cancel(
            app.scope,
            client.id,
            membership.id,
            CancelMembershipPayload {
                reason: Some("Mudou de cidade".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(canceled.status, MembershipStatus::Canceled);
    assert!(canceled.canceled_at.is_some());
    assert_eq!(canceled.cancel_reason.as_deref(), Some("Mudou de cidade"));

    let receivables = app
        .state
        .sale_service
        .list_receivables_by_sale(app.scope, sale_id)
        .await
        .unwrap();
    assert_eq!(receivables.len(), 4);
    assert!(receivables.iter().all(|r| r.status == ReceivableStatus::Canceled));
    assert!(receivables.iter().all(|r| r.canceled_at.is_some()));

    let client = app.reload_client(client.id).await;
    assert_eq!(client.debt_cents, 0);
    assert_eq!(client.active_membership_id, None);
    assert_eq!(client.active_sale_id, None);

    let stored = app.membership(client.id, membership.id).await;
    assert_eq!(stored.status, MembershipStatus::Canceled);
}

#[tokio::test]
async fn canceled_memberships_cannot_be_canceled_or_adjusted_again() {
    let app = spawn_app();
    let client = app.client("Igor").await;
    let membership = app.sell_monthly_plan(client.id, "2024-01-15", None).await;
    let service = &app.state.membership_service;

    service
        .cancel(app.scope, client.id, membership.id, CancelMembershipPayload::default())
        .await
        .unwrap();
    let before = app.store.document_count().await;

    let err = service
        .cancel(app.scope, client.id, membership.id, CancelMembershipPayload::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    let err = service
        .adjust_days(app.scope, client.id, membership.id, adjust(3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
    assert_eq!(app.store.document_count().await, before);
}

#[tokio::test]
async fn canceling_the_scheduled_membership_clears_only_that_pointer() {
    let app = spawn_app();
    let client = app.client("Julia").await;
    let current = app.sell_monthly_plan(client.id, "2024-01-15", None).await;
    let queued = app.sell_monthly_plan(client.id, "2024-01-15", None).await;

    app.state
        .membership_service
        .cancel(app.scope, client.id, queued.id, CancelMembershipPayload::default())
        .await
        .unwrap();

    let client = app.reload_client(client.id).await;
    assert_eq!(client.active_membership_id, Some(current.id));
    assert_eq!(client.scheduled_membership_id, None);
    assert_eq!(client.debt_cents, 0);
}
