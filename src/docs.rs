// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gym Backend",
        description = "Vendas, recebíveis e ciclo de vida de matrículas (academias e escolas de natação)."
    ),
    paths(
        // --- SALES ---
        handlers::sales::create_sale,
        handlers::sales::list_sales_by_client,
        handlers::sales::list_sales_range,
        handlers::sales::list_sale_receivables,

        // --- MEMBERSHIPS ---
        handlers::memberships::list_memberships,
        handlers::memberships::suspend_membership,
        handlers::memberships::adjust_membership_days,
        handlers::memberships::cancel_membership,
        handlers::memberships::list_suspensions,
        handlers::memberships::list_adjustments,

        // --- CATALOG ---
        handlers::catalog::create_client,
        handlers::catalog::get_client,
        handlers::catalog::create_acquirer,
        handlers::catalog::list_acquirers,
        handlers::catalog::create_contract,
        handlers::catalog::list_contracts,
    ),
    components(
        schemas(
            // --- Sales ---
            models::sales::ItemKind,
            models::sales::PaymentMethod,
            models::sales::SaleStatus,
            models::sales::MembershipItem,
            models::sales::SaleItem,
            models::sales::Payment,
            models::sales::Sale,
            models::sales::SaleItemPayload,
            models::sales::PaymentPayload,
            models::sales::CreateSalePayload,
            models::sales::CreateSaleResponse,

            // --- Finance ---
            models::finance::ReceivableKind,
            models::finance::ReceivableStatus,
            models::finance::Receivable,

            // --- Memberships ---
            models::membership::DurationUnit,
            models::membership::PlanDuration,
            models::membership::MembershipStatus,
            models::membership::Membership,
            models::membership::MembershipSuspension,
            models::membership::MembershipAdjustment,
            models::membership::SuspendMembershipPayload,
            models::membership::AdjustMembershipDaysPayload,
            models::membership::CancelMembershipPayload,

            // --- Catalog ---
            models::client::Client,
            models::client::ClientSnapshot,
            models::client::CreateClientPayload,
            models::catalog::InstallmentFee,
            models::catalog::Acquirer,
            models::catalog::CreateAcquirerPayload,
            models::catalog::Contract,
            models::catalog::CreateContractPayload,
        )
    ),
    tags(
        (name = "Sales", description = "Vendas, pagamentos e recebíveis"),
        (name = "Memberships", description = "Trancamento, ajuste de dias e cancelamento de matrículas"),
        (name = "Catalog", description = "Clientes, adquirentes e contratos da filial")
    )
)]
pub struct ApiDoc;
