// src/services/sale_service.rs

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        money::{format_cents, sum_cents},
    },
    db::{
        retry_on_conflict, CatalogRepository, ClientRepository, DocumentStore, MembershipRepository,
        ReceivableRepository, SalesRepository, Scope, Tx,
    },
    models::{
        client::ClientSnapshot,
        finance::Receivable,
        sales::{CreateSalePayload, ItemKind, Payment, PaymentMethod, Sale, SaleItem, SaleStatus},
    },
    services::{
        fee_service::resolve_payment_fees,
        membership_lifecycle::{build_membership, ClientMembershipUpdate},
        receivable_service::{build_card_receivables, build_manual_receivable},
    },
};

/// Orquestra a criação de uma venda: uma única transação que grava venda,
/// recebíveis, matrícula (com o elo no predecessor) e o cliente.
#[derive(Clone)]
pub struct SaleService {
    store: Arc<dyn DocumentStore>,
    max_attempts: u32,
    clients: ClientRepository,
    memberships: MembershipRepository,
    sales: SalesRepository,
    receivables: ReceivableRepository,
    catalog: CatalogRepository,
}

impl SaleService {
    pub fn new(store: Arc<dyn DocumentStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts,
            clients: ClientRepository::new(),
            memberships: MembershipRepository::new(),
            sales: SalesRepository::new(),
            receivables: ReceivableRepository::new(),
            catalog: CatalogRepository::new(),
        }
    }

    /// Cria a venda e devolve o id. Nada é gravado se qualquer regra falhar;
    /// conflitos de concorrência são repetidos com estado relido.
    pub async fn create_sale(&self, scope: Scope, payload: CreateSalePayload) -> Result<Uuid, AppError> {
        // 1. Pré-condições, antes de abrir qualquer transação
        let (client_id, consultant_id) = check_preconditions(&payload)?;

        // 2. Ids fixos entre tentativas
        let sale_id = Uuid::new_v4();
        let membership_id = Uuid::new_v4();

        let payload = &payload;
        retry_on_conflict("create_sale", self.max_attempts, || {
            self.try_create_sale(scope, payload, client_id, consultant_id, sale_id, membership_id)
        })
        .await
    }

    async fn try_create_sale(
        &self,
        scope: Scope,
        payload: &CreateSalePayload,
        client_id: Uuid,
        consultant_id: Uuid,
        sale_id: Uuid,
        membership_id: Uuid,
    ) -> Result<Uuid, AppError> {
        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;

        // --- LEITURAS ---

        // 1. Cliente (snapshot e matrícula ativa)
        let client = self.clients.get(&mut tx, client_id).await?;

        // 2. Cadeia de matrículas, só se a venda tiver uma
        let membership_item = payload
            .items
            .iter()
            .find_map(|item| item.membership.as_ref().map(|m| (item, m)));

        let chain = match (membership_item, client.active_membership_id) {
            (Some(_), Some(active_id)) => self.memberships.load_chain(&mut tx, client.id, active_id).await?,
            _ => Vec::new(),
        };

        // 3. Tabela de taxas, só se houver cartão
        let acquirers = if payload.payments.iter().any(|p| p.method.is_card()) {
            self.catalog.list_acquirers(&mut tx).await?
        } else {
            Vec::new()
        };

        // --- CÁLCULO ---

        let sale_date = payload.sale_date.unwrap_or_else(|| Utc::now().date_naive());

        // 4. Taxas por pagamento
        let payments: Vec<Payment> = payload
            .payments
            .iter()
            .map(|p| {
                let fees = resolve_payment_fees(&acquirers, p);
                Payment {
                    method: p.method,
                    amount_cents: p.amount_cents,
                    acquirer_id: fees.acquirer_id,
                    acquirer_name: fees.acquirer_name,
                    brand: p.brand.clone(),
                    installments: fees.installments,
                    anticipated: fees.anticipated,
                    fee_cents: fees.fee_cents,
                    anticipation_fee_cents: fees.anticipation_fee_cents,
                }
            })
            .collect();

        // 5. Recebíveis de cartão + saldo em aberto
        let mut receivables: Vec<Receivable> = payments
            .iter()
            .flat_map(|p| build_card_receivables(sale_id, client.id, sale_date, p))
            .collect();

        if payload.remaining_cents > 0 {
            let due_date = payload
                .due_date
                .ok_or_else(|| AppError::invalid("Informe a data de vencimento do saldo restante."))?;
            receivables.push(build_manual_receivable(sale_id, client.id, payload.remaining_cents, due_date));
        }

        // 6. Matrícula
        let plan = match membership_item {
            Some((item, membership)) => Some(build_membership(
                &client,
                &chain,
                membership,
                item.total_cents,
                membership_id,
                sale_id,
            )?),
            None => None,
        };

        // 7. Itens (com o id da matrícula injetado) e totais
        let items: Vec<SaleItem> = payload
            .items
            .iter()
            .map(|item| SaleItem {
                kind: item.kind,
                reference_id: item.reference_id.clone(),
                description: item.description.trim().to_string(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                total_cents: item.total_cents,
                membership: item.membership.clone(),
                membership_id: item.membership.as_ref().and(plan.as_ref()).map(|p| p.membership.id),
            })
            .collect();

        let paid_cents = sum_cents(payments.iter().map(|p| p.amount_cents)).ok_or_else(out_of_range)?;
        let fees_cents = sum_cents(payments.iter().map(Payment::total_fee_cents)).ok_or_else(out_of_range)?;

        let sale = Sale {
            id: sale_id,
            tenant_id: scope.tenant_id,
            branch_id: scope.branch_id,
            client_id: client.id,
            client: ClientSnapshot::from(&client),
            consultant_id,
            items,
            gross_total_cents: payload.gross_total_cents,
            discount_cents: payload.discount_cents,
            net_total_cents: payload.net_total_cents,
            payments,
            fees_cents,
            net_paid_total_cents: paid_cents - fees_cents,
            remaining_cents: payload.remaining_cents,
            due_date: payload.due_date,
            sale_date,
            status: if payload.remaining_cents > 0 { SaleStatus::Open } else { SaleStatus::Paid },
            notes: payload.notes.clone().filter(|n| !n.trim().is_empty()),
            created_at: None,
        };

        // 8. Patch do cliente
        let mut client_patch = Map::new();
        if payload.remaining_cents > 0 {
            let debt = client
                .debt_cents
                .checked_add(payload.remaining_cents)
                .ok_or_else(out_of_range)?;
            client_patch.insert("debtCents".into(), json!(debt));
        }
        if let Some(plan) = &plan {
            match plan.client_update {
                ClientMembershipUpdate::Activate => {
                    client_patch.insert("activeMembershipId".into(), json!(plan.membership.id));
                    client_patch.insert("activeSaleId".into(), json!(sale_id));
                }
                ClientMembershipUpdate::Schedule => {
                    client_patch.insert("scheduledMembershipId".into(), json!(plan.membership.id));
                }
                ClientMembershipUpdate::AlreadyScheduled => {}
            }
            let mut access = client.access.clone();
            access.insert(scope.branch_id.to_string(), true);
            client_patch.insert("access".into(), json!(access));
        }

        // --- ESCRITAS ---

        if let Some(plan) = &plan {
            self.memberships.create(&mut tx, &plan.membership)?;
            if let Some(predecessor_id) = plan.predecessor_id {
                self.memberships.link_next(&mut tx, client.id, predecessor_id, plan.membership.id);
            }
        }
        for receivable in &receivables {
            self.receivables.create(&mut tx, receivable)?;
        }
        if !client_patch.is_empty() {
            self.clients.patch(&mut tx, client.id, Value::Object(client_patch));
        }
        self.sales.create(&mut tx, &sale)?;

        let writes = tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            client_id = %client.id,
            tenant_id = %scope.tenant_id,
            branch_id = %scope.branch_id,
            receivables = receivables.len(),
            writes,
            "✅ Venda registrada: {} (taxas {}, em aberto {})",
            format_cents(sale.net_total_cents),
            format_cents(sale.fees_cents),
            format_cents(sale.remaining_cents),
        );

        Ok(sale.id)
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn fetch_sales_by_client(&self, scope: Scope, client_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        self.sales.list_by_client(&mut tx, client_id).await
    }

    pub async fn fetch_sales_range(&self, scope: Scope, from: NaiveDate, to: NaiveDate) -> Result<Vec<Sale>, AppError> {
        if from > to {
            return Err(AppError::invalid("A data inicial deve ser anterior ou igual à final."));
        }
        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        self.sales.list_range(&mut tx, from, to).await
    }

    pub async fn list_receivables_by_sale(&self, scope: Scope, sale_id: Uuid) -> Result<Vec<Receivable>, AppError> {
        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        if self.sales.find(&mut tx, sale_id).await?.is_none() {
            return Err(AppError::not_found("Venda"));
        }
        self.receivables.list_by_sale(&mut tx, sale_id).await
    }
}

/// Regras que não dependem do banco. Devolve (cliente, consultor).
fn out_of_range() -> AppError {
    AppError::invalid("Valores da venda fora do limite.")
}

fn check_preconditions(payload: &CreateSalePayload) -> Result<(Uuid, Uuid), AppError> {
    let client_id = payload
        .client_id
        .ok_or_else(|| AppError::invalid("Selecione o cliente da venda."))?;
    let consultant_id = payload
        .consultant_id
        .ok_or_else(|| AppError::invalid("Selecione o consultor da venda."))?;
    if payload.items.is_empty() {
        return Err(AppError::invalid("A venda precisa de pelo menos um item."));
    }
    if payload.remaining_cents > 0 && payload.due_date.is_none() {
        return Err(AppError::invalid("Informe a data de vencimento do saldo restante."));
    }

    payload.validate()?;

    // Totais
    let items_total = sum_cents(payload.items.iter().map(|i| i.total_cents)).ok_or_else(out_of_range)?;
    if items_total != payload.gross_total_cents {
        return Err(AppError::invalid(format!(
            "A soma dos itens ({}) difere do total bruto ({}).",
            format_cents(items_total),
            format_cents(payload.gross_total_cents)
        )));
    }
    if payload.discount_cents > payload.gross_total_cents {
        return Err(AppError::invalid("O desconto não pode ser maior que o total bruto."));
    }
    if payload.net_total_cents != payload.gross_total_cents - payload.discount_cents {
        return Err(AppError::invalid("O total líquido deve ser o total bruto menos o desconto."));
    }
    let paid = sum_cents(payload.payments.iter().map(|p| p.amount_cents)).ok_or_else(out_of_range)?;
    let settled = paid.checked_add(payload.remaining_cents).ok_or_else(out_of_range)?;
    if settled != payload.net_total_cents {
        return Err(AppError::invalid(format!(
            "Pagamentos ({}) + saldo restante ({}) devem somar o total líquido ({}).",
            format_cents(paid),
            format_cents(payload.remaining_cents),
            format_cents(payload.net_total_cents)
        )));
    }

    // Itens de matrícula
    let mut membership_items = 0;
    for item in &payload.items {
        match (item.kind, &item.membership) {
            (ItemKind::Membership, Some(membership)) => {
                membership_items += 1;
                if membership.duration.count == 0 {
                    return Err(AppError::invalid("A duração do plano deve ser de pelo menos 1."));
                }
                if membership.plan_name.trim().is_empty() {
                    return Err(AppError::invalid("Informe o nome do plano."));
                }
            }
            (ItemKind::Membership, None) => {
                return Err(AppError::invalid(format!(
                    "O item '{}' é uma matrícula mas não tem os dados do plano.",
                    item.description
                )));
            }
            (_, Some(_)) => {
                return Err(AppError::invalid(format!(
                    "Somente itens de matrícula podem ter dados de plano ('{}').",
                    item.description
                )));
            }
            (_, None) => {}
        }
    }
    if membership_items > 1 {
        return Err(AppError::invalid("Uma venda pode ter no máximo uma matrícula."));
    }

    // Parcelamento só no crédito
    for payment in &payload.payments {
        let installments = payment.installments.unwrap_or(1);
        if installments > 1 && payment.method != PaymentMethod::Credit {
            return Err(AppError::invalid("Somente pagamentos no crédito podem ser parcelados."));
        }
    }

    Ok((client_id, consultant_id))
}
