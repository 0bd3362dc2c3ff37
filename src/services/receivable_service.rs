// src/services/receivable_service.rs

//! Montagem dos recebíveis de uma venda (puro, sem acesso ao banco).

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::{date_key::add_months, money::split_installments},
    models::{
        finance::{Receivable, ReceivableKind, ReceivableStatus},
        sales::Payment,
    },
};

/// Uma parcela por receber para o pagamento com cartão.
///
/// Valor bruto e taxa total (processamento + antecipação) são divididos de forma
/// independente; cada parcela guarda `net = bruto - taxa`. Antecipado vence tudo na
/// data da venda; senão a parcela `i` vence na data da venda + `i` meses.
pub fn build_card_receivables(
    sale_id: Uuid,
    client_id: Uuid,
    sale_date: NaiveDate,
    payment: &Payment,
) -> Vec<Receivable> {
    if !payment.method.is_card() {
        return Vec::new();
    }

    let installments = payment.installments.max(1);
    let gross_parts = split_installments(payment.amount_cents, installments);
    let fee_parts = split_installments(payment.total_fee_cents(), installments);

    gross_parts
        .into_iter()
        .zip(fee_parts)
        .zip(1..=installments)
        .map(|((gross_cents, fee_cents), number)| {
            let due_date = if payment.anticipated {
                sale_date
            } else {
                add_months(sale_date, i64::from(number))
            };

            Receivable {
                id: Uuid::new_v4(),
                sale_id,
                client_id,
                kind: ReceivableKind::CardInstallment,
                installment_number: Some(number),
                total_installments: Some(installments),
                gross_cents,
                fee_cents,
                net_cents: gross_cents - fee_cents,
                due_date,
                status: ReceivableStatus::Pending,
                anticipated: payment.anticipated,
                payment_method: Some(payment.method),
                acquirer_id: payment.acquirer_id,
                acquirer_name: payment.acquirer_name.clone(),
                canceled_at: None,
                created_at: None,
                updated_at: None,
            }
        })
        .collect()
}

/// Saldo em aberto da venda: um único recebível, sem taxa.
pub fn build_manual_receivable(
    sale_id: Uuid,
    client_id: Uuid,
    remaining_cents: i64,
    due_date: NaiveDate,
) -> Receivable {
    Receivable {
        id: Uuid::new_v4(),
        sale_id,
        client_id,
        kind: ReceivableKind::Manual,
        installment_number: None,
        total_installments: None,
        gross_cents: remaining_cents,
        fee_cents: 0,
        net_cents: remaining_cents,
        due_date,
        status: ReceivableStatus::Pending,
        anticipated: false,
        payment_method: None,
        acquirer_id: None,
        acquirer_name: None,
        canceled_at: None,
        created_at: None,
        updated_at: None,
    }
}
