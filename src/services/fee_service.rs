// src/services/fee_service.rs

//! Resolução de taxas de cartão.
//!
//! Falha aberta: adquirente desconhecida ou faixa de parcelamento ausente resulta em
//! taxa zero, nunca em erro. A venda não pode ser bloqueada por cadastro incompleto.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::money::percent_of,
    models::{
        catalog::Acquirer,
        sales::{PaymentMethod, PaymentPayload},
    },
};

/// Resultado da resolução para um pagamento.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedFees {
    pub acquirer_id: Option<Uuid>,
    pub acquirer_name: Option<String>,
    pub installments: u32,
    pub anticipated: bool,
    pub fee_cents: i64,
    pub anticipation_fee_cents: i64,
}

impl ResolvedFees {
    pub fn total_fee_cents(&self) -> i64 {
        self.fee_cents + self.anticipation_fee_cents
    }
}

/// Por id explícito; senão pelo nome (sem diferenciar maiúsculas) entre as ativas.
pub fn resolve_acquirer<'a>(
    catalog: &'a [Acquirer],
    acquirer_id: Option<Uuid>,
    acquirer_name: Option<&str>,
) -> Option<&'a Acquirer> {
    if let Some(id) = acquirer_id {
        if let Some(found) = catalog.iter().find(|a| a.id == id) {
            return Some(found);
        }
    }

    let wanted = acquirer_name.map(str::trim).filter(|n| !n.is_empty())?.to_lowercase();
    catalog
        .iter()
        .filter(|a| a.active)
        .find(|a| a.name.trim().to_lowercase() == wanted)
}

/// Percentual de processamento para o método e número de parcelas.
pub fn processing_fee_percent(
    acquirer: &Acquirer,
    method: PaymentMethod,
    installments: u32,
    brand: Option<&str>,
) -> Decimal {
    match method {
        PaymentMethod::Debit => acquirer.debit_fee_percent,
        PaymentMethod::Credit if installments <= 1 => acquirer.credit_one_shot_fee_percent,
        PaymentMethod::Credit => installment_fee_percent(acquirer, installments, brand),
        _ => Decimal::ZERO,
    }
}

// Faixa ativa com exatamente N parcelas. Preferência: mesma bandeira, depois faixa
// genérica, depois (pagamento sem bandeira) qualquer faixa ativa.
fn installment_fee_percent(acquirer: &Acquirer, installments: u32, brand: Option<&str>) -> Decimal {
    let rows: Vec<_> = acquirer
        .installment_fees
        .iter()
        .filter(|row| row.active && row.installment == installments)
        .collect();

    let brand = brand.map(str::trim).filter(|b| !b.is_empty());
    let by_brand = brand.and_then(|wanted| {
        rows.iter().find(|row| {
            row.brand
                .as_deref()
                .is_some_and(|b| b.trim().eq_ignore_ascii_case(wanted))
        })
    });
    let generic = || rows.iter().find(|row| row.brand.is_none());
    let any = || if brand.is_none() { rows.first() } else { None };

    by_brand
        .or_else(generic)
        .or_else(any)
        .map_or(Decimal::ZERO, |row| row.fee_percent)
}

/// Resolve adquirente, parcelas, antecipação e taxas de um pagamento.
///
/// A taxa de antecipação só existe no crédito parcelado de adquirente que antecipa:
/// taxa por parcela × N × valor.
/// As taxas somadas nunca passam do valor pago.
pub fn resolve_payment_fees(catalog: &[Acquirer], payment: &PaymentPayload) -> ResolvedFees {
    if !payment.method.is_card() {
        return ResolvedFees {
            installments: 1,
            ..Default::default()
        };
    }

    let installments = match payment.method {
        PaymentMethod::Credit => payment.installments.unwrap_or(1).max(1),
        _ => 1,
    };

    let Some(acquirer) = resolve_acquirer(catalog, payment.acquirer_id, payment.acquirer_name.as_deref())
    else {
        tracing::debug!(
            acquirer_id = ?payment.acquirer_id,
            acquirer_name = ?payment.acquirer_name,
            "Adquirente não encontrada, taxa zero"
        );
        return ResolvedFees {
            acquirer_id: payment.acquirer_id,
            acquirer_name: payment.acquirer_name.clone(),
            installments,
            ..Default::default()
        };
    };

    // Só a adquirente habilita a antecipação; o pagamento pode apenas recusá-la
    let anticipated = payment.method == PaymentMethod::Credit
        && acquirer.anticipate_receivables
        && payment.anticipate.unwrap_or(true);

    let amount = payment.amount_cents;
    let percent = processing_fee_percent(acquirer, payment.method, installments, payment.brand.as_deref());
    let fee_cents = percent_of(amount, percent).min(amount).max(0);

    let anticipation_fee_cents = if anticipated && installments > 1 {
        let rate = acquirer.anticipation_fee_percent * Decimal::from(installments);
        percent_of(amount, rate).min(amount - fee_cents).max(0)
    } else {
        0
    };

    ResolvedFees {
        acquirer_id: Some(acquirer.id),
        acquirer_name: Some(acquirer.name.clone()),
        installments,
        anticipated,
        fee_cents,
        anticipation_fee_cents,
    }
}
