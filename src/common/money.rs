// src/common/money.rs

//! Aritmética monetária em centavos inteiros.
//!
//! Todo valor que sai de uma venda (itens, pagamentos, parcelas, taxas) é `i64` em
//! centavos. `Decimal` aparece só para percentuais de taxa, e o resultado volta
//! para centavos com arredondamento "meio para cima".

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::common::error::AppError;

/// Divide `total_cents` em `n` parcelas. As `resto` primeiras recebem 1 centavo a mais,
/// então a soma é sempre exatamente o total e a diferença entre parcelas é no máximo 1.
pub fn split_installments(total_cents: i64, n: u32) -> Vec<i64> {
    if n == 0 {
        return Vec::new();
    }
    let count = i64::from(n);
    let base = total_cents.div_euclid(count);
    let remainder = total_cents - base * count;

    (0..count)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// `amount_cents * percent / 100`, arredondado meio-para-cima ao centavo.
///
/// Resultados fora do alcance de `i64` saturam no limite com o sinal do produto.
pub fn percent_of(amount_cents: i64, percent: Decimal) -> i64 {
    if amount_cents == 0 || percent.is_zero() {
        return 0;
    }
    let saturated = if (amount_cents < 0) == percent.is_sign_negative() {
        i64::MAX
    } else {
        i64::MIN
    };
    Decimal::from(amount_cents)
        .checked_mul(percent)
        .and_then(|raw| raw.checked_div(Decimal::ONE_HUNDRED))
        .and_then(|raw| {
            raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .unwrap_or(saturated)
}

/// Soma de centavos; `None` se estourar o `i64`.
pub fn sum_cents<I: IntoIterator<Item = i64>>(values: I) -> Option<i64> {
    values.into_iter().try_fold(0i64, |acc, v| acc.checked_add(v))
}

/// Formata centavos no padrão brasileiro: `R$ 1.234,56`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();
    let fraction = abs % 100;

    // Agrupa os milhares da direita para a esquerda
    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}R$ {grouped},{fraction:02}")
}

/// Converte um texto digitado (com ou sem símbolo, com separadores de milhar em
/// qualquer um dos dois estilos) para centavos, arredondando ao centavo mais próximo.
///
/// `"R$ 1.234,56"`, `"1,234.56"`, `"1234.5"` e `"1.234"` são todos aceitos.
pub fn parse_currency(input: &str) -> Result<i64, AppError> {
    let negative = input.contains('-');
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::invalid(format!("Valor monetário inválido: '{input}'.")));
    }

    let normalized = normalize_separators(&cleaned);
    let value = Decimal::from_str(&normalized)
        .map_err(|_| AppError::invalid(format!("Valor monetário inválido: '{input}'.")))?;

    let cents = (value * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AppError::invalid(format!("Valor monetário fora do limite: '{input}'.")))?;

    Ok(if negative { -cents } else { cents })
}

// Decide qual separador é decimal e devolve algo que o `Decimal` entende ("1234.56").
fn normalize_separators(raw: &str) -> String {
    let last_comma = raw.rfind(',');
    let last_dot = raw.rfind('.');

    let decimal_sep = match (last_comma, last_dot) {
        // Os dois presentes: o último é o decimal
        (Some(c), Some(d)) => Some(if c > d { ',' } else { '.' }),
        (Some(_), None) => single_style_decimal(raw, ','),
        (None, Some(_)) => single_style_decimal(raw, '.'),
        (None, None) => None,
    };

    match decimal_sep {
        Some(sep) => {
            let idx = raw.rfind(sep).unwrap_or(raw.len());
            let (int_part, frac_part) = raw.split_at(idx);
            let int_digits: String = int_part.chars().filter(|c| c.is_ascii_digit()).collect();
            let frac_digits: String = frac_part.chars().filter(|c| c.is_ascii_digit()).collect();
            let int_digits = if int_digits.is_empty() { "0".to_string() } else { int_digits };
            if frac_digits.is_empty() {
                int_digits
            } else {
                format!("{int_digits}.{frac_digits}")
            }
        }
        None => raw.chars().filter(|c| c.is_ascii_digit()).collect(),
    }
}

// Só um tipo de separador: vários => milhar; ponto isolado seguido de exatamente 3 dígitos
// => milhar ("1.234"); vírgula isolada => sempre decimal (padrão BRL).
fn single_style_decimal(raw: &str, sep: char) -> Option<char> {
    if raw.matches(sep).count() > 1 {
        return None;
    }
    let idx = raw.rfind(sep)?;
    let digits_after = raw[idx + 1..].chars().filter(|c| c.is_ascii_digit()).count();
    if sep == '.' && digits_after == 3 {
        return None;
    }
    Some(sep)
}
