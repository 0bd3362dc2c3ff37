// src/common/date_key.rs

//! Datas de calendário (`YYYY-MM-DD`) sem hora nem fuso.
//!
//! Tudo aqui opera sobre `NaiveDate`: não existe meia-noite local, então não existe
//! deslocamento de horário de verão. Somas que estouram o calendário saturam em
//! `NaiveDate::MIN` / `NaiveDate::MAX`.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_KEY_FORMAT).ok()
}

pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    let shifted = if n >= 0 {
        date.checked_add_days(Days::new(n.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(n.unsigned_abs()))
    };
    shifted.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

pub fn add_weeks(date: NaiveDate, n: i64) -> NaiveDate {
    add_days(date, n.saturating_mul(7))
}

/// Soma meses mantendo o dia; se o mês de destino for mais curto, cai no último dia
/// (31/01 + 1 mês = 29/02 em ano bissexto).
pub fn add_months(date: NaiveDate, n: i64) -> NaiveDate {
    let months = Months::new(u32::try_from(n.unsigned_abs()).unwrap_or(u32::MAX));
    let shifted = if n >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    shifted.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

pub fn add_years(date: NaiveDate, n: i64) -> NaiveDate {
    add_months(date, n.saturating_mul(12))
}

/// Quantidade de dias de `start` até `end`, contando os dois extremos.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Desserializa uma data opcional tolerando lixo: um valor que não é uma data
/// `YYYY-MM-DD` válida vira `None` em vez de derrubar a leitura do documento inteiro.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(parse_date_key))
}
