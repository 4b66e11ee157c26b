use anyhow::{Result, anyhow};
use time::Date;
use time::macros::format_description;

pub fn format_display(stored: &str) -> String {
    if stored.is_empty() || !stored.contains('-') {
        return stored.to_string();
    }
    let parts: Vec<&str> = stored.split('-').collect();
    if parts.len() < 3 {
        return stored.to_string();
    }
    let (year, month, day) = (parts[0], parts[1], parts[2]);
    if year.is_empty() || month.is_empty() || day.is_empty() {
        return stored.to_string();
    }
    let short_year: String = year.chars().skip(2).collect();
    format!("{day}/{month}/{short_year}")
}

pub fn parse_import_date(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 {
        return String::new();
    }
    let day = pad2(parts[0]);
    let month = pad2(parts[1]);
    let year = if parts[2].chars().count() == 2 {
        format!("20{}", parts[2])
    } else {
        parts[2].to_string()
    };
    format!("{year}-{month}-{day}")
}

fn pad2(s: &str) -> String {
    if s.chars().count() >= 2 {
        s.to_string()
    } else {
        format!("{s:0>2}")
    }
}

pub fn normalize_cli_date(raw: &str) -> Result<String> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(String::new());
    }
    if s.contains('/') {
        let iso = parse_import_date(s);
        return check_iso(&iso).map(|_| iso);
    }
    if s.contains('-') {
        return check_iso(s).map(|_| s.to_string());
    }
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        return Ok(s.to_string());
    }
    Err(anyhow!(
        "fecha inválida: {s} (YYYY-MM-DD, DD/MM/YY o un año)"
    ))
}

fn check_iso(s: &str) -> Result<Date> {
    let fmt = format_description!("[year]-[month]-[day]");
    Date::parse(s, &fmt).map_err(|_| anyhow!("fecha inválida: {s} (YYYY-MM-DD, DD/MM/YY o un año)"))
}
