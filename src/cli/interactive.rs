use std::io::{self, BufRead, Write};

use anyhow::{Result, anyhow};

use crate::core::Finding;

pub(crate) fn prompt_candidate(candidates: &[&Finding]) -> Result<Option<usize>> {
    let mut stderr = io::stderr().lock();
    writeln!(stderr, "La clave coincide con varios registros:")?;
    for (idx, f) in candidates.iter().enumerate() {
        writeln!(
            stderr,
            "[{}] {} ({})  {}  uuid={}",
            idx + 1,
            f.code(),
            f.zone,
            short(&f.description, 40),
            f.uuid
        )?;
    }
    write!(stderr, "Elija un número (vacío o 'n' para cancelar): ")?;
    stderr.flush()?;

    let mut input = String::new();
    let mut stdin = io::stdin().lock();
    let n = stdin.read_line(&mut input)?;
    if n == 0 {
        return Ok(None);
    }
    parse_choice(&input, candidates.len())
}

pub(crate) fn parse_choice(input: &str, max: usize) -> Result<Option<usize>> {
    if max == 0 {
        return Ok(None);
    }

    let s = input.trim().to_lowercase();
    match s.as_str() {
        "" | "n" | "no" | "q" | "salir" | "cancelar" => return Ok(None),
        _ => {}
    }

    let idx = s
        .parse::<usize>()
        .map_err(|_| anyhow!("selección inválida: {s}"))?;
    if idx == 0 {
        return Err(anyhow!("la selección empieza en 1: {s}"));
    }
    if idx > max {
        return Err(anyhow!("selección fuera de rango (máximo {max}): {s}"));
    }
    Ok(Some(idx - 1))
}

fn short(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{head}...")
}
