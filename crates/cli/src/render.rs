// Human-readable text for stderr

use std::fmt::Write;

use propostas_recon::ReconciliationResult;
use propostas_store::Batch;

use crate::flow::SourcePreview;

/// Rows shown per preview step.
pub const PREVIEW_ROWS: usize = 10;

/// Counts plus every structural error and pending reference. `label` names
/// the batch (a competency label, or "snapshot").
pub fn summary(result: &ReconciliationResult, label: &str) -> String {
    let s = result.summary();
    let mut out = String::new();
    let _ = writeln!(out, "Competência {label}");
    let _ = writeln!(
        out,
        "  linhas: Vendas {}, Itens {}, Totalseg {}",
        s.vendas_lines, s.itens_lines, s.totalseg_lines
    );
    let _ = writeln!(
        out,
        "  propostas: {} ({} com seguro)",
        s.propostas, s.propostas_com_seguro
    );
    let _ = writeln!(out, "  pendências: {}", s.pending);
    let _ = writeln!(out, "  erros estruturais: {}", s.errors);
    for e in &result.errors {
        let _ = writeln!(out, "    {} linha {}: {}", e.kind, e.line, e.message);
    }
    for p in &result.pending {
        let _ = writeln!(out, "    {} linha {} ({}): {}", p.kind, p.line, p.codigo_proposta, p.message);
    }
    out
}

/// Header plus the first `limit` staged rows of one source.
pub fn preview(p: &SourcePreview<'_>, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}/{}] {}: {} linha(s)",
        p.step + 1,
        p.steps,
        p.kind.file_label(),
        p.rows.len()
    );
    let _ = writeln!(out, "  cabeçalho: {}", p.header.join(" | "));
    for row in p.rows.iter().take(limit) {
        let key = row.codigo_proposta.unwrap_or("(sem código)");
        let _ = writeln!(out, "  {:>5}  {:<16}  {}", row.line, key, row.cols.join(" | "));
    }
    if p.rows.len() > limit {
        let _ = writeln!(out, "  … mais {} linha(s)", p.rows.len() - limit);
    }
    out
}

pub fn batch_list(batches: &[Batch], last_key: Option<&str>) -> String {
    if batches.is_empty() {
        return "nenhum lote salvo\n".to_string();
    }
    let mut out = String::new();
    for b in batches {
        let marker = if Some(b.competencia_key.as_str()) == last_key { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {}  {}  {} proposta(s)  {}  {}",
            b.competencia_key,
            b.competencia_label,
            b.data.propostas.len(),
            b.processed_at.to_rfc3339(),
            b.id
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::PreviewRow;
    use propostas_recon::{run, ReconInput, SourceKind};

    #[test]
    fn preview_truncates_long_sources() {
        let header = vec!["Cód".to_string(), "Loja".to_string()];
        let cols: Vec<Vec<String>> = (0..15).map(|i| vec![format!("P{i}"), "X".into()]).collect();
        let rows: Vec<PreviewRow<'_>> = cols
            .iter()
            .enumerate()
            .map(|(i, c)| PreviewRow { line: i + 2, codigo_proposta: Some(c[0].as_str()), cols: c })
            .collect();
        let p = SourcePreview { kind: SourceKind::Sales, step: 0, steps: 2, header: &header, rows };
        let text = preview(&p, 3);
        assert!(text.starts_with("[1/2] Vendas.csv"));
        assert!(text.contains("P2 "));
        assert!(!text.contains("P3 "));
        assert!(text.contains("mais 12 linha(s)"));
    }

    #[test]
    fn empty_batch_list() {
        assert_eq!(batch_list(&[], None), "nenhum lote salvo\n");
    }

    #[test]
    fn summary_mentions_period_and_counts() {
        let result = run(ReconInput::new("utf-8"));
        let text = summary(&result, "03/2024");
        assert!(text.starts_with("Competência 03/2024"));
        assert!(text.contains("propostas: 0 (0 com seguro)"));
    }
}
