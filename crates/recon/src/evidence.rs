use crate::model::{ReconSummary, ReconciliationResult};

/// Counts shown after an import: rows per source, problems, proposals.
pub fn compute_summary(result: &ReconciliationResult) -> ReconSummary {
    ReconSummary {
        vendas_lines: result.vendas_raw.len(),
        itens_lines: result.itens_raw.len(),
        totalseg_lines: result.totalseg_raw.len(),
        errors: result.errors.len(),
        pending: result.pending.len(),
        propostas: result.propostas.len(),
        propostas_com_seguro: result.propostas.iter().filter(|p| !p.seguros.is_empty()).count(),
    }
}

impl ReconciliationResult {
    pub fn summary(&self) -> ReconSummary {
        compute_summary(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SchemaConfig;
    use crate::engine::{run, ReconInput};
    use crate::staging::{stage_insurance, stage_sales};
    use crate::tabular::TabularData;

    fn table(header: &[&str], rows: &[&[&str]]) -> TabularData {
        TabularData::new(
            header.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn summary_counts() {
        let schema = SchemaConfig::default();
        let mut input = ReconInput::new("utf-8");
        input.vendas = stage_sales(
            &table(&["Cód da Proposta"], &[&["P1"], &["P2"], &[""]]),
            &schema.vendas,
        );
        input.totalseg = stage_insurance(
            &table(&["Proposta", "Produto"], &[&["P1", "Vida"], &["P9", "Auto"]]),
            &schema.totalseg,
        );
        let summary = run(input).summary();
        assert_eq!(summary.vendas_lines, 3);
        assert_eq!(summary.itens_lines, 0);
        assert_eq!(summary.totalseg_lines, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.propostas, 2);
        assert_eq!(summary.propostas_com_seguro, 1);
    }
}
