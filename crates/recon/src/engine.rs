use std::collections::HashMap;

use crate::model::{
    InsuranceFields, InsuranceRecord, InsuranceRow, Item, ItemFields, ItemRow, PendingReference,
    Proposal, ReconciliationResult, SaleFields, SaleRow, SourceHeaders, SourceKind,
    PENDING_INSURANCE_MESSAGE, PENDING_ITEM_MESSAGE,
};
use crate::normalize::collate;
use crate::staging::StagingTable;

/// Staged sources for one import. Sources that were not provided are empty
/// tables.
pub struct ReconInput {
    pub encoding: String,
    pub vendas: StagingTable<SaleFields>,
    pub itens: StagingTable<ItemFields>,
    pub totalseg: StagingTable<InsuranceFields>,
}

impl ReconInput {
    pub fn new(encoding: impl Into<String>) -> Self {
        Self {
            encoding: encoding.into(),
            vendas: StagingTable::empty(SourceKind::Sales),
            itens: StagingTable::empty(SourceKind::Items),
            totalseg: StagingTable::empty(SourceKind::Insurance),
        }
    }
}

/// Join the three staging tables into proposals, sales ledger as root.
pub fn run(input: ReconInput) -> ReconciliationResult {
    let ReconInput {
        encoding,
        vendas,
        itens,
        totalseg,
    } = input;

    let mut roots = build_roots(&vendas.staging);
    let mut pending = attach_items(&itens.staging, &mut roots);
    pending.extend(attach_insurance(&totalseg.staging, &mut roots));

    let mut propostas: Vec<Proposal> = roots.into_values().collect();
    propostas.sort_by(|a, b| collate(&a.codigo_proposta, &b.codigo_proposta));

    let mut errors = vendas.errors;
    errors.extend(itens.errors);
    errors.extend(totalseg.errors);

    log::info!(
        "reconciled {} proposal(s): {} pending, {} structural error(s)",
        propostas.len(),
        pending.len(),
        errors.len()
    );

    ReconciliationResult {
        encoding,
        headers: SourceHeaders {
            vendas: vendas.header,
            itens: itens.header,
            totalseg: totalseg.header,
        },
        vendas_raw: vendas.staging,
        itens_raw: itens.staging,
        totalseg_raw: totalseg.staging,
        errors,
        pending,
        propostas,
    }
}

/// One proposal per distinct sales key; the first row with a key wins.
fn build_roots(rows: &[SaleRow]) -> HashMap<String, Proposal> {
    let mut roots: HashMap<String, Proposal> = HashMap::new();
    for row in rows {
        let Some(codigo) = row.codigo_proposta.as_ref() else {
            continue;
        };
        if roots.contains_key(codigo) {
            // TODO: report as a structural error once duplicate keys stop being tolerated
            continue;
        }
        let f = &row.fields;
        roots.insert(
            codigo.clone(),
            Proposal {
                codigo_proposta: codigo.clone(),
                loja: f.loja.clone(),
                cnpj_loja: f.cnpj_loja.clone(),
                banco: f.banco.clone(),
                valor_financiado: f.valor_financiado.clone(),
                status: f.status.clone(),
                data: f.data.clone(),
                vendedor_responsavel: f.vendedor_responsavel.clone(),
                valor_comissao: f.valor_comissao.clone(),
                itens: Vec::new(),
                seguros: Vec::new(),
            },
        );
    }
    roots
}

fn attach_items(rows: &[ItemRow], roots: &mut HashMap<String, Proposal>) -> Vec<PendingReference> {
    let mut pending = Vec::new();
    for row in rows {
        let Some(codigo) = row.codigo_proposta.as_ref() else {
            continue;
        };
        match roots.get_mut(codigo) {
            Some(prop) => {
                let f = &row.fields;
                prop.itens.push(Item {
                    codigo_proposta: codigo.clone(),
                    tipo: f.tipo.clone(),
                    codigo_item: f.codigo_item.clone(),
                    fornecedor: f.fornecedor.clone(),
                    descricao: f.descricao.clone(),
                    quantidade: f.quantidade,
                    valor_unitario: f.valor_unitario,
                    cortesia: f.cortesia,
                    line: row.line,
                });
            }
            None => pending.push(PendingReference {
                kind: SourceKind::Items,
                line: row.line,
                codigo_proposta: codigo.clone(),
                message: PENDING_ITEM_MESSAGE.to_string(),
            }),
        }
    }
    pending
}

fn attach_insurance(
    rows: &[InsuranceRow],
    roots: &mut HashMap<String, Proposal>,
) -> Vec<PendingReference> {
    let mut pending = Vec::new();
    for row in rows {
        let Some(codigo) = row.codigo_proposta.as_ref() else {
            continue;
        };
        match roots.get_mut(codigo) {
            Some(prop) => {
                let f = &row.fields;
                prop.seguros.push(InsuranceRecord {
                    codigo_proposta: codigo.clone(),
                    produto: f.produto.clone(),
                    valor_seguro: f.valor_seguro,
                    status: f.status.clone(),
                    cpf: f.cpf.clone(),
                    nome_cliente: f.nome_cliente.clone(),
                    line: row.line,
                });
            }
            None => pending.push(PendingReference {
                kind: SourceKind::Insurance,
                line: row.line,
                codigo_proposta: codigo.clone(),
                message: PENDING_INSURANCE_MESSAGE.to_string(),
            }),
        }
    }
    pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;
    use crate::staging::{stage_insurance, stage_items, stage_sales};
    use crate::tabular::TabularData;

    fn table(header: &[&str], rows: &[&[&str]]) -> TabularData {
        TabularData::new(
            header.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn input(
        sales: Option<TabularData>,
        items: Option<TabularData>,
        insurance: Option<TabularData>,
    ) -> ReconInput {
        let schema = SchemaConfig::default();
        let mut input = ReconInput::new("utf-8");
        if let Some(t) = sales {
            input.vendas = stage_sales(&t, &schema.vendas);
        }
        if let Some(t) = items {
            input.itens = stage_items(&t, &schema.itens);
        }
        if let Some(t) = insurance {
            input.totalseg = stage_insurance(&t, &schema.totalseg);
        }
        input
    }

    #[test]
    fn sales_only_single_proposal() {
        let result = run(input(Some(table(&["Cód da Proposta"], &[&["P1"]])), None, None));
        assert_eq!(result.propostas.len(), 1);
        let p = &result.propostas[0];
        assert_eq!(p.codigo_proposta, "P1");
        assert!(p.itens.is_empty());
        assert!(p.seguros.is_empty());
        assert!(result.pending.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn items_without_sales_are_pending() {
        let result = run(input(None, Some(table(&["Cód da Proposta"], &[&["P2"]])), None));
        assert!(result.propostas.is_empty());
        assert_eq!(result.pending.len(), 1);
        assert_eq!(result.pending[0].kind, SourceKind::Items);
        assert_eq!(result.pending[0].codigo_proposta, "P2");
        assert_eq!(result.pending[0].line, 2);
    }

    #[test]
    fn keyless_sale_creates_no_proposal() {
        let result = run(input(
            Some(table(&["Cód da Proposta", "Loja"], &[&["", "Centro"]])),
            None,
            None,
        ));
        assert!(result.propostas.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 2);
        assert!(result.pending.is_empty());
    }

    #[test]
    fn duplicate_sales_first_wins() {
        let result = run(input(
            Some(table(
                &["Cód da Proposta", "Loja"],
                &[&["P1", "Primeira"], &["P1", "Segunda"]],
            )),
            None,
            None,
        ));
        assert_eq!(result.propostas.len(), 1);
        assert_eq!(result.propostas[0].loja.as_deref(), Some("Primeira"));
        assert!(result.errors.is_empty());
        assert!(result.pending.is_empty());
    }

    #[test]
    fn children_attach_in_staging_order() {
        let result = run(input(
            Some(table(&["Cód da Proposta"], &[&["P1"], &["P2"]])),
            Some(table(
                &["Cód da Proposta", "Descrição"],
                &[&["P2", "tapete"], &["P1", "película"], &["P2", "tapete"]],
            )),
            Some(table(&["Proposta", "Produto"], &[&["P1", "Vida"], &["P1", "Auto"]])),
        ));
        let p1 = &result.propostas[0];
        let p2 = &result.propostas[1];
        assert_eq!(p1.itens.len(), 1);
        assert_eq!(p1.seguros.iter().map(|s| s.line).collect::<Vec<_>>(), vec![2, 3]);
        // no dedup of identical items
        assert_eq!(p2.itens.len(), 2);
        assert_eq!(p2.itens[0].line, 2);
        assert_eq!(p2.itens[1].line, 4);
        assert!(p2.itens.iter().all(|i| i.codigo_proposta == "P2"));
    }

    #[test]
    fn pending_items_before_insurance_and_errors_by_source() {
        let result = run(input(
            Some(table(&["Cód da Proposta"], &[&[""], &["P1"]])),
            Some(table(&["Cód da Proposta"], &[&["X"], &[""]])),
            Some(table(&["Proposta", "Produto"], &[&["Y", "Vida"], &["", "Auto"]])),
        ));
        let pending: Vec<_> = result.pending.iter().map(|p| (p.kind, p.codigo_proposta.as_str())).collect();
        assert_eq!(pending, vec![(SourceKind::Items, "X"), (SourceKind::Insurance, "Y")]);
        let errors: Vec<_> = result.errors.iter().map(|e| (e.kind, e.line)).collect();
        assert_eq!(
            errors,
            vec![(SourceKind::Sales, 2), (SourceKind::Items, 3), (SourceKind::Insurance, 3)]
        );
    }

    #[test]
    fn proposals_sorted_by_code() {
        let result = run(input(
            Some(table(&["Cód da Proposta"], &[&["b2"], &["A9"], &["a1"]])),
            None,
            None,
        ));
        let codes: Vec<_> = result.propostas.iter().map(|p| p.codigo_proposta.as_str()).collect();
        assert_eq!(codes, vec!["a1", "A9", "b2"]);
    }

    #[test]
    fn headers_and_raw_rows_carried_into_result() {
        let result = run(input(
            Some(table(&["Cód da Proposta", "Loja"], &[&["P1", "X"]])),
            None,
            None,
        ));
        assert_eq!(result.headers.vendas, vec!["Cód da Proposta", "Loja"]);
        assert_eq!(result.vendas_raw.len(), 1);
        assert!(result.itens_raw.is_empty());
        assert_eq!(result.encoding, "utf-8");
    }
}
