//! Per-source projection of parsed rows into typed staging rows.

use serde::{Deserialize, Serialize};

use crate::columns::HeaderIndex;
use crate::config::{InsuranceColumns, ItemColumns, SalesColumns};
use crate::model::{
    InsuranceFields, ItemFields, SaleFields, SourceKind, StagingRow, StructuralError,
    MISSING_KEY_MESSAGE, ZERO_COMMISSION,
};
use crate::normalize::{is_courtesy, parse_pt_br_number, safe_str};
use crate::tabular::{cell, TabularData};

/// Staging rows of one source plus the structural errors found while
/// building them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingTable<F> {
    pub kind: SourceKind,
    pub header: Vec<String>,
    pub staging: Vec<StagingRow<F>>,
    pub errors: Vec<StructuralError>,
}

impl<F> StagingTable<F> {
    /// Table for a source that was not provided.
    pub fn empty(kind: SourceKind) -> Self {
        Self {
            kind,
            header: Vec::new(),
            staging: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Rebuild a table from previously staged rows (e.g. a persisted batch).
    /// Errors are recomputed: one per keyless row.
    pub fn from_rows(kind: SourceKind, header: Vec<String>, staging: Vec<StagingRow<F>>) -> Self {
        let errors = staging
            .iter()
            .filter(|r| r.codigo_proposta.is_none())
            .map(|r| missing_key(kind, r.line))
            .collect();
        Self {
            kind,
            header,
            staging,
            errors,
        }
    }

    pub fn len(&self) -> usize {
        self.staging.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staging.is_empty()
    }
}

fn missing_key(kind: SourceKind, line: usize) -> StructuralError {
    StructuralError {
        kind,
        line,
        message: MISSING_KEY_MESSAGE.to_string(),
    }
}

/// Shared row loop. `skip_blank` drops rows whose cells are all empty
/// after trimming; skipped rows still consume their line number.
fn stage<F>(
    kind: SourceKind,
    data: &TabularData,
    key_idx: Option<usize>,
    skip_blank: bool,
    project: impl Fn(&[String]) -> F,
) -> StagingTable<F> {
    let mut staging = Vec::with_capacity(data.rows.len());
    let mut errors = Vec::new();

    for (i, cols) in data.rows.iter().enumerate() {
        if skip_blank && cols.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let line = TabularData::line_of(i);
        let codigo_proposta = safe_str(cell(cols, key_idx));
        if codigo_proposta.is_none() {
            errors.push(missing_key(kind, line));
        }

        staging.push(StagingRow {
            kind,
            line,
            codigo_proposta,
            cols: cols.clone(),
            fields: project(cols),
        });
    }

    log::debug!(
        "{kind}: staged {} row(s), {} without key",
        staging.len(),
        errors.len()
    );

    StagingTable {
        kind,
        header: data.header.iter().map(|h| h.trim().to_string()).collect(),
        staging,
        errors,
    }
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

pub fn stage_sales(data: &TabularData, columns: &SalesColumns) -> StagingTable<SaleFields> {
    let index = HeaderIndex::new(&data.header);
    let key = index.resolve("codigo_proposta", &columns.codigo_proposta);
    let chassi = index.resolve("chassi", &columns.chassi);
    let loja = index.resolve("loja", &columns.loja);
    let cnpj_loja = index.resolve("cnpj_loja", &columns.cnpj_loja);
    let banco = index.resolve("banco", &columns.banco);
    let valor_financiado = index.resolve("valor_financiado", &columns.valor_financiado);
    let status = index.resolve("status", &columns.status);
    let data_idx = index.resolve("data", &columns.data);
    let vendedor = index.resolve("vendedor_responsavel", &columns.vendedor_responsavel);
    let comissao = index.resolve("valor_comissao", &columns.valor_comissao);

    stage(SourceKind::Sales, data, key, false, |cols| SaleFields {
        chassi: safe_str(cell(cols, chassi)),
        loja: safe_str(cell(cols, loja)),
        cnpj_loja: safe_str(cell(cols, cnpj_loja)),
        banco: safe_str(cell(cols, banco)),
        valor_financiado: safe_str(cell(cols, valor_financiado)),
        status: safe_str(cell(cols, status)),
        data: safe_str(cell(cols, data_idx)),
        vendedor_responsavel: safe_str(cell(cols, vendedor)),
        valor_comissao: match comissao {
            Some(_) => safe_str(cell(cols, comissao)),
            None => Some(ZERO_COMMISSION.to_string()),
        },
    })
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

pub fn stage_items(data: &TabularData, columns: &ItemColumns) -> StagingTable<ItemFields> {
    let index = HeaderIndex::new(&data.header);
    let key = index.resolve("codigo_proposta", &columns.codigo_proposta);
    let chassi = index.resolve("chassi", &columns.chassi);
    let tipo = index.resolve("tipo", &columns.tipo);
    let codigo_item = index.resolve("codigo_item", &columns.codigo_item);
    let fornecedor = index.resolve("fornecedor", &columns.fornecedor);
    let descricao = index.resolve("descricao", &columns.descricao);
    let quantidade = index.resolve("quantidade", &columns.quantidade);
    let valor_unitario = index.resolve("valor_unitario", &columns.valor_unitario);
    let cortesia = index.resolve("cortesia", &columns.cortesia);

    stage(SourceKind::Items, data, key, false, |cols| ItemFields {
        chassi: safe_str(cell(cols, chassi)),
        tipo: safe_str(cell(cols, tipo)),
        codigo_item: safe_str(cell(cols, codigo_item)),
        fornecedor: safe_str(cell(cols, fornecedor)),
        descricao: safe_str(cell(cols, descricao)),
        quantidade: parse_pt_br_number(cell(cols, quantidade)),
        valor_unitario: parse_pt_br_number(cell(cols, valor_unitario)),
        cortesia: is_courtesy(cell(cols, cortesia)),
    })
}

// ---------------------------------------------------------------------------
// Insurance
// ---------------------------------------------------------------------------

pub fn stage_insurance(data: &TabularData, columns: &InsuranceColumns) -> StagingTable<InsuranceFields> {
    let index = HeaderIndex::new(&data.header);
    let key = index.resolve("codigo_proposta", &columns.codigo_proposta);
    let produto = index.resolve("produto", &columns.produto);
    let valor_seguro = index.resolve("valor_seguro", &columns.valor_seguro);
    let status = index.resolve("status", &columns.status);
    let cpf = index.resolve("cpf", &columns.cpf);
    let nome_cliente = index.resolve("nome_cliente", &columns.nome_cliente);

    stage(SourceKind::Insurance, data, key, true, |cols| InsuranceFields {
        produto: safe_str(cell(cols, produto)),
        valor_seguro: parse_pt_br_number(cell(cols, valor_seguro)),
        status: safe_str(cell(cols, status)),
        cpf: safe_str(cell(cols, cpf)),
        nome_cliente: safe_str(cell(cols, nome_cliente)),
    })
}
