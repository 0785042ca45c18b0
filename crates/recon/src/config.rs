use serde::Deserialize;

use crate::error::ReconError;
use crate::normalize::normalize_header;

// ---------------------------------------------------------------------------
// Top-level schema
// ---------------------------------------------------------------------------

/// Candidate header names per field, per source.
///
/// Every list is priority-ordered. Omitted fields keep the built-in
/// candidates, so a schema file only needs to list what differs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub vendas: SalesColumns,
    pub itens: ItemColumns,
    pub totalseg: InsuranceColumns,
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn key_candidates() -> Vec<String> {
    list(&["cod da proposta", "c d da proposta", "codigo da proposta"])
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SalesColumns {
    pub codigo_proposta: Vec<String>,
    pub chassi: Vec<String>,
    pub loja: Vec<String>,
    pub cnpj_loja: Vec<String>,
    pub banco: Vec<String>,
    pub valor_financiado: Vec<String>,
    pub status: Vec<String>,
    pub data: Vec<String>,
    pub vendedor_responsavel: Vec<String>,
    pub valor_comissao: Vec<String>,
}

impl Default for SalesColumns {
    fn default() -> Self {
        Self {
            codigo_proposta: key_candidates(),
            chassi: list(&["chassi"]),
            loja: list(&["loja", "nome fantasia"]),
            cnpj_loja: list(&["cnpj loja", "cnpj"]),
            banco: list(&["banco"]),
            valor_financiado: list(&["valor financiado", "valor bruto"]),
            status: list(&["situacao", "status"]),
            data: list(&["data", "data da proposta"]),
            vendedor_responsavel: list(&["vendedor", "colaborador", "consultor"]),
            valor_comissao: list(&["valor comissao", "comissao"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ItemColumns {
    pub codigo_proposta: Vec<String>,
    pub chassi: Vec<String>,
    pub tipo: Vec<String>,
    pub codigo_item: Vec<String>,
    pub fornecedor: Vec<String>,
    pub descricao: Vec<String>,
    pub quantidade: Vec<String>,
    pub valor_unitario: Vec<String>,
    pub cortesia: Vec<String>,
}

impl Default for ItemColumns {
    fn default() -> Self {
        Self {
            codigo_proposta: key_candidates(),
            chassi: list(&["chassi"]),
            tipo: list(&["tipo"]),
            codigo_item: list(&["codigo"]),
            fornecedor: list(&["fornecedor"]),
            descricao: list(&["descricao"]),
            quantidade: list(&["quantidade"]),
            valor_unitario: list(&["valor unitario"]),
            cortesia: list(&["cortesia"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Insurance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsuranceColumns {
    pub codigo_proposta: Vec<String>,
    pub produto: Vec<String>,
    pub valor_seguro: Vec<String>,
    pub status: Vec<String>,
    pub cpf: Vec<String>,
    pub nome_cliente: Vec<String>,
}

impl Default for InsuranceColumns {
    fn default() -> Self {
        Self {
            codigo_proposta: list(&[
                "cod da proposta",
                "codigo da proposta",
                "proposta",
                "num proposta",
                "numero proposta",
            ]),
            produto: list(&["produto", "descricao produto", "tipo produto"]),
            valor_seguro: list(&["valor seguro", "valor premio", "premio", "valor"]),
            status: list(&["status", "situacao"]),
            cpf: list(&["cpf", "cpf cliente"]),
            nome_cliente: list(&["nome", "nome cliente", "segurado"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SchemaConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let mut config: SchemaConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.prepare()?;
        Ok(config)
    }

    /// Named candidate lists, for normalization and validation.
    fn fields_mut(&mut self) -> Vec<(&'static str, &mut Vec<String>)> {
        let v = &mut self.vendas;
        let i = &mut self.itens;
        let t = &mut self.totalseg;
        vec![
            ("vendas.codigo_proposta", &mut v.codigo_proposta),
            ("vendas.chassi", &mut v.chassi),
            ("vendas.loja", &mut v.loja),
            ("vendas.cnpj_loja", &mut v.cnpj_loja),
            ("vendas.banco", &mut v.banco),
            ("vendas.valor_financiado", &mut v.valor_financiado),
            ("vendas.status", &mut v.status),
            ("vendas.data", &mut v.data),
            ("vendas.vendedor_responsavel", &mut v.vendedor_responsavel),
            ("vendas.valor_comissao", &mut v.valor_comissao),
            ("itens.codigo_proposta", &mut i.codigo_proposta),
            ("itens.chassi", &mut i.chassi),
            ("itens.tipo", &mut i.tipo),
            ("itens.codigo_item", &mut i.codigo_item),
            ("itens.fornecedor", &mut i.fornecedor),
            ("itens.descricao", &mut i.descricao),
            ("itens.quantidade", &mut i.quantidade),
            ("itens.valor_unitario", &mut i.valor_unitario),
            ("itens.cortesia", &mut i.cortesia),
            ("totalseg.codigo_proposta", &mut t.codigo_proposta),
            ("totalseg.produto", &mut t.produto),
            ("totalseg.valor_seguro", &mut t.valor_seguro),
            ("totalseg.status", &mut t.status),
            ("totalseg.cpf", &mut t.cpf),
            ("totalseg.nome_cliente", &mut t.nome_cliente),
        ]
    }

    /// Bring user-written candidates into header-normalized form and reject
    /// lists the resolver could never use.
    pub fn prepare(&mut self) -> Result<(), ReconError> {
        for (name, candidates) in self.fields_mut() {
            for c in candidates.iter_mut() {
                *c = normalize_header(c);
            }
            if candidates.iter().any(|c| c.is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "{name}: candidate is blank after normalization"
                )));
            }
            if name.ends_with(".codigo_proposta") && candidates.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{name}: at least one candidate is required"
                )));
            }
        }
        Ok(())
    }
}
