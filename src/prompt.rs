//! Prompt Enricher and agent system templates
//!
//! The agent's query tool tends to look at a preview of the table and aggregate over it.
//! The enriched prompt restates the real table size and forces a full-table count before
//! any aggregate. It is a textual guardrail, not a guarantee.

use crate::dataset::{DatasetContext, DatasetKind};

/// Name of the table inside the agent's SQL context
pub const TABLE_NAME: &str = "df";

/// Validation query the agent must run before answering
pub fn validation_sql() -> String {
    format!("SELECT COUNT(*) AS total_registros FROM {}", TABLE_NAME)
}

/// Wrap a user question with size checks and full-dataset directives
pub fn enrich_query(original_query: &str, context: &DatasetContext) -> String {
    format!(
        r#"
IMPORTANTE: Você está analisando um dataset com {rows} registros e {cols} colunas.

REGRAS OBRIGATÓRIAS:
1. SEMPRE execute uma contagem completa (COUNT(*)) para confirmar o número total de registros
2. NUNCA use apenas uma amostra ou prévia (LIMIT) para cálculos - use o dataset completo
3. Para cálculos (soma, média, contagem), SEMPRE use toda a tabela {table}


Pergunta original: {query}

ANTES de responder, execute esta consulta de validação:
```sql
{validation}
```

Agora responda a pergunta considerando TODOS os {rows} registros.
"#,
        rows = context.total_rows,
        cols = context.total_cols,
        table = TABLE_NAME,
        query = original_query,
        validation = validation_sql(),
    )
}

const CRITICAL_RULES: &str = r#"REGRAS CRÍTICAS - SIGA RIGOROSAMENTE:
1. SEMPRE execute SELECT COUNT(*) FROM df primeiro para saber o total de registros
2. NUNCA use LIMIT para cálculos - apenas para visualização
3. Para qualquer cálculo (soma, média, contagem), use o dataset COMPLETO
4. Se a pergunta pede totais, some TODAS as linhas, não apenas uma amostra"#;

const INVOICE_CONTEXT: &str = r#"Contexto dos dados:
- Dados mesclados de notas fiscais (cabeçalho + itens)
- Cada linha representa um item de uma nota fiscal
- Para análises corretas, considere TODOS os registros"#;

const FORMAT_RULES: &str = r#"FORMATO OBRIGATÓRIO para cálculos:
1. Primeiro: SELECT COUNT(*) FROM df para verificar tamanho
2. Depois: cálculo completo no dataset
3. Informar na resposta: "Analisados X registros de Y total""#;

const REACT_FORMAT: &str = r#"Você tem acesso às seguintes ferramentas: {tools}

Use o seguinte formato:

Pergunta: {input}
Pensamento: Vou primeiro verificar o tamanho do dataset com COUNT(*), depois fazer a análise completa
Ação: sql_query
Entrada da Ação: SELECT COUNT(*) AS total_registros FROM df
Observação: [resultado da contagem]
Pensamento: Agora vou fazer o cálculo considerando TODOS os registros
Ação: sql_query
Entrada da Ação: [consulta SQL para análise completa]
Observação: [resultado]
Pensamento: Tenho o resultado baseado em TODO o dataset
Resposta Final: [resposta em português]

{agent_scratchpad}"#;

/// System template for the agent, with `{tools}`, `{input}` and `{agent_scratchpad}`
/// placeholders
pub fn agent_template(kind: DatasetKind) -> String {
    let intro = match kind {
        DatasetKind::MergedInvoices => {
            "Você é um assistente especializado em análise de dados de notas fiscais que sempre responde em português brasileiro."
        }
        DatasetKind::Single => {
            "Você é um assistente especializado em análise de dados que sempre responde em português brasileiro."
        }
    };

    let mut sections = vec![intro, CRITICAL_RULES];
    if kind == DatasetKind::MergedInvoices {
        sections.push(INVOICE_CONTEXT);
    }
    sections.push(FORMAT_RULES);
    sections.push(REACT_FORMAT);

    format!("\n{}", sections.join("\n\n"))
}

/// Fill the template placeholders
pub fn render_template(template: &str, tools: &str, input: &str, scratchpad: &str) -> String {
    template
        .replace("{tools}", tools)
        .replace("{input}", input)
        .replace("{agent_scratchpad}", scratchpad)
}
