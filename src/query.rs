//! Query Classifier - tells data questions apart from small talk
//!
//! Keyword matching is lower-cased substring containment, so short keywords such as
//! "nf" or "df" also fire inside longer words.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DATA_KEYWORDS: &[&str] = &[
    "dados", "dataframe", "df", "csv", "tabela", "coluna", "linha", "registro",
    "valor", "quantidade", "total", "soma", "média", "máximo", "mínimo",
    "análise", "estatística", "gráfico", "resumo", "filtrar", "agrupar",
    "nota fiscal", "nf", "item", "fornecedor", "produto", "preço",
    "qual", "quanto", "quantos", "como", "onde", "quando", "mostre",
    "liste", "calcule", "some", "conte", "agrupe",
];

pub const CASUAL_KEYWORDS: &[&str] = &[
    "oi", "olá", "ola", "bom dia", "boa tarde", "boa noite",
    "como vai", "tudo bem", "tchau", "obrigado", "obrigada",
    "valeu", "legal", "bacana", "show",
];

const GREETING_TERMS: &[&str] = &["oi", "olá", "ola", "bom dia", "boa tarde", "boa noite"];
const THANKS_TERMS: &[&str] = &["obrigado", "obrigada", "valeu", "brigado"];
const FAREWELL_TERMS: &[&str] = &["tchau", "até logo", "até mais", "bye"];

/// Below this many words, a query with no data keyword is treated as small talk
pub const MIN_DATA_QUERY_WORDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CasualKind {
    Greeting,
    Thanks,
    Farewell,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryClass {
    DataQuery,
    Casual(CasualKind),
}

impl QueryClass {
    pub fn is_data(&self) -> bool {
        matches!(self, QueryClass::DataQuery)
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

pub fn classify_query(query: &str) -> QueryClass {
    let lower = query.to_lowercase();
    let has_casual = contains_any(&lower, CASUAL_KEYWORDS);
    let has_data = contains_any(&lower, DATA_KEYWORDS);

    let casual = if has_casual && !has_data {
        true
    } else {
        !has_data && query.split_whitespace().count() < MIN_DATA_QUERY_WORDS
    };

    let class = if casual {
        QueryClass::Casual(casual_kind(&lower))
    } else {
        QueryClass::DataQuery
    };
    debug!("Classified {:?} as {:?} (casual={}, data={})", query, class, has_casual, has_data);
    class
}

/// Second pass for small talk: greeting, then thanks, then farewell
fn casual_kind(lower: &str) -> CasualKind {
    if contains_any(lower, GREETING_TERMS) {
        CasualKind::Greeting
    } else if contains_any(lower, THANKS_TERMS) {
        CasualKind::Thanks
    } else if contains_any(lower, FAREWELL_TERMS) {
        CasualKind::Farewell
    } else {
        CasualKind::Default
    }
}
