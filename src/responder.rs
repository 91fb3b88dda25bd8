//! Conversational Responder - canned replies for small talk
//!
//! Each category has three templates; one is picked uniformly at random. The RNG is a
//! type parameter so tests can seed it.

use crate::query::CasualKind;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const GREETINGS: [&str; 3] = [
    "Olá! 👋 Sou seu assistente de análise de dados. Como posso ajudar você a analisar os dados hoje?",
    "Oi! 😊 Estou aqui para ajudar com a análise dos seus dados. O que gostaria de descobrir?",
    "Bom dia! ☀️ Pronto para explorar os dados juntos? Faça uma pergunta sobre o dataset!",
];

const THANKS: [&str; 3] = [
    "De nada! 😊 Fico feliz em ajudar com a análise dos dados. Tem mais alguma pergunta sobre o dataset?",
    "Por nada! 👍 Se precisar de mais análises dos dados, é só perguntar!",
    "Sempre às ordens! 🚀 Pronto para mais análises de dados quando quiser!",
];

const FAREWELLS: [&str; 3] = [
    "Até logo! 👋 Foi um prazer ajudar com a análise dos dados!",
    "Tchau! 😊 Espero ter ajudado com as análises. Volte sempre!",
    "Até mais! 🌟 Continue explorando os dados!",
];

const DEFAULTS: [&str; 3] = [
    "Sou especializado em análise de dados! 📊 Pergunte-me algo sobre o dataset carregado.",
    "Estou aqui para ajudar com análises de dados! 🔍 Que tal explorarmos o dataset juntos?",
    "Meu foco é análise de dados! 📈 Faça uma pergunta sobre os dados carregados.",
];

/// Reply pool for a category
pub fn response_pool(kind: CasualKind) -> &'static [&'static str] {
    match kind {
        CasualKind::Greeting => &GREETINGS,
        CasualKind::Thanks => &THANKS,
        CasualKind::Farewell => &FAREWELLS,
        CasualKind::Default => &DEFAULTS,
    }
}

pub struct CasualResponder<R: Rng = StdRng> {
    rng: R,
}

impl CasualResponder<StdRng> {
    /// Responder seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> CasualResponder<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn respond(&mut self, kind: CasualKind) -> &'static str {
        let pool = response_pool(kind);
        pool.choose(&mut self.rng).copied().unwrap_or(DEFAULTS[0])
    }
}

impl Default for CasualResponder<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}
