//! Built-in persona, demo questions, and model defaults.

/// System persona for the mentor.
pub const MENTOR_PERSONA: &str = "Você é o 'GeoAI Mentor', um assistente especializado em ajudar geocientistas a migrar para a área de Ciência de Dados e IA. Sua base é sólida em Geociências, e você orienta sobre a transição para dados, programação e projetos. Seja amigável e didático.";

/// Questions asked, in order, by the `demo` command.
pub const DEMO_QUESTIONS: [&str; 2] = [
    "Eu sou geofísico e quero migrar para a área de dados. Qual linguagem de programação devo aprender primeiro?",
    "E que tipo de projeto de portfólio eu poderia criar usando essa linguagem?",
];

pub const DEFAULT_SESSION_ID: &str = "geo_mentor_session";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
