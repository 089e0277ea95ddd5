//! Customer-support orchestration and response policy

pub mod agent;
pub mod policy;

pub use agent::detect_escalation;
pub use agent::render_history;
pub use agent::SupportAgent;
pub use agent::CONTEXT_DOCUMENTS;
pub use agent::HISTORY_TURNS;
pub use policy::ResponsePolicy;
pub use policy::Situation;
