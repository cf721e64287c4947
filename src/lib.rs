pub mod audit;
pub mod engine;
pub mod export;
pub mod extract;
pub mod io;
pub mod layout;
pub mod member;
pub mod normalize;
pub mod report;
pub mod store;

pub mod prelude {
    pub use crate::audit::{AuditReport, Auditor, ConventionRule};
    pub use crate::engine::{AnalysisOptions, Engine};
    pub use crate::layout::ExportLayout;
    pub use crate::member::MemberRecord;
    pub use crate::store::{GroupStore, SortMode};
}
