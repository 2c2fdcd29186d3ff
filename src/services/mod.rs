pub mod comment_reconciler;
pub mod lookup;
pub mod markdown;
pub mod record_mapper;
pub mod reconciliation_engine;
pub mod state_mapper;

pub use comment_reconciler::CommentReconciler;
pub use lookup::{LookupOutcome, WorkItemLookup};
pub use markdown::markdown_to_html;
pub use record_mapper::PatchBuilder;
pub use reconciliation_engine::{
    BatchReport, EngineSettings, ReconcileAction, ReconcileOptions, ReconcileOutcome,
    ReconciliationEngine, StateUpdate, WorkItemSummary,
};
pub use state_mapper::map_state;
