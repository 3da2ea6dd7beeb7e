// Submodules for separation of concerns
pub mod criteria;
mod eval;
mod plan;
mod types;

// Public API re-exports
pub use criteria::{combine, compile, compile_filter, resolve_field};
pub use eval::{apply_pipeline, compare_bson, eval_filter, project_fields};
pub use plan::{DateRange, ListPlan, PageRequest, plan_list};
pub use types::{CmpOp, Filter, Pipeline, Stage, ValueType};
