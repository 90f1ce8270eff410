//! Declarative filter registration and timing.

pub mod declaration;
pub mod elapsed;
pub mod registry;

pub use declaration::{
    DEFAULT_ACCEPTED_ARGS, DEFAULT_PRIORITY, FilterDeclaration, FilterSubscription, parse_method_params,
    render_tag,
};
pub use elapsed::{ElapsedLog, ElapsedRecord};
pub use registry::{FILTER_PARTITION, FilterRegistry};
