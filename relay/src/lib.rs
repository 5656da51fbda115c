pub mod config;
pub mod error;
pub mod pipeline;
pub mod sink;

pub use config::{OutputConfig, OutputFormat, RelayConfig};
pub use error::{RelayError, RelayResult};
pub use pipeline::{run, PipelineStats};
pub use sink::{CommandSink, WriterSink};
