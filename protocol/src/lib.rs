pub mod command;
pub mod config;
pub mod decoder;
pub mod error;
pub mod fields;
pub mod resolve;
pub mod tokenizer;

pub use command::{
    Command, InsertCommand, MessageInsertCommand, MultipleInsertCommand, PropertyInsertCommand,
    Sample, SimpleCommand,
};
pub use config::DecoderConfig;
pub use decoder::CommandDecoder;
pub use error::{ConfigError, DecodeError, DecodeResult};
pub use fields::{group_fields, FieldMap, Verb};
pub use resolve::{
    resolve_data_type, resolve_entity, resolve_interpolate_type, resolve_key_values,
    resolve_number, resolve_time, resolve_time_zone, DataType, InterpolateType,
};
pub use tokenizer::split_quoted;

pub mod prelude {
    pub use crate::command::*;
    pub use crate::config::*;
    pub use crate::decoder::*;
    pub use crate::error::*;
    pub use crate::fields::*;
}
