pub mod etl;
pub mod mapper;
pub mod sink_writer;
pub mod source_reader;
pub mod throttle;
pub mod tracked_codes;

pub use crate::domain::model::{Record, Row, TransformResult};
pub use crate::domain::ports::{ItemSource, Pipeline, Sink};
pub use crate::utils::error::Result;
