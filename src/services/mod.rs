//! Business logic services.
//!
//! [`EmotionPipeline`] turns a message into a grounded prompt without side
//! effects beyond critical events. [`ChatService`] wraps it with message
//! persistence and the completion call.

mod chat;
mod pipeline;

pub use chat::{ChatService, ChatTurn, USER_MODEL_TAG};
pub use pipeline::{EmotionPipeline, PipelineStores};
