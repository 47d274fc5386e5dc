//! Embassy tasks for the fascia tool

mod faceplate;
mod mirror;
mod serial;

pub use faceplate::faceplate_task;
pub use mirror::mirror_task;
pub use serial::serial_task;
