pub mod blobs;
pub mod cache;
pub mod clock;
pub mod codec;
pub mod hasher;
pub mod mailer;
pub mod sink;
pub mod store;
