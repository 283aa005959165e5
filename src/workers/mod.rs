pub mod consumer;
pub mod producer;
pub mod throttle;

pub use consumer::AccrualConsumerPool;
pub use producer::OrderProducer;
pub use throttle::Throttle;
